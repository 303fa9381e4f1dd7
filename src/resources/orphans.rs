//! Orphaned dependency packages.
use anyhow::Result;

use super::{Resource, ResourceChange, ResourceState};
use crate::exec::Executor;

/// Packages installed as dependencies that nothing requires any more.
#[derive(Debug)]
pub struct OrphanPackagesResource<'a> {
    executor: &'a dyn Executor,
}

impl<'a> OrphanPackagesResource<'a> {
    /// Create a new orphan package resource.
    #[must_use]
    pub const fn new(executor: &'a dyn Executor) -> Self {
        Self { executor }
    }

    /// Query the orphan list. `pacman -Qdtq` exits non-zero when there are none.
    fn orphans(&self) -> Result<Vec<String>> {
        let result = self.executor.run_unchecked("pacman", &["-Qdtq"])?;
        if !result.success {
            return Ok(Vec::new());
        }
        Ok(result
            .stdout
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .map(String::from)
            .collect())
    }
}

impl Resource for OrphanPackagesResource<'_> {
    fn description(&self) -> String {
        "orphaned packages".to_string()
    }

    fn current_state(&self) -> Result<ResourceState> {
        let orphans = self.orphans()?;
        if orphans.is_empty() {
            Ok(ResourceState::Correct)
        } else {
            Ok(ResourceState::Incorrect {
                current: orphans.join(" "),
            })
        }
    }

    fn apply(&self) -> Result<ResourceChange> {
        let orphans = self.orphans()?;
        if orphans.is_empty() {
            return Ok(ResourceChange::AlreadyCorrect);
        }
        let mut args = vec!["pacman", "-Rns", "--noconfirm"];
        args.extend(orphans.iter().map(String::as_str));
        self.executor.run("sudo", &args)?;
        Ok(ResourceChange::Applied)
    }
}
