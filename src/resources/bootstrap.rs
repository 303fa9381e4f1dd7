//! One-shot bootstrap commands guarded by a marker path.
use std::path::{Path, PathBuf};

use anyhow::Result;

use super::{Resource, ResourceChange, ResourceState};
use crate::exec::Executor;

/// An editor bootstrap command guarded by a marker path.
///
/// The command runs attached to the terminal because editor plugin managers
/// often ask questions or draw progress.
#[derive(Debug)]
pub struct BootstrapResource<'a> {
    name: String,
    command: Vec<String>,
    creates: PathBuf,
    workdir: PathBuf,
    executor: &'a dyn Executor,
}

impl<'a> BootstrapResource<'a> {
    /// Create a bootstrap resource. `creates` must already be expanded.
    #[must_use]
    pub fn new(
        name: String,
        command: Vec<String>,
        creates: PathBuf,
        workdir: &Path,
        executor: &'a dyn Executor,
    ) -> Self {
        Self {
            name,
            command,
            creates,
            workdir: workdir.to_path_buf(),
            executor,
        }
    }
}

impl Resource for BootstrapResource<'_> {
    fn description(&self) -> String {
        self.name.clone()
    }

    fn current_state(&self) -> Result<ResourceState> {
        if self.command.is_empty() {
            return Ok(ResourceState::Invalid {
                reason: "no bootstrap command".to_string(),
            });
        }
        if self.creates.exists() {
            Ok(ResourceState::Correct)
        } else {
            Ok(ResourceState::Missing)
        }
    }

    fn apply(&self) -> Result<ResourceChange> {
        let Some((program, args)) = self.command.split_first() else {
            anyhow::bail!("no bootstrap command for {}", self.name);
        };
        let args: Vec<&str> = args.iter().map(String::as_str).collect();
        self.executor
            .run_interactive(Some(&self.workdir), program, &args)?;
        if !self.creates.exists() {
            anyhow::bail!(
                "{} bootstrap finished but {} was not created",
                self.name,
                self.creates.display()
            );
        }
        Ok(ResourceChange::Applied)
    }
}
