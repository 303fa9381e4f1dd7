//! pacman repository section resource.
use std::path::{Path, PathBuf};

use anyhow::{Context as _, Result};

use super::{Resource, ResourceChange, ResourceState};
use crate::exec::Executor;

/// Mirror list included by appended repository sections.
const MIRRORLIST_INCLUDE: &str = "Include = /etc/pacman.d/mirrorlist";

/// How a repository section appears in `pacman.conf`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SectionState {
    /// `[name]` is present and active.
    Enabled,
    /// Only a commented `#[name]` is present.
    Commented,
    /// The section does not appear at all.
    Absent,
}

/// Find `[name]` in pacman.conf text.
#[must_use]
pub fn section_state(content: &str, name: &str) -> SectionState {
    let header = format!("[{name}]");
    let mut commented = false;
    for line in content.lines().map(str::trim) {
        if line == header {
            return SectionState::Enabled;
        }
        if line.strip_prefix('#').map(str::trim_start) == Some(header.as_str()) {
            commented = true;
        }
    }
    if commented {
        SectionState::Commented
    } else {
        SectionState::Absent
    }
}

/// A pacman repository that should be enabled.
#[derive(Debug)]
pub struct RepositoryResource<'a> {
    /// Repository section name (e.g. `multilib`).
    pub name: String,
    pacman_conf: PathBuf,
    executor: &'a dyn Executor,
}

impl<'a> RepositoryResource<'a> {
    /// Create a new repository resource.
    #[must_use]
    pub fn new(name: String, pacman_conf: &Path, executor: &'a dyn Executor) -> Self {
        Self {
            name,
            pacman_conf: pacman_conf.to_path_buf(),
            executor,
        }
    }

    fn read_conf(&self) -> Result<String> {
        std::fs::read_to_string(&self.pacman_conf)
            .with_context(|| format!("reading {}", self.pacman_conf.display()))
    }
}

impl Resource for RepositoryResource<'_> {
    fn description(&self) -> String {
        format!("[{}] in {}", self.name, self.pacman_conf.display())
    }

    fn current_state(&self) -> Result<ResourceState> {
        Ok(match section_state(&self.read_conf()?, &self.name) {
            SectionState::Enabled => ResourceState::Correct,
            SectionState::Commented => ResourceState::Incorrect {
                current: "commented out".to_string(),
            },
            SectionState::Absent => ResourceState::Missing,
        })
    }

    fn apply(&self) -> Result<ResourceChange> {
        let conf = self.pacman_conf.to_string_lossy();
        match section_state(&self.read_conf()?, &self.name) {
            SectionState::Enabled => return Ok(ResourceChange::AlreadyCorrect),
            SectionState::Commented => {
                // Uncomment the header and the Include line that follows it.
                let script = format!(
                    "/^#[[:space:]]*\\[{name}\\]/,/^#[[:space:]]*Include/ s/^#[[:space:]]*//",
                    name = self.name
                );
                self.executor.run("sudo", &["sed", "-i", &script, &conf])?;
            }
            SectionState::Absent => {
                let block = format!("\n[{}]\n{MIRRORLIST_INCLUDE}\n", self.name);
                self.executor
                    .run_with_input("sudo", &["tee", "-a", &conf], &block)?;
            }
        }
        Ok(ResourceChange::Applied)
    }
}

/// Refresh the package databases after repositories changed.
///
/// # Errors
///
/// Returns an error if `pacman -Syy` fails.
pub fn refresh_databases(executor: &dyn Executor) -> Result<()> {
    executor
        .run("sudo", &["pacman", "-Syy", "--noconfirm"])
        .context("refreshing package databases")?;
    Ok(())
}
