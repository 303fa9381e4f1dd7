//! Home-manager flake activation.
use std::path::{Path, PathBuf};

use anyhow::Result;

use super::{Resource, ResourceChange, ResourceState};
use crate::exec::Executor;

/// Home-manager generation root created by the first successful switch.
const CURRENT_GENERATION: &str = ".local/state/home-manager/gcroots/current-home";

/// A home-manager flake activated for the current user.
#[derive(Debug)]
pub struct HomeManagerResource<'a> {
    flake: String,
    backup_extension: String,
    home: PathBuf,
    show_trace: bool,
    executor: &'a dyn Executor,
}

impl<'a> HomeManagerResource<'a> {
    /// Create a new home-manager resource.
    #[must_use]
    pub fn new(
        flake: String,
        backup_extension: String,
        home: &Path,
        executor: &'a dyn Executor,
    ) -> Self {
        Self {
            flake,
            backup_extension,
            home: home.to_path_buf(),
            show_trace: false,
            executor,
        }
    }

    /// Pass `--show-trace` so evaluation errors print a full nix trace.
    #[must_use]
    pub const fn with_show_trace(mut self, show_trace: bool) -> Self {
        self.show_trace = show_trace;
        self
    }

    fn switch_args<'s>(&'s self, backup: Option<&'s str>) -> Vec<&'s str> {
        let mut args = vec!["switch", "--flake", self.flake.as_str()];
        if self.show_trace {
            args.push("--show-trace");
        }
        if let Some(ext) = backup {
            args.extend(["-b", ext]);
        }
        args
    }

    fn generation(&self) -> PathBuf {
        self.home.join(CURRENT_GENERATION)
    }
}

impl Resource for HomeManagerResource<'_> {
    fn description(&self) -> String {
        format!("home-manager {}", self.flake)
    }

    fn current_state(&self) -> Result<ResourceState> {
        if self.generation().symlink_metadata().is_ok() {
            Ok(ResourceState::Correct)
        } else {
            Ok(ResourceState::Missing)
        }
    }

    fn apply(&self) -> Result<ResourceChange> {
        let home = Some(self.home.as_path());
        let first = self
            .executor
            .run_interactive(home, "home-manager", &self.switch_args(None));
        if let Err(e) = first {
            // Usually an unmanaged file in the way; retry moving it aside.
            tracing::warn!(
                "home-manager switch failed ({e}); retrying with -b {}",
                self.backup_extension
            );
            self.executor.run_interactive(
                home,
                "home-manager",
                &self.switch_args(Some(self.backup_extension.as_str())),
            )?;
        }
        Ok(ResourceChange::Applied)
    }
}
