//! AUR helper bootstrap.
//!
//! The helper is built from its `-bin` AUR package with `makepkg` inside a
//! scratch directory registered for cleanup on exit.
use anyhow::Result;

use super::{Resource, ResourceChange, ResourceState};
use crate::exec::Executor;
use crate::scratch::ScratchRegistry;

const AUR_BASE_URL: &str = "https://aur.archlinux.org";

/// An AUR helper (e.g. `paru`) available on `PATH`.
#[derive(Debug)]
pub struct AurHelperResource<'a> {
    helper: String,
    scratch: &'a ScratchRegistry,
    executor: &'a dyn Executor,
}

impl<'a> AurHelperResource<'a> {
    /// Create a new AUR helper resource.
    #[must_use]
    pub const fn new(helper: String, scratch: &'a ScratchRegistry, executor: &'a dyn Executor) -> Self {
        Self {
            helper,
            scratch,
            executor,
        }
    }

    fn clone_url(&self) -> String {
        format!("{AUR_BASE_URL}/{}-bin.git", self.helper)
    }
}

impl Resource for AurHelperResource<'_> {
    fn description(&self) -> String {
        self.helper.clone()
    }

    fn current_state(&self) -> Result<ResourceState> {
        if self.executor.which(&self.helper) {
            Ok(ResourceState::Correct)
        } else {
            Ok(ResourceState::Missing)
        }
    }

    fn apply(&self) -> Result<ResourceChange> {
        let build_root = self.scratch.create_dir("aur-helper")?;
        let checkout = build_root.join(&self.helper);
        self.executor.run_in(
            &build_root,
            "git",
            &["clone", "--depth", "1", &self.clone_url(), &self.helper],
        )?;
        self.executor
            .run_interactive(Some(&checkout), "makepkg", &["-si", "--noconfirm"])?;
        Ok(ResourceChange::Applied)
    }
}
