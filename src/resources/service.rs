//! Systemd units enabled at boot.
use anyhow::Result;

use super::{Resource, ResourceChange, ResourceState};
use crate::exec::Executor;

/// A systemd system unit that should be enabled.
#[derive(Debug)]
pub struct ServiceResource<'a> {
    /// Unit name (e.g. `ly.service`).
    pub unit: String,
    /// Also start the unit immediately.
    start_now: bool,
    executor: &'a dyn Executor,
}

impl<'a> ServiceResource<'a> {
    /// Enable `unit` at boot.
    #[must_use]
    pub const fn new(unit: String, executor: &'a dyn Executor) -> Self {
        Self {
            unit,
            start_now: false,
            executor,
        }
    }

    /// Start the unit right away as well as at boot.
    #[must_use]
    pub const fn start_now(mut self) -> Self {
        self.start_now = true;
        self
    }
}

impl Resource for ServiceResource<'_> {
    fn description(&self) -> String {
        self.unit.clone()
    }

    fn current_state(&self) -> Result<ResourceState> {
        let result = self
            .executor
            .run_unchecked("systemctl", &["is-enabled", &self.unit])?;
        match result.stdout.trim() {
            "enabled" => Ok(ResourceState::Correct),
            "" => Ok(ResourceState::Missing),
            other => Ok(ResourceState::Incorrect {
                current: other.to_string(),
            }),
        }
    }

    fn apply(&self) -> Result<ResourceChange> {
        if self.start_now {
            self.executor
                .run("sudo", &["systemctl", "enable", "--now", &self.unit])?;
        } else {
            self.executor
                .run("sudo", &["systemctl", "enable", &self.unit])?;
        }
        Ok(ResourceChange::Applied)
    }
}
