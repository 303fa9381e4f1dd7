//! Uncomplicated firewall resource.
use anyhow::Result;

use super::{Resource, ResourceChange, ResourceState};
use crate::exec::Executor;

/// The uncomplicated firewall (`ufw`) enabled with a deny-incoming default
/// and every configured allow rule in place.
#[derive(Debug)]
pub struct FirewallResource<'a> {
    allow: Vec<String>,
    executor: &'a dyn Executor,
}

impl<'a> FirewallResource<'a> {
    /// Create a firewall resource that allows the given `ufw` rules.
    #[must_use]
    pub const fn new(allow: Vec<String>, executor: &'a dyn Executor) -> Self {
        Self { allow, executor }
    }

    /// Configured rules that `ufw show added` does not list yet.
    fn missing_rules(&self) -> Result<Vec<&str>> {
        if self.allow.is_empty() {
            return Ok(Vec::new());
        }
        let result = self.executor.run_unchecked("sudo", &["ufw", "show", "added"])?;
        let added: Vec<&str> = result
            .stdout
            .lines()
            .filter_map(|line| line.trim().strip_prefix("ufw allow "))
            .map(str::trim)
            .collect();
        Ok(self
            .allow
            .iter()
            .map(String::as_str)
            .filter(|rule| !added.contains(rule))
            .collect())
    }

    fn is_active(&self) -> Result<Option<bool>> {
        let result = self.executor.run_unchecked("sudo", &["ufw", "status"])?;
        if !result.success {
            return Ok(None);
        }
        Ok(Some(result.stdout.contains("Status: active")))
    }
}

impl Resource for FirewallResource<'_> {
    fn description(&self) -> String {
        if self.allow.is_empty() {
            "ufw".to_string()
        } else {
            format!("ufw (allow {})", self.allow.join(", "))
        }
    }

    fn current_state(&self) -> Result<ResourceState> {
        match self.is_active()? {
            None => Ok(ResourceState::Missing),
            Some(false) => Ok(ResourceState::Incorrect {
                current: "inactive".to_string(),
            }),
            Some(true) => {
                let missing = self.missing_rules()?;
                if missing.is_empty() {
                    Ok(ResourceState::Correct)
                } else {
                    Ok(ResourceState::Incorrect {
                        current: format!("missing rule {}", missing.join(", ")),
                    })
                }
            }
        }
    }

    fn apply(&self) -> Result<ResourceChange> {
        for rule in self.missing_rules()? {
            self.executor.run("sudo", &["ufw", "allow", rule])?;
        }
        if self.is_active()? != Some(true) {
            self.executor
                .run("sudo", &["ufw", "default", "deny", "incoming"])?;
            self.executor.run("sudo", &["ufw", "--force", "enable"])?;
        }
        Ok(ResourceChange::Applied)
    }
}
