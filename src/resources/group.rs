//! Supplementary group membership.
use anyhow::Result;

use super::{Resource, ResourceChange, ResourceState};
use crate::exec::Executor;

/// Membership of a user in a supplementary group.
#[derive(Debug)]
pub struct GroupMembershipResource<'a> {
    user: String,
    group: String,
    executor: &'a dyn Executor,
}

impl<'a> GroupMembershipResource<'a> {
    /// Create a new group membership resource.
    #[must_use]
    pub const fn new(user: String, group: String, executor: &'a dyn Executor) -> Self {
        Self {
            user,
            group,
            executor,
        }
    }
}

impl Resource for GroupMembershipResource<'_> {
    fn description(&self) -> String {
        format!("{} ∈ {}", self.user, self.group)
    }

    fn current_state(&self) -> Result<ResourceState> {
        let result = self.executor.run("id", &["-nG", &self.user])?;
        if result.stdout.split_whitespace().any(|g| g == self.group) {
            Ok(ResourceState::Correct)
        } else {
            Ok(ResourceState::Missing)
        }
    }

    fn apply(&self) -> Result<ResourceChange> {
        self.executor
            .run("sudo", &["usermod", "-aG", &self.group, &self.user])?;
        Ok(ResourceChange::Applied)
    }
}
