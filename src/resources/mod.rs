//! Idempotent resource primitives (check + apply pattern).
//!
//! A resource's [`current_state`](Resource::current_state) is the read-only
//! idempotency predicate; [`apply`](Resource::apply) is the mutating action.
pub mod aur_helper;
pub mod bootstrap;
pub mod firewall;
pub mod group;
pub mod home_manager;
pub mod managed_file;
pub mod orphans;
pub mod package;
pub mod repository;
pub mod service;
pub mod shell;
pub mod stow;

use anyhow::Result;

/// State of a resource (package, repository section, service, …).
///
/// # Examples
///
/// ```
/// use workstation_setup::resources::ResourceState;
///
/// let missing = ResourceState::Missing;
/// let correct = ResourceState::Correct;
/// let wrong = ResourceState::Incorrect { current: "/bin/bash".into() };
///
/// assert_ne!(missing, correct);
/// assert_eq!(correct, ResourceState::Correct);
/// assert!(matches!(wrong, ResourceState::Incorrect { .. }));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResourceState {
    /// Resource does not exist or is not present.
    Missing,
    /// Resource exists and matches the desired state.
    Correct,
    /// Resource exists but does not match the desired state.
    Incorrect {
        /// The current value of the resource.
        current: String,
    },
    /// Resource cannot be applied (e.g. the source it depends on is absent).
    Invalid {
        /// Reason why the resource cannot be applied.
        reason: String,
    },
}

/// Result of applying a resource change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResourceChange {
    /// Resource was created or updated.
    Applied,
    /// Resource was already correct (no change needed).
    AlreadyCorrect,
}

/// Unified interface for resources that can be checked and applied.
///
/// # Examples
///
/// ```ignore
/// // All resources follow the same check-then-apply pattern:
/// if resource.needs_change()? {
///     resource.apply()?;
/// }
/// ```
pub trait Resource {
    /// Human-readable description of this resource.
    fn description(&self) -> String;

    /// Check the current state of the resource without changing anything.
    ///
    /// # Errors
    ///
    /// Returns an error if the state cannot be determined.
    fn current_state(&self) -> Result<ResourceState>;

    /// Bring the resource to its desired state.
    ///
    /// # Errors
    ///
    /// Returns an error if the external command or file operation fails.
    fn apply(&self) -> Result<ResourceChange>;

    /// Determine if the resource needs to be changed.
    ///
    /// # Errors
    ///
    /// Propagates errors from [`current_state`](Self::current_state).
    fn needs_change(&self) -> Result<bool> {
        Ok(matches!(
            self.current_state()?,
            ResourceState::Missing | ResourceState::Incorrect { .. }
        ))
    }
}


#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;

    struct TestResource {
        state: ResourceState,
    }

    impl Resource for TestResource {
        fn description(&self) -> String {
            "test resource".to_string()
        }

        fn current_state(&self) -> Result<ResourceState> {
            Ok(self.state.clone())
        }

        fn apply(&self) -> Result<ResourceChange> {
            Ok(ResourceChange::Applied)
        }
    }

    #[test]
    fn needs_change_for_missing_resource() {
        let resource = TestResource {
            state: ResourceState::Missing,
        };
        assert!(resource.needs_change().unwrap());
    }

    #[test]
    fn needs_change_for_incorrect_resource() {
        let resource = TestResource {
            state: ResourceState::Incorrect {
                current: "wrong".to_string(),
            },
        };
        assert!(resource.needs_change().unwrap());
    }

    #[test]
    fn no_change_for_correct_resource() {
        let resource = TestResource {
            state: ResourceState::Correct,
        };
        assert!(!resource.needs_change().unwrap());
    }

    #[test]
    fn no_change_for_invalid_resource() {
        let resource = TestResource {
            state: ResourceState::Invalid {
                reason: "source missing".to_string(),
            },
        };
        assert!(!resource.needs_change().unwrap());
    }

    #[test]
    fn mock_executor_records_calls_in_order() {
        use crate::exec::Executor as _;
        let mock = test_helpers::MockExecutor::with_responses(vec![
            (true, "one".to_string()),
            (false, String::new()),
        ]);
        assert_eq!(mock.run("echo", &["a", "b"]).unwrap().stdout, "one");
        assert!(!mock.run_unchecked("false", &[]).unwrap().success);
        assert!(mock.run("extra", &[]).is_err());
        assert_eq!(mock.calls(), vec!["echo a b", "false", "extra"]);
    }
}
