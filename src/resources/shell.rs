//! Login shell of the target user.
use anyhow::{Context as _, Result};

use super::{Resource, ResourceChange, ResourceState};
use crate::exec::Executor;

/// A resource for configuring a user's login shell.
#[derive(Debug)]
pub struct LoginShellResource<'a> {
    user: String,
    /// Target shell name (e.g., "zsh").
    target_shell: String,
    executor: &'a dyn Executor,
}

impl<'a> LoginShellResource<'a> {
    /// Create a new login shell resource.
    #[must_use]
    pub const fn new(user: String, target_shell: String, executor: &'a dyn Executor) -> Self {
        Self {
            user,
            target_shell,
            executor,
        }
    }
}

/// Extract the login shell (seventh field) from a passwd entry.
fn shell_field(entry: &str) -> Option<&str> {
    entry.trim().split(':').nth(6).filter(|s| !s.is_empty())
}

impl Resource for LoginShellResource<'_> {
    fn description(&self) -> String {
        format!("login shell → {}", self.target_shell)
    }

    fn current_state(&self) -> Result<ResourceState> {
        let result = self
            .executor
            .run_unchecked("getent", &["passwd", &self.user])?;
        let Some(current) = shell_field(&result.stdout) else {
            return Ok(ResourceState::Missing);
        };
        if current.ends_with(&format!("/{}", self.target_shell)) {
            Ok(ResourceState::Correct)
        } else {
            Ok(ResourceState::Incorrect {
                current: current.to_string(),
            })
        }
    }

    fn apply(&self) -> Result<ResourceChange> {
        let result = self
            .executor
            .run("which", &[&self.target_shell])
            .with_context(|| format!("{} is not installed", self.target_shell))?;
        let shell_path = result.stdout.trim();
        self.executor
            .run("sudo", &["chsh", "-s", shell_path, &self.user])?;
        Ok(ResourceChange::Applied)
    }
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use crate::resources::test_helpers::MockExecutor;

    fn resource(executor: &MockExecutor) -> LoginShellResource<'_> {
        LoginShellResource::new("alice".to_string(), "zsh".to_string(), executor)
    }

    #[test]
    fn description_includes_shell_name() {
        let executor = MockExecutor::default();
        assert_eq!(resource(&executor).description(), "login shell → zsh");
    }

    #[test]
    fn current_state_correct_when_shell_matches() {
        let executor = MockExecutor::ok("alice:x:1000:1000::/home/alice:/usr/bin/zsh\n");
        assert_eq!(
            resource(&executor).current_state().unwrap(),
            ResourceState::Correct
        );
        assert_eq!(executor.calls(), vec!["getent passwd alice"]);
    }

    #[test]
    fn current_state_incorrect_when_different_shell_set() {
        let executor = MockExecutor::ok("alice:x:1000:1000::/home/alice:/bin/bash\n");
        let state = resource(&executor).current_state().unwrap();
        assert!(
            matches!(state, ResourceState::Incorrect { ref current } if current == "/bin/bash"),
            "expected Incorrect(/bin/bash), got {state:?}"
        );
    }

    #[test]
    fn current_state_missing_without_entry() {
        let executor = MockExecutor::fail();
        assert_eq!(
            resource(&executor).current_state().unwrap(),
            ResourceState::Missing
        );
    }

    #[test]
    fn apply_resolves_path_and_runs_chsh() {
        let executor = MockExecutor::with_responses(vec![
            (true, "/usr/bin/zsh\n".to_string()),
            (true, String::new()),
        ]);
        resource(&executor).apply().unwrap();
        assert_eq!(
            executor.calls(),
            vec!["which zsh", "sudo chsh -s /usr/bin/zsh alice"]
        );
    }

    #[test]
    fn apply_fails_when_shell_missing() {
        let executor = MockExecutor::fail();
        let err = resource(&executor).apply().unwrap_err();
        assert!(err.to_string().contains("zsh is not installed"));
    }
}
