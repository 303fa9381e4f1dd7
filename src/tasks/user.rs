//! User account configuration.
use anyhow::Result;
use std::path::{Path, PathBuf};

use super::{Context, Task, TaskId, TaskResult, all_correct, process_resources};
use crate::resources::group::GroupMembershipResource;
use crate::resources::home_manager::HomeManagerResource;
use crate::resources::shell::LoginShellResource;
use crate::resources::{Resource as _, ResourceState};

/// Login shell, supplementary groups and home-manager activation.
#[derive(Debug)]
pub struct ConfigureUser;

fn shell(ctx: &Context) -> Option<LoginShellResource<'_>> {
    ctx.config
        .user
        .shell
        .as_ref()
        .map(|s| LoginShellResource::new(ctx.user().to_string(), s.clone(), &*ctx.executor))
}

fn groups(ctx: &Context) -> Vec<GroupMembershipResource<'_>> {
    ctx.config
        .user
        .groups
        .iter()
        .map(|g| GroupMembershipResource::new(ctx.user().to_string(), g.clone(), &*ctx.executor))
        .collect()
}

/// Resolve the path part of a flake reference; `github:` style URIs pass through.
fn flake_ref(ctx: &Context, flake: &str) -> String {
    let (path, attr) = flake
        .split_once('#')
        .map_or((flake, None), |(path, attr)| (path, Some(attr)));
    if path.contains(':') {
        return flake.to_string();
    }
    let resolved: PathBuf = ctx.expand(Path::new(path)).components().collect();
    match attr {
        Some(attr) => format!("{}#{attr}", resolved.display()),
        None => resolved.display().to_string(),
    }
}

fn home_manager(ctx: &Context) -> Option<HomeManagerResource<'_>> {
    ctx.config.user.home_manager.as_ref().map(|hm| {
        HomeManagerResource::new(
            flake_ref(ctx, &hm.flake),
            hm.backup_extension.clone(),
            ctx.home(),
            &*ctx.executor,
        )
        .with_show_trace(ctx.debug)
    })
}

impl Task for ConfigureUser {
    fn id(&self) -> TaskId {
        TaskId::ConfigureUser
    }

    fn should_run(&self, ctx: &Context) -> bool {
        !ctx.config.user.is_empty()
    }

    fn requires_terminal(&self, ctx: &Context) -> bool {
        home_manager(ctx)
            .is_some_and(|hm| !matches!(hm.current_state(), Ok(ResourceState::Correct)))
    }

    fn is_satisfied(&self, ctx: &Context) -> Result<bool> {
        Ok(all_correct(&shell(ctx))?
            && all_correct(&groups(ctx))?
            && all_correct(&home_manager(ctx))?)
    }

    fn run(&self, ctx: &Context) -> Result<TaskResult> {
        process_resources(ctx, shell(ctx), "set")?;
        process_resources(ctx, groups(ctx), "add")?;
        if !groups(ctx).is_empty() && !ctx.dry_run {
            ctx.log.info("group changes take effect at the next login");
        }
        process_resources(ctx, home_manager(ctx), "activate")
    }
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::config::{Config, HomeManagerConfig};
    use crate::resources::test_helpers::MockExecutor;
    use crate::tasks::test_helpers::{make_context, make_context_in, quiet_logger};
    use std::sync::Arc;

    fn shell_and_groups() -> Config {
        let mut config = Config::default();
        config.user.shell = Some("zsh".to_string());
        config.user.groups = vec!["docker".to_string()];
        config
    }

    #[test]
    fn not_applicable_when_unconfigured() {
        let ctx = make_context(Config::default(), Arc::new(MockExecutor::default()), quiet_logger());
        assert!(!ConfigureUser.should_run(&ctx));
        assert!(!ConfigureUser.requires_terminal(&ctx));
    }

    #[test]
    fn satisfied_when_shell_and_groups_match() {
        let executor = Arc::new(MockExecutor::with_responses(vec![
            (true, "alice:x:1000:1000::/home/alice:/usr/bin/zsh\n".to_string()),
            (true, "alice wheel docker\n".to_string()),
        ]));
        let ctx = make_context(shell_and_groups(), executor, quiet_logger());
        assert!(ConfigureUser.is_satisfied(&ctx).unwrap());
    }

    #[test]
    fn applies_shell_and_group() {
        let executor = Arc::new(MockExecutor::with_responses(vec![
            (true, "alice:x:1000:1000::/home/alice:/bin/bash\n".to_string()),
            (true, "/usr/bin/zsh\n".to_string()),
            (true, String::new()),
            (true, "alice wheel\n".to_string()),
            (true, String::new()),
        ]));
        let ctx = make_context(shell_and_groups(), executor.clone(), quiet_logger());
        ConfigureUser.run(&ctx).unwrap();
        assert_eq!(
            executor.calls(),
            vec![
                "getent passwd alice",
                "which zsh",
                "sudo chsh -s /usr/bin/zsh alice",
                "id -nG alice",
                "sudo usermod -aG docker alice",
            ]
        );
    }

    #[test]
    fn home_manager_needs_terminal_until_activated() {
        let home = tempfile::tempdir().unwrap();
        let root = tempfile::tempdir().unwrap();
        let mut config = Config::default();
        config.user.home_manager = Some(HomeManagerConfig {
            flake: ".#alice".to_string(),
            backup_extension: "bak".to_string(),
        });
        let executor = Arc::new(MockExecutor::ok(""));
        let ctx = make_context_in(config, executor.clone(), quiet_logger(), home.path(), root.path());
        assert!(ConfigureUser.requires_terminal(&ctx));
        assert!(!ConfigureUser.is_satisfied(&ctx).unwrap());

        ConfigureUser.run(&ctx).unwrap();
        assert_eq!(
            executor.calls(),
            vec![format!("home-manager switch --flake {}#alice", root.path().display())]
        );
    }

    #[test]
    fn flake_paths_resolve_against_home_and_root() {
        let ctx = make_context(Config::default(), Arc::new(MockExecutor::default()), quiet_logger());
        assert_eq!(flake_ref(&ctx, "~/nix#alice"), "/home/alice/nix#alice");
        assert_eq!(flake_ref(&ctx, ".#alice"), "/srv/setup#alice");
        assert_eq!(flake_ref(&ctx, "nix"), "/srv/setup/nix");
        assert_eq!(flake_ref(&ctx, "/etc/nixos#alice"), "/etc/nixos#alice");
        assert_eq!(
            flake_ref(&ctx, "github:alice/nix#alice"),
            "github:alice/nix#alice"
        );
    }

    #[test]
    fn debug_run_asks_home_manager_for_a_trace() {
        let home = tempfile::tempdir().unwrap();
        let root = tempfile::tempdir().unwrap();
        let mut config = Config::default();
        config.user.home_manager = Some(HomeManagerConfig {
            flake: "/etc/nix#alice".to_string(),
            backup_extension: "bak".to_string(),
        });
        let executor = Arc::new(MockExecutor::ok(""));
        let ctx = make_context_in(config, executor.clone(), quiet_logger(), home.path(), root.path())
            .with_debug(true);
        ConfigureUser.run(&ctx).unwrap();
        assert_eq!(
            executor.calls(),
            vec!["home-manager switch --flake /etc/nix#alice --show-trace"]
        );
    }

    #[test]
    fn tilde_flake_reaches_home_manager_expanded() {
        let home = tempfile::tempdir().unwrap();
        let root = tempfile::tempdir().unwrap();
        let mut config = Config::default();
        config.user.home_manager = Some(HomeManagerConfig {
            flake: "~/nix#alice".to_string(),
            backup_extension: "bak".to_string(),
        });
        let executor = Arc::new(MockExecutor::ok(""));
        let ctx = make_context_in(config, executor.clone(), quiet_logger(), home.path(), root.path());
        ConfigureUser.run(&ctx).unwrap();
        assert_eq!(
            executor.calls(),
            vec![format!(
                "home-manager switch --flake {}#alice",
                home.path().join("nix").display()
            )]
        );
    }
}
