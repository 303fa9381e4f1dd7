//! Native and AUR package installation.
use anyhow::{Context as _, Result};

use super::{Context, Task, TaskId, TaskResult, TaskStats, process_resources};
use crate::resources::ResourceState;
use crate::resources::aur_helper::AurHelperResource;
use crate::resources::package::{
    PackageResource, PackageSource, batch_install_packages, get_installed_packages,
};

/// Install native and AUR packages, bootstrapping the AUR helper if needed.
#[derive(Debug)]
pub struct InstallPackages;

fn packages(ctx: &Context) -> Vec<PackageResource<'_>> {
    let cfg = &ctx.config.packages;
    let helper = PackageSource::Aur(cfg.aur_helper.clone());
    cfg.native
        .iter()
        .map(|name| PackageResource::new(name.clone(), PackageSource::Native, &*ctx.executor))
        .chain(
            cfg.aur
                .iter()
                .map(|name| PackageResource::new(name.clone(), helper.clone(), &*ctx.executor)),
        )
        .collect()
}

fn needs_helper_bootstrap(ctx: &Context) -> bool {
    let cfg = &ctx.config.packages;
    !cfg.aur.is_empty() && !ctx.executor.which(&cfg.aur_helper)
}

impl Task for InstallPackages {
    fn id(&self) -> TaskId {
        TaskId::InstallPackages
    }

    fn should_run(&self, ctx: &Context) -> bool {
        !ctx.config.packages.is_empty()
    }

    fn requires_terminal(&self, ctx: &Context) -> bool {
        needs_helper_bootstrap(ctx)
    }

    fn is_satisfied(&self, ctx: &Context) -> Result<bool> {
        if needs_helper_bootstrap(ctx) {
            return Ok(false);
        }
        let installed = get_installed_packages(&*ctx.executor)?;
        Ok(packages(ctx)
            .iter()
            .all(|p| p.state_from_installed(&installed) == ResourceState::Correct))
    }

    fn run(&self, ctx: &Context) -> Result<TaskResult> {
        let cfg = &ctx.config.packages;
        if !cfg.aur.is_empty() {
            let helper = AurHelperResource::new(cfg.aur_helper.clone(), &ctx.scratch, &*ctx.executor);
            process_resources(ctx, std::iter::once(helper), "bootstrap")?;
        }

        ctx.log.debug(&format!(
            "batch-checking {} packages with a single query",
            cfg.native.len() + cfg.aur.len()
        ));
        let installed = get_installed_packages(&*ctx.executor)?;
        let resources = packages(ctx);
        let (missing, present): (Vec<_>, Vec<_>) = resources
            .iter()
            .partition(|p| p.state_from_installed(&installed) != ResourceState::Correct);

        let mut stats = TaskStats::new();
        stats.already_ok = u32::try_from(present.len()).unwrap_or(u32::MAX);
        stats.changed = u32::try_from(missing.len()).unwrap_or(u32::MAX);
        for package in &present {
            ctx.log.debug(&format!("ok: {} ({})", package.name, package.source));
        }

        if !missing.is_empty() {
            if ctx.dry_run {
                for package in &missing {
                    ctx.log
                        .dry_run(&format!("would install: {} ({})", package.name, package.source));
                }
            } else {
                let names: Vec<&str> = missing.iter().map(|p| p.name.as_str()).collect();
                ctx.log.info(&format!("installing {}", names.join(" ")));
                batch_install_packages(&missing).context("installing packages")?;
            }
        }

        Ok(stats.finish(ctx))
    }
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::resources::test_helpers::MockExecutor;
    use crate::tasks::test_helpers::{make_context, quiet_logger};
    use std::sync::Arc;

    fn config(native: &[&str], aur: &[&str]) -> Config {
        let mut config = Config::default();
        config.packages.native = native.iter().map(ToString::to_string).collect();
        config.packages.aur = aur.iter().map(ToString::to_string).collect();
        config
    }

    #[test]
    fn not_applicable_without_packages() {
        let ctx = make_context(Config::default(), Arc::new(MockExecutor::default()), quiet_logger());
        assert!(!InstallPackages.should_run(&ctx));
    }

    #[test]
    fn satisfied_when_everything_installed() {
        let executor = Arc::new(MockExecutor::ok("git\nneovim\nparu\n").with_which(true));
        let ctx = make_context(config(&["git", "neovim"], &[]), executor, quiet_logger());
        assert!(InstallPackages.is_satisfied(&ctx).unwrap());
    }

    #[test]
    fn not_satisfied_when_helper_missing() {
        let executor = Arc::new(MockExecutor::default());
        let ctx = make_context(config(&[], &["spotify"]), executor.clone(), quiet_logger());
        assert!(!InstallPackages.is_satisfied(&ctx).unwrap());
        assert!(InstallPackages.requires_terminal(&ctx));
        assert_eq!(executor.call_count(), 0);
    }

    #[test]
    fn installs_only_missing_packages_in_one_batch() {
        let executor = Arc::new(MockExecutor::with_responses(vec![
            (true, "git\n".to_string()),
            (true, String::new()),
        ]));
        let ctx = make_context(config(&["git", "neovim", "ripgrep"], &[]), executor.clone(), quiet_logger());
        assert!(matches!(InstallPackages.run(&ctx).unwrap(), TaskResult::Ok));
        assert_eq!(
            executor.calls(),
            vec![
                "pacman -Qq",
                "sudo pacman -S --needed --noconfirm neovim ripgrep",
            ]
        );
    }

    #[test]
    fn aur_packages_use_existing_helper() {
        let executor = Arc::new(
            MockExecutor::with_responses(vec![(true, "git\n".to_string()), (true, String::new())])
                .with_which(true),
        );
        let ctx = make_context(config(&["git"], &["spotify"]), executor.clone(), quiet_logger());
        assert!(!InstallPackages.requires_terminal(&ctx));
        InstallPackages.run(&ctx).unwrap();
        assert_eq!(
            executor.calls(),
            vec!["pacman -Qq", "paru -S --needed --noconfirm spotify"]
        );
    }

    #[test]
    fn second_run_is_a_no_op() {
        let executor = Arc::new(MockExecutor::ok("git\n"));
        let ctx = make_context(config(&["git"], &[]), executor.clone(), quiet_logger());
        InstallPackages.run(&ctx).unwrap();
        assert_eq!(executor.calls(), vec!["pacman -Qq"]);
    }

    #[test]
    fn dry_run_installs_nothing() {
        let executor = Arc::new(MockExecutor::ok(""));
        let ctx = make_context(config(&["git"], &[]), executor.clone(), quiet_logger())
            .with_dry_run(true);
        assert!(matches!(InstallPackages.run(&ctx).unwrap(), TaskResult::DryRun));
        assert_eq!(executor.calls(), vec!["pacman -Qq"]);
    }

    #[test]
    fn failed_install_is_an_error() {
        let executor = Arc::new(MockExecutor::with_responses(vec![
            (true, String::new()),
            (false, String::new()),
        ]));
        let ctx = make_context(config(&["git"], &[]), executor, quiet_logger());
        let err = InstallPackages.run(&ctx).unwrap_err();
        assert!(format!("{err:#}").contains("installing packages"));
    }
}
