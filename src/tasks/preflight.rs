//! Checks that must pass before any other task changes the system.
use std::time::Duration;

use anyhow::Result;

use super::{Context, Task, TaskId, TaskResult};
use crate::error::PreconditionError;

/// Verify user, platform, elevation, network and required files.
#[derive(Debug)]
pub struct PreFlightChecks;

impl Task for PreFlightChecks {
    fn id(&self) -> TaskId {
        TaskId::PreFlightChecks
    }

    fn should_run(&self, _ctx: &Context) -> bool {
        true
    }

    fn run(&self, ctx: &Context) -> Result<TaskResult> {
        check_not_root(ctx)?;
        check_platform(ctx)?;
        check_sudo(ctx)?;
        check_network(ctx)?;
        check_required_files(ctx)?;
        Ok(TaskResult::Ok)
    }
}

/// The environment resolver already rejects `USER=root`; this catches a
/// root process started with a user's environment (e.g. `sudo -E`).
fn check_not_root(ctx: &Context) -> Result<()> {
    let uid = ctx.executor.run("id", &["-u"])?;
    if uid.stdout.trim() == "0" {
        return Err(PreconditionError::RunningAsRoot.into());
    }
    ctx.log.debug(&format!("running as {}", ctx.user()));
    Ok(())
}

fn check_platform(ctx: &Context) -> Result<()> {
    if !ctx.platform.is_arch {
        return Err(PreconditionError::UnsupportedPlatform(ctx.platform.describe().to_string()).into());
    }
    ctx.log.debug(&format!("platform: {}", ctx.platform.describe()));
    Ok(())
}

fn check_sudo(ctx: &Context) -> Result<()> {
    if !ctx.executor.which("sudo") {
        return Err(PreconditionError::NoElevation("sudo is not installed".to_string()).into());
    }

    if ctx.interactive && !ctx.dry_run {
        // Caches credentials so later sudo calls do not prompt mid-task.
        ctx.executor
            .run_interactive(None, "sudo", &["-v"])
            .map_err(|e| PreconditionError::NoElevation(format!("{e:#}")))?;
    } else {
        let cached = ctx.executor.run_unchecked("sudo", &["-n", "true"])?;
        if !cached.success {
            if ctx.dry_run {
                ctx.log.warn("sudo will ask for a password when the run is not a dry run");
            } else {
                return Err(PreconditionError::NoElevation(
                    "sudo needs a password and no terminal is attached".to_string(),
                )
                .into());
            }
        }
    }
    ctx.log.debug("sudo available");
    Ok(())
}

fn check_network(ctx: &Context) -> Result<()> {
    let preflight = &ctx.config.preflight;
    let url = preflight.network_check_url.trim();
    if url.is_empty() {
        ctx.log.debug("network check disabled");
        return Ok(());
    }

    let agent: ureq::Agent = ureq::Agent::config_builder()
        .timeout_global(Some(Duration::from_secs(preflight.network_timeout_secs)))
        .http_status_as_error(false)
        .build()
        .into();
    agent
        .head(url)
        .call()
        .map_err(|e| PreconditionError::NoNetwork {
            url: url.to_string(),
            reason: e.to_string(),
        })?;
    ctx.log.debug(&format!("network reachable ({url})"));
    Ok(())
}

fn check_required_files(ctx: &Context) -> Result<()> {
    for file in &ctx.config.preflight.required_files {
        let path = ctx.expand(file);
        if !path.exists() {
            return Err(PreconditionError::MissingFile(path).into());
        }
        ctx.log.debug(&format!("found {}", path.display()));
    }
    Ok(())
}
