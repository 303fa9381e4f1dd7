//! Display manager installation.
use anyhow::Result;

use super::{Context, Task, TaskId, TaskResult, all_correct, process_resources};
use crate::resources::package::{PackageResource, PackageSource};
use crate::resources::service::ServiceResource;

/// Install the display manager and enable its service at boot.
#[derive(Debug)]
pub struct SetupLoginManager;

fn package(ctx: &Context) -> Option<PackageResource<'_>> {
    ctx.config.login_manager.as_ref().map(|lm| {
        PackageResource::new(lm.package.clone(), PackageSource::Native, &*ctx.executor)
    })
}

fn service(ctx: &Context) -> Option<ServiceResource<'_>> {
    ctx.config
        .login_manager
        .as_ref()
        .map(|lm| ServiceResource::new(lm.service.clone(), &*ctx.executor))
}

impl Task for SetupLoginManager {
    fn id(&self) -> TaskId {
        TaskId::SetupLoginManager
    }

    fn should_run(&self, ctx: &Context) -> bool {
        if ctx.config.login_manager.is_none() {
            return false;
        }
        if !ctx.platform.has_systemd {
            ctx.log.debug("systemd is not running; login manager not applicable");
            return false;
        }
        true
    }

    fn is_satisfied(&self, ctx: &Context) -> Result<bool> {
        Ok(all_correct(&package(ctx))? && all_correct(&service(ctx))?)
    }

    fn run(&self, ctx: &Context) -> Result<TaskResult> {
        process_resources(ctx, package(ctx), "install")?;
        process_resources(ctx, service(ctx), "enable")
    }
}
