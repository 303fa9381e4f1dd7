//! Firewall and sysctl hardening.
use anyhow::{Context as _, Result};

use super::{
    Context, Task, TaskId, TaskResult, all_correct, any_pending,
    process_resource_states, process_resources, resource_states,
};
use crate::resources::firewall::FirewallResource;
use crate::resources::managed_file::ManagedFileResource;
use crate::resources::package::{PackageResource, PackageSource};
use crate::resources::service::ServiceResource;

/// Firewall and kernel parameter hardening.
#[derive(Debug)]
pub struct HardenSystem;

struct Firewall<'a> {
    package: PackageResource<'a>,
    rules: FirewallResource<'a>,
    service: ServiceResource<'a>,
}

fn firewall(ctx: &Context) -> Option<Firewall<'_>> {
    let cfg = &ctx.config.hardening;
    cfg.firewall.then(|| Firewall {
        package: PackageResource::new("ufw".to_string(), PackageSource::Native, &*ctx.executor),
        rules: FirewallResource::new(cfg.allow.clone(), &*ctx.executor),
        service: ServiceResource::new("ufw.service".to_string(), &*ctx.executor),
    })
}

fn sysctl(ctx: &Context) -> Option<ManagedFileResource<'_>> {
    let cfg = &ctx.config.hardening;
    (!cfg.sysctl.is_empty())
        .then(|| ManagedFileResource::new(&cfg.sysctl_file, &cfg.sysctl_lines(), &*ctx.executor))
}

impl Task for HardenSystem {
    fn id(&self) -> TaskId {
        TaskId::HardenSystem
    }

    fn should_run(&self, ctx: &Context) -> bool {
        !ctx.config.hardening.is_empty()
    }

    fn is_satisfied(&self, ctx: &Context) -> Result<bool> {
        if let Some(fw) = firewall(ctx)
            && !(all_correct(&[fw.package])?
                && all_correct(&[fw.rules])?
                && all_correct(&[fw.service])?)
        {
            return Ok(false);
        }
        all_correct(&sysctl(ctx))
    }

    fn run(&self, ctx: &Context) -> Result<TaskResult> {
        if let Some(fw) = firewall(ctx) {
            process_resources(ctx, [fw.package], "install")?;
            process_resources(ctx, [fw.rules], "enable")?;
            process_resources(ctx, [fw.service], "enable")?;
        }

        let states = resource_states(sysctl(ctx))?;
        let changed = any_pending(&states);
        let result = process_resource_states(ctx, states, "write")?;
        if changed {
            if ctx.dry_run {
                ctx.log.dry_run("would reload kernel parameters");
            } else {
                ctx.executor
                    .run("sudo", &["sysctl", "--system"])
                    .context("reloading kernel parameters")?;
            }
        }
        Ok(result)
    }
}
