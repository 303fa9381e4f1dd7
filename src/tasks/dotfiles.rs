//! Dotfile linking with GNU stow.
use anyhow::Result;

use super::{
    Context, Task, TaskId, TaskResult, all_correct, any_pending,
    process_resource_states, resource_states,
};
use crate::resources::stow::StowPackageResource;
use crate::resources::{Resource as _, ResourceState};

/// Link dotfile packages into the home directory with GNU stow.
#[derive(Debug)]
pub struct LinkDotfiles;

fn stow_packages(ctx: &Context) -> Vec<StowPackageResource<'_>> {
    let dotfiles = &ctx.config.dotfiles;
    let stow_dir = ctx.expand(&dotfiles.source);
    dotfiles
        .packages
        .iter()
        .map(|pkg| StowPackageResource::new(pkg.clone(), &stow_dir, ctx.home(), &*ctx.executor))
        .collect()
}

impl Task for LinkDotfiles {
    fn id(&self) -> TaskId {
        TaskId::LinkDotfiles
    }

    fn should_run(&self, ctx: &Context) -> bool {
        !ctx.config.dotfiles.packages.is_empty()
    }

    fn is_satisfied(&self, ctx: &Context) -> Result<bool> {
        all_correct(&stow_packages(ctx))
    }

    fn run(&self, ctx: &Context) -> Result<TaskResult> {
        let states = resource_states(stow_packages(ctx))?;

        // Refuse before linking anything so a conflict never leaves a
        // half-linked home directory.
        for (resource, state) in &states {
            match state {
                ResourceState::Invalid { reason } => {
                    anyhow::bail!("stow package {}: {reason}", resource.package);
                }
                ResourceState::Incorrect { current } => {
                    anyhow::bail!(
                        "cannot link {}: {current}; move it aside and re-run",
                        resource.description()
                    );
                }
                ResourceState::Missing | ResourceState::Correct => {}
            }
        }

        if any_pending(&states) && !ctx.dry_run && !ctx.executor.which("stow") {
            anyhow::bail!("stow is not installed");
        }

        process_resource_states(ctx, states, "link")
    }
}
