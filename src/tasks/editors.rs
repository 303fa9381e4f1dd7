//! Editor plugin bootstrap.
use anyhow::Result;

use super::{Context, Task, TaskId, TaskResult, all_correct, process_resources};
use crate::resources::Resource as _;
use crate::resources::bootstrap::BootstrapResource;

/// Run each editor's bootstrap command once.
#[derive(Debug)]
pub struct SetupEditors;

fn bootstraps(ctx: &Context) -> Vec<BootstrapResource<'_>> {
    ctx.config
        .editors
        .iter()
        .map(|editor| {
            BootstrapResource::new(
                editor.name.clone(),
                editor.command.clone(),
                ctx.expand(&editor.creates),
                ctx.home(),
                &*ctx.executor,
            )
        })
        .collect()
}

impl Task for SetupEditors {
    fn id(&self) -> TaskId {
        TaskId::SetupEditors
    }

    fn should_run(&self, ctx: &Context) -> bool {
        !ctx.config.editors.is_empty()
    }

    fn requires_terminal(&self, ctx: &Context) -> bool {
        bootstraps(ctx)
            .iter()
            .any(|b| b.needs_change().unwrap_or(true))
    }

    fn is_satisfied(&self, ctx: &Context) -> Result<bool> {
        all_correct(&bootstraps(ctx))
    }

    fn run(&self, ctx: &Context) -> Result<TaskResult> {
        process_resources(ctx, bootstraps(ctx), "bootstrap")
    }
}
