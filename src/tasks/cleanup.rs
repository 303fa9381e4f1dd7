//! Orphan package removal.
use anyhow::Result;

use super::{Context, Task, TaskId, TaskResult, all_correct, process_resources};
use crate::resources::orphans::OrphanPackagesResource;

/// Remove orphaned packages.
#[derive(Debug)]
pub struct Cleanup;

impl Task for Cleanup {
    fn id(&self) -> TaskId {
        TaskId::Cleanup
    }

    fn should_run(&self, ctx: &Context) -> bool {
        ctx.config.cleanup.remove_orphans
    }

    fn is_satisfied(&self, ctx: &Context) -> Result<bool> {
        all_correct(&[OrphanPackagesResource::new(&*ctx.executor)])
    }

    fn run(&self, ctx: &Context) -> Result<TaskResult> {
        process_resources(
            ctx,
            std::iter::once(OrphanPackagesResource::new(&*ctx.executor)),
            "remove",
        )
    }
}
