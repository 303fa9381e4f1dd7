//! Pacman repository sections.
use anyhow::Result;

use super::{
    Context, Task, TaskId, TaskResult, all_correct, any_pending,
    process_resource_states, resource_states,
};
use crate::resources::repository::{RepositoryResource, refresh_databases};

/// Enable the configured pacman repositories.
#[derive(Debug)]
pub struct SetupRepositories;

fn repositories(ctx: &Context) -> Vec<RepositoryResource<'_>> {
    let repos = &ctx.config.repositories;
    repos
        .enable
        .iter()
        .map(|name| RepositoryResource::new(name.clone(), &repos.pacman_conf, &*ctx.executor))
        .collect()
}

impl Task for SetupRepositories {
    fn id(&self) -> TaskId {
        TaskId::SetupRepositories
    }

    fn should_run(&self, ctx: &Context) -> bool {
        !ctx.config.repositories.enable.is_empty()
    }

    fn is_satisfied(&self, ctx: &Context) -> Result<bool> {
        all_correct(&repositories(ctx))
    }

    fn run(&self, ctx: &Context) -> Result<TaskResult> {
        let states = resource_states(repositories(ctx))?;
        let changed = any_pending(&states);
        let result = process_resource_states(ctx, states, "enable")?;
        if changed {
            if ctx.dry_run {
                ctx.log.dry_run("would refresh package databases");
            } else {
                refresh_databases(&*ctx.executor)?;
            }
        }
        Ok(result)
    }
}
