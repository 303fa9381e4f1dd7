use anyhow::{Context as _, Result};

use super::context::Context;
use crate::resources::{Resource, ResourceChange, ResourceState};

/// Result of a single task execution.
///
/// # Examples
///
/// ```
/// use workstation_setup::tasks::TaskResult;
///
/// let ok = TaskResult::Ok;
/// let dry = TaskResult::DryRun;
///
/// assert!(matches!(ok, TaskResult::Ok));
/// assert!(matches!(dry, TaskResult::DryRun));
/// ```
#[derive(Debug, Clone)]
pub enum TaskResult {
    /// Task completed successfully.
    Ok,
    /// Task ran in dry-run mode.
    DryRun,
}

/// Counters for tasks that process many resources.
///
/// # Examples
///
/// ```
/// use workstation_setup::tasks::TaskStats;
///
/// let mut stats = TaskStats::new();
/// stats.changed = 3;
/// stats.already_ok = 10;
///
/// assert_eq!(stats.summary(false), "3 changed, 10 already ok");
/// assert_eq!(stats.summary(true), "3 would change, 10 already ok");
/// ```
#[derive(Debug, Default)]
pub struct TaskStats {
    /// Number of items changed or applied.
    pub changed: u32,
    /// Number of items already in the correct state.
    pub already_ok: u32,
}

impl TaskStats {
    /// Create a new empty stats counter.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Format the summary string (e.g. "3 changed, 10 already ok").
    #[must_use]
    pub fn summary(&self, dry_run: bool) -> String {
        let verb = if dry_run { "would change" } else { "changed" };
        format!("{} {verb}, {} already ok", self.changed, self.already_ok)
    }

    /// Log the summary and return the appropriate `TaskResult`.
    #[must_use]
    pub fn finish(self, ctx: &Context) -> TaskResult {
        ctx.log.info(&self.summary(ctx.dry_run));
        if ctx.dry_run {
            TaskResult::DryRun
        } else {
            TaskResult::Ok
        }
    }
}

impl std::ops::AddAssign for TaskStats {
    fn add_assign(&mut self, other: Self) {
        self.changed += other.changed;
        self.already_ok += other.already_ok;
    }
}

/// Whether every resource is already [`ResourceState::Correct`].
///
/// Stops at the first resource that is not.
///
/// # Errors
///
/// Propagates errors from [`Resource::current_state`].
pub fn all_correct<'r, R: Resource + 'r>(resources: impl IntoIterator<Item = &'r R>) -> Result<bool> {
    for resource in resources {
        if resource.current_state()? != ResourceState::Correct {
            return Ok(false);
        }
    }
    Ok(true)
}

/// Pair every resource with its current state.
///
/// # Errors
///
/// Propagates errors from [`Resource::current_state`].
pub fn resource_states<R: Resource>(
    resources: impl IntoIterator<Item = R>,
) -> Result<Vec<(R, ResourceState)>> {
    resources
        .into_iter()
        .map(|resource| {
            let state = resource.current_state()?;
            Ok((resource, state))
        })
        .collect()
}

/// Whether any state calls for a change.
#[must_use]
pub fn any_pending<R>(states: &[(R, ResourceState)]) -> bool {
    states.iter().any(|(_, state)| {
        matches!(
            state,
            ResourceState::Missing | ResourceState::Incorrect { .. }
        )
    })
}

/// Process resources by checking each one's current state and applying as needed.
///
/// `verb` names the change in log messages (e.g. "install", "link").
///
/// # Errors
///
/// Returns an error if any resource fails to check its state, is invalid,
/// or fails to apply.
pub fn process_resources<R: Resource>(
    ctx: &Context,
    resources: impl IntoIterator<Item = R>,
    verb: &str,
) -> Result<TaskResult> {
    let mut stats = TaskStats::new();
    for resource in resources {
        let current = resource.current_state()?;
        stats += process_single(ctx, &resource, current, verb)?;
    }
    Ok(stats.finish(ctx))
}

/// Process resources with pre-computed states.
///
/// For tasks that batch-query state (e.g. installed packages) and then
/// iterate with cached results.
///
/// # Errors
///
/// Returns an error if any resource is invalid or fails to apply.
pub fn process_resource_states<R: Resource>(
    ctx: &Context,
    resource_states: impl IntoIterator<Item = (R, ResourceState)>,
    verb: &str,
) -> Result<TaskResult> {
    let mut stats = TaskStats::new();
    for (resource, current) in resource_states {
        stats += process_single(ctx, &resource, current, verb)?;
    }
    Ok(stats.finish(ctx))
}

/// Process a single resource given its current state, returning a stats delta.
fn process_single<R: Resource>(
    ctx: &Context,
    resource: &R,
    resource_state: ResourceState,
    verb: &str,
) -> Result<TaskStats> {
    let desc = resource.description();
    let mut delta = TaskStats::new();
    match resource_state {
        ResourceState::Correct => {
            ctx.log.debug(&format!("ok: {desc}"));
            delta.already_ok += 1;
        }
        ResourceState::Invalid { reason } => {
            anyhow::bail!("cannot {verb} {desc}: {reason}");
        }
        ResourceState::Incorrect { current } if ctx.dry_run => {
            ctx.log
                .dry_run(&format!("would {verb} {desc} (currently {current})"));
            delta.changed += 1;
        }
        ResourceState::Missing if ctx.dry_run => {
            ctx.log.dry_run(&format!("would {verb}: {desc}"));
            delta.changed += 1;
        }
        ResourceState::Missing | ResourceState::Incorrect { .. } => {
            delta += apply_resource(ctx, resource, verb)?;
        }
    }
    Ok(delta)
}

/// Apply a single resource change, returning a stats delta.
fn apply_resource<R: Resource>(ctx: &Context, resource: &R, verb: &str) -> Result<TaskStats> {
    let desc = resource.description();
    let mut delta = TaskStats::new();
    let change = resource
        .apply()
        .with_context(|| format!("failed to {verb} {desc}"))?;
    match change {
        ResourceChange::Applied => {
            ctx.log.info(&format!("{verb}: {desc}"));
            delta.changed += 1;
        }
        ResourceChange::AlreadyCorrect => {
            delta.already_ok += 1;
        }
    }
    Ok(delta)
}
