//! A provisioning run: resolve the environment, load the configuration, then
//! walk the task plan.
use std::io::IsTerminal as _;
use std::sync::Arc;

use anyhow::Result;

use crate::cli::{RunRequest, Selection};
use crate::config::{Config, validation};
use crate::docs::render_task;
use crate::environment::RunEnvironment;
use crate::error::{SetupError, TaskError};
use crate::exec::SystemExecutor;
use crate::logging::{Log, Logger, TaskStatus};
use crate::platform::Platform;
use crate::prompt::{Answer, Prompter, TerminalPrompter};
use crate::scratch::{CleanupGuard, ScratchRegistry, install_signal_handler};
use crate::tasks::{self, Context, Task, TaskId};

const REBOOT_REMINDER: &str = "a reboot may be required for every change to take effect";

/// Run the requested tasks.
///
/// The summary is printed whatever the outcome; the reboot reminder only on
/// success. Scratch paths are removed before returning.
///
/// # Errors
///
/// Returns [`SetupError`] (wrapped) when the environment or configuration
/// cannot be resolved, a task fails, or the user aborts.
pub fn run(request: &RunRequest, log: &Arc<Logger>) -> Result<()> {
    log.info(&format!("workstation-setup {}", crate::VERSION));

    let env = RunEnvironment::resolve(request.root.as_deref()).map_err(SetupError::from)?;
    log.debug(&format!("user: {}, home: {}", env.user, env.home.display()));
    log.debug(&format!("root: {}", env.root.display()));

    let config = Config::load(&env.root).map_err(SetupError::from)?;
    let warnings = validation::validate(&config, &env.root);
    if !warnings.is_empty() {
        log.warn(&format!(
            "found {} configuration warning(s):",
            warnings.len()
        ));
        for warning in &warnings {
            log.warn(&format!(
                "  {} [{}]: {}",
                warning.section, warning.item, warning.message
            ));
        }
    }

    let platform = Platform::detect();
    log.debug(&format!("platform: {}", platform.describe()));

    let scratch = ScratchRegistry::new();
    let _guard = CleanupGuard::new(scratch.clone());
    install_signal_handler(&scratch)?;

    let ctx = Context::new(
        config,
        env,
        platform,
        Arc::clone(log) as Arc<dyn Log>,
        Arc::new(SystemExecutor),
        scratch,
    )
    .with_dry_run(request.dry_run)
    .with_debug(request.debug)
    .with_interactive(std::io::stdin().is_terminal());

    let prompter = TerminalPrompter;
    let outcome = Orchestrator::new(tasks::all_tasks(), &prompter).run(&request.selection, &ctx);

    log.print_summary();
    outcome?;
    log.info(REBOOT_REMINDER);
    Ok(())
}

/// Walks a plan of tasks, asking for confirmation in full mode.
pub struct Orchestrator<'p> {
    tasks: Vec<Box<dyn Task>>,
    prompter: &'p dyn Prompter,
}

impl std::fmt::Debug for Orchestrator<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Orchestrator")
            .field("tasks", &self.tasks.len())
            .finish_non_exhaustive()
    }
}

impl<'p> Orchestrator<'p> {
    /// Build an orchestrator over `tasks`.
    #[must_use]
    pub const fn new(tasks: Vec<Box<dyn Task>>, prompter: &'p dyn Prompter) -> Self {
        Self { tasks, prompter }
    }

    /// Execute the plan for `selection`.
    ///
    /// Stops at the first failing task. Prompts are only shown in full mode
    /// outside dry runs, and never for the pre-flight checks.
    ///
    /// # Errors
    ///
    /// Returns [`SetupError::Task`] when a task fails and
    /// [`SetupError::Aborted`] when the user aborts.
    pub fn run(&self, selection: &Selection, ctx: &Context) -> Result<(), SetupError> {
        let confirm = selection.is_full() && !ctx.dry_run;
        for id in selection.plan() {
            let Some(task) = self.tasks.iter().find(|t| t.id() == id) else {
                ctx.log.debug(&format!("no task registered for {id}"));
                continue;
            };
            self.run_one(task.as_ref(), ctx, confirm)?;
        }
        Ok(())
    }

    fn run_one(&self, task: &dyn Task, ctx: &Context, confirm: bool) -> Result<(), SetupError> {
        let name = task.name();
        ctx.log.step(name);

        if !task.should_run(ctx) {
            ctx.log.info("nothing to do here");
            ctx.log.record_task(name, TaskStatus::NotApplicable, None);
            return Ok(());
        }

        match task.is_satisfied(ctx) {
            Ok(true) => {
                ctx.log.success("already satisfied");
                ctx.log.record_task(name, TaskStatus::Satisfied, None);
                return Ok(());
            }
            Ok(false) => {}
            Err(e) => return Err(fail(ctx, name, &format!("checking state: {e:#}"))),
        }

        if confirm && task.id() != TaskId::PreFlightChecks {
            match self.confirm(task, ctx)? {
                Answer::Yes => {}
                Answer::Skip => {
                    ctx.log.record_task(name, TaskStatus::Skipped, Some("declined"));
                    return Ok(());
                }
                Answer::Abort => {
                    ctx.log.record_task(name, TaskStatus::Skipped, Some("aborted"));
                    return Err(SetupError::Aborted);
                }
            }
        }

        tasks::execute(task, ctx)?;
        Ok(())
    }

    fn confirm(&self, task: &dyn Task, ctx: &Context) -> Result<Answer, SetupError> {
        ctx.log.info(&render_task(task.id()));
        let question = format!("Run {}?", task.name());
        ctx.log.prompt(&question);
        let answer = self
            .prompter
            .ask(&question)
            .map_err(|e| fail(ctx, task.name(), &format!("reading answer: {e:#}")))?;
        ctx.log.prompt(&format!("answer: {answer}"));
        Ok(answer)
    }
}

/// Record `task` as failed and build the error that stops the run.
fn fail(ctx: &Context, task: &str, reason: &str) -> SetupError {
    ctx.log.error(&format!("{task}: {reason}"));
    ctx.log.record_task(task, TaskStatus::Failed, Some(reason));
    TaskError::Failed {
        task: task.to_string(),
        reason: reason.to_string(),
    }
    .into()
}
