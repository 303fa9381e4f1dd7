//! The ordered table of provisioning tasks and the machinery to run one.
pub mod cleanup;
mod context;
pub mod dotfiles;
pub mod editors;
pub mod hardening;
pub mod login_manager;
pub mod packages;
pub mod preflight;
mod processing;
pub mod repositories;
pub mod user;

pub use context::Context;
pub use processing::{
    TaskResult, TaskStats, all_correct, any_pending, process_resource_states,
    process_resources, resource_states,
};

use std::fmt;

use anyhow::Result;

use crate::error::TaskError;
use crate::logging::TaskStatus;

/// Identifier of a task. Declaration order is the canonical run order.
///
/// # Examples
///
/// ```
/// use workstation_setup::tasks::TaskId;
///
/// assert_eq!(TaskId::ALL[0], TaskId::PreFlightChecks);
/// assert_eq!(TaskId::SetupEditors.name(), "setup-editors");
/// assert_eq!(TaskId::from_name("harden-system"), Some(TaskId::HardenSystem));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum TaskId {
    /// Verify the run can succeed before changing anything.
    PreFlightChecks,
    /// Enable pacman repositories.
    SetupRepositories,
    /// Install native and AUR packages.
    InstallPackages,
    /// Link dotfiles with stow.
    LinkDotfiles,
    /// Login shell, groups, home-manager.
    ConfigureUser,
    /// Editor bootstrap commands.
    SetupEditors,
    /// Remove orphaned packages.
    Cleanup,
    /// Display manager package and service.
    SetupLoginManager,
    /// Firewall and kernel parameters.
    HardenSystem,
}

impl TaskId {
    /// Every task in canonical order.
    pub const ALL: [Self; 9] = [
        Self::PreFlightChecks,
        Self::SetupRepositories,
        Self::InstallPackages,
        Self::LinkDotfiles,
        Self::ConfigureUser,
        Self::SetupEditors,
        Self::Cleanup,
        Self::SetupLoginManager,
        Self::HardenSystem,
    ];

    /// Flag spelling without the leading `--`.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::PreFlightChecks => "pre-flight-checks",
            Self::SetupRepositories => "setup-repositories",
            Self::InstallPackages => "install-packages",
            Self::LinkDotfiles => "link-dotfiles",
            Self::ConfigureUser => "configure-user",
            Self::SetupEditors => "setup-editors",
            Self::Cleanup => "cleanup",
            Self::SetupLoginManager => "setup-login-manager",
            Self::HardenSystem => "harden-system",
        }
    }

    /// One-line description used in `--help`.
    #[must_use]
    pub const fn summary(self) -> &'static str {
        match self {
            Self::PreFlightChecks => "Check user, platform, sudo, network and required files",
            Self::SetupRepositories => "Enable pacman repositories",
            Self::InstallPackages => "Install native and AUR packages",
            Self::LinkDotfiles => "Link dotfiles into the home directory with stow",
            Self::ConfigureUser => "Set login shell, groups and home-manager configuration",
            Self::SetupEditors => "Bootstrap editors",
            Self::Cleanup => "Remove orphaned packages",
            Self::SetupLoginManager => "Install and enable the login manager",
            Self::HardenSystem => "Enable the firewall and apply kernel hardening",
        }
    }

    /// Look up a task by its flag spelling.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|id| id.name() == name)
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A provisioning task.
pub trait Task: Send + Sync {
    /// Which task this is.
    fn id(&self) -> TaskId;

    /// Flag spelling, used in logs and the summary.
    fn name(&self) -> &'static str {
        self.id().name()
    }

    /// Whether there is anything configured for this task on this machine.
    fn should_run(&self, ctx: &Context) -> bool;

    /// Read-only idempotency predicate: `true` when running the task would
    /// change nothing.
    ///
    /// # Errors
    ///
    /// Returns an error if the current state cannot be determined.
    fn is_satisfied(&self, _ctx: &Context) -> Result<bool> {
        Ok(false)
    }

    /// Whether [`run`](Self::run) hands the terminal to an interactive child.
    fn requires_terminal(&self, _ctx: &Context) -> bool {
        false
    }

    /// Execute the task.
    ///
    /// # Errors
    ///
    /// Returns an error if an external command fails or a file cannot be
    /// read or written.
    fn run(&self, ctx: &Context) -> Result<TaskResult>;
}

/// The static task table in canonical order.
#[must_use]
pub fn all_tasks() -> Vec<Box<dyn Task>> {
    vec![
        Box::new(preflight::PreFlightChecks),
        Box::new(repositories::SetupRepositories),
        Box::new(packages::InstallPackages),
        Box::new(dotfiles::LinkDotfiles),
        Box::new(user::ConfigureUser),
        Box::new(editors::SetupEditors),
        Box::new(cleanup::Cleanup),
        Box::new(login_manager::SetupLoginManager),
        Box::new(hardening::HardenSystem),
    ]
}

/// Run a task and record its outcome in the logger.
///
/// # Errors
///
/// Returns [`TaskError::NeedsTerminal`] when the task needs a terminal and
/// none is attached, or [`TaskError::Failed`] when the task returns an error.
pub fn execute(task: &dyn Task, ctx: &Context) -> Result<TaskStatus, TaskError> {
    let name = task.name();
    if !ctx.dry_run && !ctx.interactive && task.requires_terminal(ctx) {
        let err = TaskError::NeedsTerminal(name.to_string());
        ctx.log
            .record_task(name, TaskStatus::Failed, Some("no interactive terminal"));
        return Err(err);
    }

    match task.run(ctx) {
        Ok(TaskResult::Ok) => {
            ctx.log.success(&format!("{name} done"));
            ctx.log.record_task(name, TaskStatus::Ok, None);
            Ok(TaskStatus::Ok)
        }
        Ok(TaskResult::DryRun) => {
            ctx.log.record_task(name, TaskStatus::DryRun, None);
            Ok(TaskStatus::DryRun)
        }
        Err(e) => {
            let reason = format!("{e:#}");
            ctx.log.error(&format!("{name}: {reason}"));
            ctx.log
                .record_task(name, TaskStatus::Failed, Some(&reason));
            Err(TaskError::Failed {
                task: name.to_string(),
                reason,
            })
        }
    }
}
