//! Core logging types: task entries, status, and the [`Log`] trait.

/// Task execution result for summary reporting.
#[derive(Debug, Clone)]
pub struct TaskEntry {
    /// Task name (the flag spelling, e.g. `install-packages`).
    pub name: String,
    /// Final status of the task.
    pub status: TaskStatus,
    /// Optional detail message (e.g., skip reason or error description).
    pub message: Option<String>,
}

/// Status of a finished task.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskStatus {
    /// Task ran and completed successfully.
    Ok,
    /// The idempotency predicate held; nothing was changed.
    Satisfied,
    /// The user chose to skip the task at the prompt.
    Skipped,
    /// Nothing is configured for the task on this machine.
    NotApplicable,
    /// Task ran in dry-run mode; no changes were applied.
    DryRun,
    /// Task encountered an error and stopped the run.
    Failed,
}

impl TaskStatus {
    /// Summary icon and ANSI colour for this status.
    #[must_use]
    pub const fn style(self) -> (&'static str, &'static str) {
        match self {
            Self::Ok => ("✓", "\x1b[32m"),
            Self::Satisfied => ("=", "\x1b[32m"),
            Self::Skipped => ("○", "\x1b[33m"),
            Self::NotApplicable => ("·", "\x1b[2m"),
            Self::DryRun => ("~", "\x1b[37m"),
            Self::Failed => ("✗", "\x1b[31m"),
        }
    }
}

/// Abstraction over the logging backend so task code can log without
/// knowing where output goes.
pub trait Log: Send + Sync {
    /// Log a step header (one per task).
    fn step(&self, msg: &str);
    /// Log an informational message.
    fn info(&self, msg: &str);
    /// Log a success message.
    fn success(&self, msg: &str);
    /// Log a debug message (console only with `--debug`; always in the log file).
    fn debug(&self, msg: &str);
    /// Log a warning message.
    fn warn(&self, msg: &str);
    /// Log an error message.
    fn error(&self, msg: &str);
    /// Log a dry-run action message.
    fn dry_run(&self, msg: &str);
    /// Record a prompt question or answer (log file only).
    fn prompt(&self, msg: &str);
    /// Record a task result for the summary.
    fn record_task(&self, name: &str, status: TaskStatus, message: Option<&str>);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn task_status_equality() {
        assert_eq!(TaskStatus::Ok, TaskStatus::Ok);
        assert_ne!(TaskStatus::Ok, TaskStatus::Satisfied);
        assert_ne!(TaskStatus::Skipped, TaskStatus::NotApplicable);
    }

    #[test]
    fn every_status_has_distinct_icon() {
        let icons: std::collections::HashSet<&str> = [
            TaskStatus::Ok,
            TaskStatus::Satisfied,
            TaskStatus::Skipped,
            TaskStatus::NotApplicable,
            TaskStatus::DryRun,
            TaskStatus::Failed,
        ]
        .into_iter()
        .map(|s| s.style().0)
        .collect();
        assert_eq!(icons.len(), 6);
    }
}
