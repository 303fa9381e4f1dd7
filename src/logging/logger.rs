//! Structured logger with summary collection.
use std::path::PathBuf;
use std::sync::Mutex;

use super::subscriber::{DRY_RUN, PROMPT, STEP, SUCCESS};
use super::types::{Log, TaskEntry, TaskStatus};
use super::utils::terminal_columns;

/// Implement the display methods of [`Log`] by delegating to inherent methods
/// of the same name on the implementing type.
///
/// `record_task` is not included because its signature differs from the
/// `fn(&self, &str)` pattern shared by the display methods.
macro_rules! forward_log_methods {
    ($($method:ident),+ $(,)?) => {
        $(
            fn $method(&self, msg: &str) {
                self.$method(msg);
            }
        )+
    };
}

/// Structured logger with summary collection.
///
/// Every method emits a [`tracing`] event; the subscriber installed by
/// [`init_subscriber`](super::subscriber::init_subscriber) renders it on the
/// console and appends it to the per-run log file.
#[derive(Debug)]
pub struct Logger {
    tasks: Mutex<Vec<TaskEntry>>,
    log_file: Option<PathBuf>,
}

impl Logger {
    /// Create a new logger. `log_file` is only used for display in the summary.
    #[must_use]
    pub const fn new(log_file: Option<PathBuf>) -> Self {
        Self {
            tasks: Mutex::new(Vec::new()),
            log_file,
        }
    }

    /// Return the log file path, if any.
    #[must_use]
    pub const fn log_path(&self) -> Option<&PathBuf> {
        self.log_file.as_ref()
    }

    /// Return a clone of all recorded task entries.
    #[must_use]
    pub fn task_entries(&self) -> Vec<TaskEntry> {
        self.tasks.lock().map_or_else(|_| vec![], |g| g.clone())
    }

    /// Log an error message.
    pub fn error(&self, msg: &str) {
        tracing::error!("{msg}");
    }

    /// Log a warning message.
    pub fn warn(&self, msg: &str) {
        tracing::warn!("{msg}");
    }

    /// Log a step header.
    pub fn step(&self, msg: &str) {
        tracing::info!(target: STEP, "{msg}");
    }

    /// Log an informational message.
    pub fn info(&self, msg: &str) {
        tracing::info!("{msg}");
    }

    /// Log a success message.
    pub fn success(&self, msg: &str) {
        tracing::info!(target: SUCCESS, "{msg}");
    }

    /// Log a debug message (console only with `--debug`).
    pub fn debug(&self, msg: &str) {
        tracing::debug!("{msg}");
    }

    /// Log a dry-run action message.
    pub fn dry_run(&self, msg: &str) {
        tracing::info!(target: DRY_RUN, "{msg}");
    }

    /// Record a prompt question or answer in the log file.
    pub fn prompt(&self, msg: &str) {
        tracing::info!(target: PROMPT, "{msg}");
    }

    /// Record a task result for the summary.
    pub fn record_task(&self, name: &str, status: TaskStatus, message: Option<&str>) {
        if let Ok(mut guard) = self.tasks.lock() {
            guard.push(TaskEntry {
                name: name.to_string(),
                status,
                message: message.map(String::from),
            });
        }
    }

    /// Count the number of failed tasks.
    #[must_use]
    pub fn failure_count(&self) -> usize {
        self.tasks.lock().map_or(0, |guard| {
            guard
                .iter()
                .filter(|t| t.status == TaskStatus::Failed)
                .count()
        })
    }

    /// Print the summary of all recorded tasks.
    pub fn print_summary(&self) {
        let tasks = self.task_entries();
        if tasks.is_empty() {
            return;
        }

        let rule = "─".repeat(terminal_columns().min(60));
        self.info(&format!("\x1b[2m{rule}\x1b[0m"));
        self.step("Summary");

        for task in &tasks {
            let (icon, color) = task.status.style();
            let suffix = task
                .message
                .as_ref()
                .map_or_else(String::new, |msg| format!(" ({msg})"));
            self.info(&format!("{color}{icon} {}{suffix}\x1b[0m", task.name));
        }

        let count = |status: TaskStatus| tasks.iter().filter(|t| t.status == status).count();
        self.info(&format!(
            "{} tasks: \x1b[32m{} ok\x1b[0m, \x1b[32m{} already satisfied\x1b[0m, \x1b[33m{} skipped\x1b[0m, \x1b[2m{} n/a\x1b[0m, \x1b[37m{} dry-run\x1b[0m, \x1b[31m{} failed\x1b[0m",
            tasks.len(),
            count(TaskStatus::Ok),
            count(TaskStatus::Satisfied),
            count(TaskStatus::Skipped),
            count(TaskStatus::NotApplicable),
            count(TaskStatus::DryRun),
            count(TaskStatus::Failed),
        ));

        if let Some(path) = &self.log_file {
            self.info(&format!("\x1b[2mlog: {}\x1b[0m", path.display()));
        }
    }
}

impl Log for Logger {
    forward_log_methods!(step, info, success, debug, warn, error, dry_run, prompt);

    fn record_task(&self, name: &str, status: TaskStatus, message: Option<&str>) {
        self.record_task(name, status, message);
    }
}
