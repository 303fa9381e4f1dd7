//! Domain-specific error types for the provisioning engine.
//!
//! Internal modules return typed errors (e.g. [`PreconditionError`],
//! [`TaskError`]) or `anyhow::Result` with context; command handlers at the
//! CLI boundary convert everything to [`anyhow::Error`] via `?`.
//!
//! # Error hierarchy
//!
//! ```text
//! SetupError
//! ├── Precondition(PreconditionError)   wrong user, no sudo, no network, missing files
//! ├── Config(ConfigError)               setup.toml missing or malformed
//! ├── Task(TaskError)                   a task's external command failed
//! └── Aborted                           the user answered "abort" at a prompt
//! ```

use std::path::PathBuf;

use thiserror::Error;

/// Top-level error type for a provisioning run.
#[derive(Error, Debug)]
pub enum SetupError {
    /// A pre-flight requirement does not hold; nothing has been changed.
    #[error("Precondition failed: {0}")]
    Precondition(#[from] PreconditionError),

    /// The provisioning configuration could not be loaded.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// A task failed and the run was stopped.
    #[error("{0}")]
    Task(#[from] TaskError),

    /// The user chose to abort at a confirmation prompt.
    #[error("run aborted by user")]
    Aborted,
}

impl SetupError {
    /// Whether the failure was already printed when it happened.
    ///
    /// Task failures are logged by the task runner at the point of failure.
    #[must_use]
    pub const fn is_reported(&self) -> bool {
        matches!(self, Self::Task(TaskError::Failed { .. }))
    }
}

/// Requirements that must hold before any mutating task runs.
#[derive(Error, Debug)]
pub enum PreconditionError {
    /// The tool was started as root instead of the target user.
    #[error("must be run as a regular user, not root (privileged steps use sudo)")]
    RunningAsRoot,

    /// The invoking user could not be determined.
    #[error("cannot determine the invoking user (USER and LOGNAME are unset)")]
    UnknownUser,

    /// The target home directory could not be determined or does not exist.
    #[error("cannot determine home directory for '{0}'")]
    UnknownHome(String),

    /// The provisioning root (directory holding `setup.toml`) was not found.
    #[error("cannot determine provisioning root; use --root or set SETUP_ROOT")]
    UnknownRoot,

    /// The host is not a supported distribution.
    #[error("unsupported platform: {0}")]
    UnsupportedPlatform(String),

    /// No usable privilege elevation mechanism.
    #[error("no usable elevation mechanism: {0}")]
    NoElevation(String),

    /// The network reachability check failed.
    #[error("no network connectivity ({url}): {reason}")]
    NoNetwork {
        /// URL that was requested.
        url: String,
        /// Transport error description.
        reason: String,
    },

    /// A file the run depends on is absent.
    #[error("required file missing: {}", .0.display())]
    MissingFile(PathBuf),
}

/// Errors that arise from loading `setup.toml`.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The configuration file does not exist.
    #[error("configuration file not found: {}", .0.display())]
    Missing(PathBuf),

    /// An I/O error occurred while reading the configuration file.
    #[error("IO error reading config file {}: {source}", .path.display())]
    Io {
        /// Path to the file that could not be read.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// The file is not valid TOML or does not match the schema.
    #[error("invalid configuration in {}: {message}", .path.display())]
    Parse {
        /// Path to the offending file.
        path: PathBuf,
        /// Parser diagnostic.
        message: String,
    },
}

/// Errors that arise during task execution.
#[derive(Error, Debug)]
pub enum TaskError {
    /// A task failed to execute.
    #[error("Task '{task}' failed: {reason}")]
    Failed {
        /// Name of the task that failed.
        task: String,
        /// Human-readable reason for the failure.
        reason: String,
    },

    /// A task hands the terminal to an interactive installer but none is attached.
    #[error("Task '{0}' needs an interactive terminal; re-run it from a terminal session")]
    NeedsTerminal(String),
}
