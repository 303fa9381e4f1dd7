//! Workstation provisioning engine.
//!
//! Brings an Arch Linux workstation to a configured state through a fixed,
//! ordered list of idempotent tasks driven by `setup.toml`. Each task can be
//! run on its own (`--<task>`), documented (`--<task> --docs`) or confirmed
//! interactively as part of a full run.
//!
//! The public API is organised into four layers:
//!
//! - **[`config`]**: parse and validate `setup.toml`
//! - **[`resources`]**: idempotent `check + apply` primitives (packages, links, services, …)
//! - **[`tasks`]**: the ordered task table wired to resources
//! - **[`commands`]**: invocation handlers and the orchestrator
#![deny(clippy::or_fun_call)]
#![deny(clippy::bool_to_int_with_if)]

pub mod cli;
pub mod commands;
pub mod config;
pub mod docs;
pub mod environment;
pub mod error;
pub mod exec;
pub mod logging;
pub mod platform;
pub mod prompt;
pub mod resources;
pub mod scratch;
pub mod tasks;

/// Version reported by `--version` and in the log header.
pub const VERSION: &str = match option_env!("SETUP_VERSION") {
    Some(v) => v,
    None => env!("CARGO_PKG_VERSION"),
};
