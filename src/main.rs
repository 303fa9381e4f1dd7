//! `setup` binary entry point.

use std::io;
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{Context as _, Result};

use workstation_setup::cli::{self, Invocation, RunRequest};
use workstation_setup::commands;
use workstation_setup::logging::{self, Logger};

fn main() -> ExitCode {
    let _ = enable_ansi_support::enable_ansi_support();
    let invocation = match cli::parse() {
        Ok(invocation) => invocation,
        Err(e) => e.exit(),
    };

    match dispatch(invocation) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            logging::report_fatal(&e);
            ExitCode::FAILURE
        }
    }
}

fn dispatch(invocation: Invocation) -> Result<()> {
    match invocation {
        Invocation::Docs(task) => commands::docs(task, &mut io::stdout().lock()),
        Invocation::Completions(shell) => commands::completions(shell, &mut io::stdout().lock()),
        Invocation::Run(request) => run(&request),
    }
}

fn run(request: &RunRequest) -> Result<()> {
    let dir = request
        .log_dir
        .clone()
        .unwrap_or_else(logging::default_log_dir);
    let path = logging::new_log_file_path(&dir)
        .with_context(|| format!("creating log directory {}", dir.display()))?;
    logging::init_subscriber(request.debug, &path)?;
    let log = Arc::new(Logger::new(Some(path)));
    commands::setup::run(request, &log)
}
