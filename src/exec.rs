//! External command execution behind an injectable [`Executor`].
//!
//! Every command is traced as a `+ program args` debug line before it is
//! spawned, so `--debug` shows the exact command sequence of a run and the
//! log file always records it.
use anyhow::{Context, Result, bail};
use std::io::Write as _;
use std::path::Path;
use std::process::{Command, Output, Stdio};

/// Result of a command execution.
#[derive(Debug, Clone)]
pub struct ExecResult {
    /// Captured standard output (lossy UTF-8).
    pub stdout: String,
    /// Captured standard error (lossy UTF-8).
    pub stderr: String,
    /// Whether the process exited with status 0.
    pub success: bool,
    /// Exit code, or `None` when the process was killed by a signal.
    pub code: Option<i32>,
}

impl From<Output> for ExecResult {
    fn from(output: Output) -> Self {
        Self {
            stdout: String::from_utf8_lossy(&output.stdout).to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
            success: output.status.success(),
            code: output.status.code(),
        }
    }
}

/// Abstraction over process execution so tasks and resources can be tested
/// without touching the host system.
pub trait Executor: Send + Sync + std::fmt::Debug {
    /// Run a command and capture its output. Fails if the command exits non-zero.
    ///
    /// # Errors
    ///
    /// Returns an error if the program cannot be spawned or exits non-zero.
    fn run(&self, program: &str, args: &[&str]) -> Result<ExecResult>;

    /// Run a command in `dir`. Fails if the command exits non-zero.
    ///
    /// # Errors
    ///
    /// Returns an error if the program cannot be spawned or exits non-zero.
    fn run_in(&self, dir: &Path, program: &str, args: &[&str]) -> Result<ExecResult>;

    /// Run a command with `input` written to its stdin. Fails on non-zero exit.
    ///
    /// # Errors
    ///
    /// Returns an error if the program cannot be spawned, its stdin cannot be
    /// written, or it exits non-zero.
    fn run_with_input(&self, program: &str, args: &[&str], input: &str) -> Result<ExecResult>;

    /// Run a command, allowing failure (returns the result without bailing).
    ///
    /// # Errors
    ///
    /// Returns an error only if the program cannot be spawned.
    fn run_unchecked(&self, program: &str, args: &[&str]) -> Result<ExecResult>;

    /// Run a command attached to the current terminal (stdin, stdout and
    /// stderr inherited) for installers that need to interact with the user.
    ///
    /// # Errors
    ///
    /// Returns an error if the program cannot be spawned or exits non-zero.
    fn run_interactive(&self, dir: Option<&Path>, program: &str, args: &[&str]) -> Result<()>;

    /// Check if a program is available on `PATH`.
    fn which(&self, program: &str) -> bool;
}

/// Production [`Executor`] that spawns real processes.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemExecutor;

fn trace(program: &str, args: &[&str]) {
    if args.is_empty() {
        tracing::debug!(target: "setup::trace", "+ {program}");
    } else {
        tracing::debug!(target: "setup::trace", "+ {program} {}", args.join(" "));
    }
}

/// Convert captured output into an [`ExecResult`], bailing on non-zero exit.
fn checked(output: Output, label: &str) -> Result<ExecResult> {
    let result = ExecResult::from(output);
    if !result.success {
        bail!(
            "{label} failed (exit {}): {}",
            result.code.unwrap_or(-1),
            result.stderr.trim()
        );
    }
    Ok(result)
}

impl Executor for SystemExecutor {
    fn run(&self, program: &str, args: &[&str]) -> Result<ExecResult> {
        trace(program, args);
        let output = Command::new(program)
            .args(args)
            .output()
            .with_context(|| format!("failed to execute: {program}"))?;
        checked(output, program)
    }

    fn run_in(&self, dir: &Path, program: &str, args: &[&str]) -> Result<ExecResult> {
        trace(program, args);
        let label = format!("{program} in {}", dir.display());
        let output = Command::new(program)
            .args(args)
            .current_dir(dir)
            .output()
            .with_context(|| format!("failed to execute: {label}"))?;
        checked(output, &label)
    }

    fn run_with_input(&self, program: &str, args: &[&str], input: &str) -> Result<ExecResult> {
        trace(program, args);
        let mut child = Command::new(program)
            .args(args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .with_context(|| format!("failed to execute: {program}"))?;
        if let Some(mut stdin) = child.stdin.take() {
            stdin
                .write_all(input.as_bytes())
                .with_context(|| format!("writing stdin of {program}"))?;
        }
        let output = child
            .wait_with_output()
            .with_context(|| format!("waiting for {program}"))?;
        checked(output, program)
    }

    fn run_unchecked(&self, program: &str, args: &[&str]) -> Result<ExecResult> {
        trace(program, args);
        let output = Command::new(program)
            .args(args)
            .output()
            .with_context(|| format!("failed to execute: {program}"))?;
        Ok(ExecResult::from(output))
    }

    fn run_interactive(&self, dir: Option<&Path>, program: &str, args: &[&str]) -> Result<()> {
        trace(program, args);
        let mut cmd = Command::new(program);
        cmd.args(args)
            .stdin(Stdio::inherit())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit());
        if let Some(dir) = dir {
            cmd.current_dir(dir);
        }
        let status = cmd
            .status()
            .with_context(|| format!("failed to execute: {program}"))?;
        if !status.success() {
            bail!("{program} failed (exit {})", status.code().unwrap_or(-1));
        }
        Ok(())
    }

    fn which(&self, program: &str) -> bool {
        which::which(program).is_ok()
    }
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn run_echo() {
        let result = SystemExecutor.run("echo", &["hello"]).unwrap();
        assert!(result.success, "echo command should succeed");
        assert_eq!(result.stdout.trim(), "hello");
    }

    #[test]
    fn run_failure() {
        let result = SystemExecutor.run("false", &[]);
        assert!(result.is_err(), "non-zero exit should produce an error");
    }

    #[test]
    fn run_unchecked_failure() {
        let result = SystemExecutor.run_unchecked("false", &[]).unwrap();
        assert!(!result.success, "non-zero exit should set success=false");
        assert_eq!(result.code, Some(1));
    }

    #[test]
    fn run_with_input_feeds_stdin() {
        let result = SystemExecutor.run_with_input("cat", &[], "piped").unwrap();
        assert_eq!(result.stdout, "piped");
    }

    #[test]
    fn run_in_uses_directory() {
        let dir = tempfile::tempdir().unwrap();
        let result = SystemExecutor.run_in(dir.path(), "pwd", &[]).unwrap();
        let reported = std::path::PathBuf::from(result.stdout.trim());
        assert_eq!(
            dunce::canonicalize(reported).unwrap(),
            dunce::canonicalize(dir.path()).unwrap()
        );
    }

    #[test]
    fn run_interactive_reports_failure() {
        let result = SystemExecutor.run_interactive(None, "false", &[]);
        assert!(result.is_err());
    }

    #[test]
    fn which_finds_known_program() {
        assert!(SystemExecutor.which("sh"), "sh should be found on Unix");
    }

    #[test]
    fn which_missing_program() {
        assert!(
            !SystemExecutor.which("this-program-does-not-exist-12345"),
            "non-existent program should not be found"
        );
    }
}
