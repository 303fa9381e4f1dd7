//! Top-level handlers for each kind of invocation.
pub mod setup;

use std::io::Write;

use anyhow::{Context as _, Result};
use clap_complete::Shell;

use crate::docs::{render_all, render_task};
use crate::tasks::TaskId;

/// Print documentation for one task, or for every task when `task` is `None`.
///
/// # Errors
///
/// Returns an error if `out` cannot be written.
pub fn docs(task: Option<TaskId>, out: &mut impl Write) -> Result<()> {
    let text = task.map_or_else(render_all, render_task);
    writeln!(out, "{text}").context("writing documentation")
}

/// Print a completion script for `shell`.
///
/// # Errors
///
/// Returns an error if `out` cannot be written.
pub fn completions(shell: Shell, out: &mut impl Write) -> Result<()> {
    let mut command = crate::cli::command();
    clap_complete::generate(shell, &mut command, "setup", out);
    out.flush().context("writing completions")
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;

    #[test]
    fn docs_for_one_task() {
        let mut out = Vec::new();
        docs(Some(TaskId::SetupEditors), &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert_eq!(text, format!("{}\n", render_task(TaskId::SetupEditors)));
    }

    #[test]
    fn docs_for_all_tasks_in_order() {
        let mut out = Vec::new();
        docs(None, &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        let positions: Vec<usize> = TaskId::ALL
            .iter()
            .map(|id| text.find(&format!("--{}\n", id.name())).unwrap())
            .collect();
        assert!(positions.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn completions_mention_task_flags() {
        let mut out = Vec::new();
        completions(Shell::Bash, &mut out).unwrap();
        let script = String::from_utf8(out).unwrap();
        assert!(script.contains("--install-packages"));
        assert!(script.contains("--dry-run"));
    }
}
