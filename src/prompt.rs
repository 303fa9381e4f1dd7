//! Three-way confirmation prompt shown before each task in full mode.
use std::fs::OpenOptions;
use std::io::{self, BufRead, BufReader, Write};

use anyhow::{Context as _, Result};

/// A user's answer to a confirmation prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Answer {
    /// Run the task.
    Yes,
    /// Skip this task and continue with the next one.
    Skip,
    /// Stop the whole run.
    Abort,
}

impl std::fmt::Display for Answer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Yes => write!(f, "run"),
            Self::Skip => write!(f, "skip"),
            Self::Abort => write!(f, "abort"),
        }
    }
}

/// Interpret one line of input.
///
/// Empty input selects the default (run). Returns `None` when the input
/// matches no choice and the question should be asked again.
#[must_use]
pub fn parse_answer(input: &str) -> Option<Answer> {
    let input = input.trim();
    match input.chars().next().map(|c| c.to_ascii_lowercase()) {
        None | Some('y') => Some(Answer::Yes),
        Some('s') => Some(Answer::Skip),
        Some('a') => Some(Answer::Abort),
        Some(_) => None,
    }
}

/// Source of confirmation answers.
#[cfg_attr(test, mockall::automock)]
pub trait Prompter: Send + Sync {
    /// Ask `question` and wait for an answer.
    ///
    /// # Errors
    ///
    /// Returns an error if the terminal cannot be read or written.
    fn ask(&self, question: &str) -> Result<Answer>;
}

/// Prompts on the controlling terminal.
///
/// Reads from `/dev/tty` so answers still come from the user when stdin is
/// redirected; falls back to stdin/stdout when there is no controlling
/// terminal.
#[derive(Debug, Default, Clone, Copy)]
pub struct TerminalPrompter;

impl Prompter for TerminalPrompter {
    fn ask(&self, question: &str) -> Result<Answer> {
        match OpenOptions::new().read(true).write(true).open("/dev/tty") {
            Ok(tty) => {
                let writer = tty.try_clone().context("cloning terminal handle")?;
                ask_with(&mut BufReader::new(tty), writer, question)
            }
            Err(_) => ask_with(&mut io::stdin().lock(), io::stdout(), question),
        }
    }
}

/// Ask `question` on `output` and read answers from `input` until one is valid.
///
/// End of input counts as [`Answer::Abort`]: no answer can ever arrive, and
/// running unconfirmed changes is not an option.
///
/// # Errors
///
/// Returns an error if reading or writing fails.
pub fn ask_with<R: BufRead, W: Write>(
    input: &mut R,
    mut output: W,
    question: &str,
) -> Result<Answer> {
    loop {
        write!(output, "{question} [Y]es / [s]kip / [a]bort: ").context("writing prompt")?;
        output.flush().context("flushing prompt")?;

        let mut line = String::new();
        if input.read_line(&mut line).context("reading answer")? == 0 {
            writeln!(output).ok();
            return Ok(Answer::Abort);
        }
        if let Some(answer) = parse_answer(&line) {
            return Ok(answer);
        }
        writeln!(output, "please answer y, s, or a").context("writing prompt")?;
    }
}
