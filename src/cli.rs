//! Command-line parsing: fixed options plus one generated flag per task.
use std::ffi::OsString;
use std::path::PathBuf;

use clap::parser::ValueSource;
use clap::{Arg, ArgAction, ArgMatches, CommandFactory, FromArgMatches, Parser};
use clap_complete::Shell;

use crate::tasks::TaskId;

/// Ordered, resumable workstation provisioning.
///
/// Without task flags every task runs in canonical order, prompting before
/// each one that still has work to do. With task flags only the named tasks
/// run, in the order given, after the pre-flight checks.
#[derive(Parser, Debug)]
#[command(name = "setup", version = crate::VERSION)]
pub struct Cli {
    /// Print documentation for the preceding task flag, or for all tasks
    #[arg(long)]
    pub docs: bool,

    /// Trace every external command; debug lines go to stderr
    #[arg(long)]
    pub debug: bool,

    /// Report what would change without changing anything
    #[arg(short = 'n', long)]
    pub dry_run: bool,

    /// Provisioning root containing setup.toml
    #[arg(long, env = "SETUP_ROOT", value_name = "DIR")]
    pub root: Option<PathBuf>,

    /// Directory for run logs
    #[arg(long, env = "SETUP_LOG_DIR", value_name = "DIR")]
    pub log_dir: Option<PathBuf>,

    /// Print a shell completion script and exit
    #[arg(long, value_name = "SHELL")]
    pub completions: Option<Shell>,
}

/// Which tasks a run covers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selection {
    /// Full mode: every task in canonical order, with confirmation prompts.
    All,
    /// Selective mode: the named tasks in command-line order, no prompts.
    Only(Vec<TaskId>),
}

impl Selection {
    /// Resolve the selection into the ordered list of tasks to execute.
    ///
    /// `pre-flight-checks` always comes first and never runs twice.
    #[must_use]
    pub fn plan(&self) -> Vec<TaskId> {
        match self {
            Self::All => TaskId::ALL.to_vec(),
            Self::Only(requested) => {
                let mut plan = vec![TaskId::PreFlightChecks];
                for id in requested {
                    if !plan.contains(id) {
                        plan.push(*id);
                    }
                }
                plan
            }
        }
    }

    /// Whether tasks are confirmed interactively before running.
    #[must_use]
    pub const fn is_full(&self) -> bool {
        matches!(self, Self::All)
    }
}

/// Options for a run that executes tasks.
#[derive(Debug, Clone)]
pub struct RunRequest {
    /// Tasks to execute.
    pub selection: Selection,
    /// Show debug lines on the console.
    pub debug: bool,
    /// Preview only.
    pub dry_run: bool,
    /// Explicit provisioning root.
    pub root: Option<PathBuf>,
    /// Explicit log directory.
    pub log_dir: Option<PathBuf>,
}

/// What the invocation asks for.
#[derive(Debug, Clone)]
pub enum Invocation {
    /// Print documentation for one task, or for all tasks when `None`.
    Docs(Option<TaskId>),
    /// Print a completion script.
    Completions(Shell),
    /// Execute tasks.
    Run(RunRequest),
}

/// Build the full command: derived options plus the generated task flags.
#[must_use]
pub fn command() -> clap::Command {
    TaskId::ALL.iter().fold(Cli::command(), |cmd, id| {
        cmd.arg(
            Arg::new(id.name())
                .long(id.name())
                .action(ArgAction::SetTrue)
                .help(id.summary())
                .help_heading("Tasks"),
        )
    })
}

/// Parse the process arguments.
///
/// # Errors
///
/// Returns the clap error for unknown flags, `--help`, and `--version`; the
/// caller hands it to [`clap::Error::exit`].
pub fn parse() -> Result<Invocation, clap::Error> {
    parse_from(std::env::args_os())
}

/// Parse an explicit argument list (the first item is the program name).
///
/// # Errors
///
/// See [`parse`].
pub fn parse_from<I, T>(args: I) -> Result<Invocation, clap::Error>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    let matches = command().try_get_matches_from(args)?;
    let cli = Cli::from_arg_matches(&matches)?;
    Ok(interpret(&cli, &matches))
}

/// Task flags present on the command line with their argument indices,
/// sorted into command-line order.
fn requested_tasks(matches: &ArgMatches) -> Vec<(usize, TaskId)> {
    let mut found: Vec<(usize, TaskId)> = TaskId::ALL
        .iter()
        .filter(|id| matches.value_source(id.name()) == Some(ValueSource::CommandLine))
        .filter_map(|id| matches.index_of(id.name()).map(|idx| (idx, *id)))
        .collect();
    found.sort_by_key(|(idx, _)| *idx);
    found
}

fn interpret(cli: &Cli, matches: &ArgMatches) -> Invocation {
    let requested = requested_tasks(matches);

    if let Some(shell) = cli.completions {
        return Invocation::Completions(shell);
    }

    if cli.docs {
        let docs_idx = matches.index_of("docs");
        let target = docs_idx.and_then(|docs| {
            requested
                .iter()
                .find(|(idx, _)| idx + 1 == docs)
                .map(|(_, id)| *id)
        });
        return Invocation::Docs(target);
    }

    let selection = if requested.is_empty() {
        Selection::All
    } else {
        Selection::Only(requested.into_iter().map(|(_, id)| id).collect())
    };

    Invocation::Run(RunRequest {
        selection,
        debug: cli.debug,
        dry_run: cli.dry_run,
        root: cli.root.clone(),
        log_dir: cli.log_dir.clone(),
    })
}
