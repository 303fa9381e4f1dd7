//! Tracing subscriber setup: console formatter, file layer, and initialisation.
use std::fs;
use std::io::Write as _;
use std::path::Path;
use std::sync::Mutex;

use anyhow::{Context as _, Result};

use super::utils::{format_datetime, format_time, strip_ansi};

/// Target for step headers.
pub(super) const STEP: &str = "setup::step";
/// Target for success lines.
pub(super) const SUCCESS: &str = "setup::success";
/// Target for dry-run lines.
pub(super) const DRY_RUN: &str = "setup::dry_run";
/// Target for prompt records (written to the log file only).
pub(super) const PROMPT: &str = "setup::prompt";

/// Extracts the `message` field from a [`tracing::Event`].
#[derive(Default)]
struct MessageExtractor {
    message: String,
}

impl tracing::field::Visit for MessageExtractor {
    fn record_debug(&mut self, field: &tracing::field::Field, value: &dyn std::fmt::Debug) {
        if field.name() == "message" {
            self.message = format!("{value:?}");
        }
    }

    fn record_str(&mut self, field: &tracing::field::Field, value: &str) {
        if field.name() == "message" {
            self.message = value.to_string();
        }
    }
}

/// A [`tracing_subscriber::Layer`] that appends every event to the per-run
/// log file with timestamps and ANSI codes stripped.
///
/// Always captures events at `DEBUG` level and above regardless of the
/// console verbosity, so the log holds the full command trace.
#[derive(Debug)]
pub(super) struct FileLayer {
    file: Mutex<fs::File>,
}

impl FileLayer {
    /// Create the log file at `path`, write a run header, and return a layer
    /// appending to it.
    pub(super) fn create(path: &Path) -> std::io::Result<Self> {
        let version = crate::VERSION;
        let mut file = fs::OpenOptions::new()
            .create_new(true)
            .append(true)
            .open(path)?;
        write!(
            file,
            "==========================================\n\
             workstation-setup {version} {}\n\
             ==========================================\n",
            format_datetime(),
        )?;
        Ok(Self {
            file: Mutex::new(file),
        })
    }
}

impl<S: tracing::Subscriber> tracing_subscriber::Layer<S> for FileLayer {
    fn on_event(
        &self,
        event: &tracing::Event<'_>,
        _ctx: tracing_subscriber::layer::Context<'_, S>,
    ) {
        let metadata = event.metadata();
        let level = *metadata.level();
        let target = metadata.target();

        let mut extractor = MessageExtractor::default();
        event.record(&mut extractor);
        let msg = strip_ansi(&extractor.message);
        let ts = format_time();

        let line = match (level, target) {
            (tracing::Level::INFO, STEP) => format!("[{ts}] ==> {msg}"),
            (tracing::Level::INFO, SUCCESS) => format!("[{ts}]     [ok] {msg}"),
            (tracing::Level::INFO, DRY_RUN) => format!("[{ts}]     [dry run] {msg}"),
            (tracing::Level::INFO, PROMPT) => format!("[{ts}]     [prompt] {msg}"),
            (tracing::Level::ERROR, _) => format!("[{ts}]     [error] {msg}"),
            (tracing::Level::WARN, _) => format!("[{ts}]     [warn] {msg}"),
            (tracing::Level::DEBUG | tracing::Level::TRACE, _) => {
                format!("[{ts}]     [debug] {msg}")
            }
            _ => format!("[{ts}]     {msg}"),
        };

        if let Ok(mut f) = self.file.lock() {
            writeln!(f, "{line}").ok();
        }
    }
}

/// A [`tracing_subscriber::fmt::FormatEvent`] that emits the console style
/// of the setup tool.
struct ConsoleFormatter;

impl<S, N> tracing_subscriber::fmt::FormatEvent<S, N> for ConsoleFormatter
where
    S: tracing::Subscriber + for<'a> tracing_subscriber::registry::LookupSpan<'a>,
    N: for<'a> tracing_subscriber::fmt::FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        _ctx: &tracing_subscriber::fmt::FmtContext<'_, S, N>,
        mut writer: tracing_subscriber::fmt::format::Writer<'_>,
        event: &tracing::Event<'_>,
    ) -> std::fmt::Result {
        let metadata = event.metadata();
        let level = *metadata.level();
        let target = metadata.target();

        let mut extractor = MessageExtractor::default();
        event.record(&mut extractor);
        let msg = &extractor.message;

        match level {
            tracing::Level::ERROR => writeln!(writer, "\x1b[31mERROR\x1b[0m {msg}"),
            tracing::Level::WARN => writeln!(writer, "\x1b[33mWARN\x1b[0m  {msg}"),
            tracing::Level::INFO if target == STEP => {
                writeln!(writer, "\x1b[1;34m==>\x1b[0m \x1b[1m{msg}\x1b[0m")
            }
            tracing::Level::INFO if target == SUCCESS => {
                writeln!(writer, "  \x1b[32m✓\x1b[0m {msg}")
            }
            tracing::Level::INFO if target == DRY_RUN => {
                writeln!(writer, "  \x1b[33m[DRY RUN]\x1b[0m {msg}")
            }
            // The prompter draws the question itself.
            tracing::Level::INFO if target == PROMPT => Ok(()),
            tracing::Level::INFO => writeln!(writer, "  {msg}"),
            _ => writeln!(writer, "  \x1b[2m[debug] {msg}\x1b[0m"),
        }
    }
}

/// Initialise the global [`tracing`] subscriber for a run.
///
/// The console layer prints INFO to stdout and everything else (warnings,
/// errors, debug diagnostics) to stderr, so debug output can be redirected
/// separately. The console shows DEBUG only when `debug` is set. The file
/// layer records every event at DEBUG and above into `log_file`.
///
/// Must be called at most once per process.
///
/// # Errors
///
/// Returns an error if the log file cannot be created or a global
/// subscriber is already installed.
pub fn init_subscriber(debug: bool, log_file: &Path) -> Result<()> {
    use tracing_subscriber::fmt::writer::MakeWriterExt as _;
    use tracing_subscriber::{
        Layer as _, filter::LevelFilter, fmt, layer::SubscriberExt as _,
        util::SubscriberInitExt as _,
    };

    let console_level = if debug {
        LevelFilter::DEBUG
    } else {
        LevelFilter::INFO
    };

    let make_writer = std::io::stderr
        .with_filter(|meta: &tracing::Metadata<'_>| *meta.level() != tracing::Level::INFO)
        .or_else(std::io::stdout);

    let console_layer = fmt::layer()
        .event_format(ConsoleFormatter)
        .with_writer(make_writer)
        .with_filter(console_level);

    let file_layer = FileLayer::create(log_file)
        .with_context(|| format!("creating log file {}", log_file.display()))?
        .with_filter(LevelFilter::DEBUG);

    tracing_subscriber::registry()
        .with(console_layer)
        .with(file_layer)
        .try_init()
        .context("installing tracing subscriber")
}
