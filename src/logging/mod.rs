//! Logging infrastructure for structured console and file output.

mod logger;
mod subscriber;
mod types;
mod utils;

pub use logger::Logger;
pub use subscriber::init_subscriber;
pub use types::{Log, TaskEntry, TaskStatus};
pub use utils::{default_log_dir, new_log_file_path};

use crate::error::SetupError;

/// Report a fatal error.
///
/// Goes through [`tracing`] once a subscriber is installed so the error also
/// lands in the log file; before that (usage or configuration problems that
/// stop the run before logging starts) it is printed straight to stderr.
/// Task failures were already logged where they happened and are not
/// repeated.
#[allow(clippy::print_stderr)]
pub fn report_fatal(err: &anyhow::Error) {
    if err
        .downcast_ref::<SetupError>()
        .is_some_and(SetupError::is_reported)
    {
        return;
    }
    if tracing::dispatcher::has_been_set() {
        tracing::error!("{err:#}");
    } else {
        eprintln!("\x1b[31mERROR\x1b[0m {err:#}");
    }
}

/// Create a Logger backed by an isolated per-thread tracing subscriber with
/// a file layer writing into a temporary directory.
///
/// Returns a [`tracing::dispatcher::DefaultGuard`] that must be kept alive
/// for the duration of the test; dropping it restores the previous
/// thread-local dispatcher.
#[cfg(test)]
#[allow(clippy::expect_used)]
pub(crate) fn isolated_logger() -> (Logger, tempfile::TempDir, tracing::dispatcher::DefaultGuard) {
    use tracing_subscriber::{Layer as _, filter::LevelFilter, layer::SubscriberExt as _};
    let tmp = tempfile::tempdir().expect("failed to create temp dir");
    let path = tmp.path().join("test.log");
    let file_layer = subscriber::FileLayer::create(&path).expect("failed to create file layer");
    let log = Logger::new(Some(path));
    let subscriber =
        tracing_subscriber::registry().with(file_layer.with_filter(LevelFilter::DEBUG));
    let guard = tracing::dispatcher::set_default(&tracing::Dispatch::new(subscriber));
    (log, tmp, guard)
}
