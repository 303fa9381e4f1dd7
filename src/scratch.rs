//! Scratch paths created during a run and their guaranteed removal.
//!
//! Every temporary directory a task creates is registered here *before* it
//! exists on disk. The registry is emptied exactly once per process: by the
//! [`CleanupGuard`] when the run unwinds (success, error, or panic), or by
//! the signal handler when the run is interrupted.
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::{Arc, Mutex};

use anyhow::{Context as _, Result};

/// Exit status used when a run is stopped by a signal.
pub const SIGNAL_EXIT_CODE: i32 = 130;

#[derive(Debug, Default)]
struct Inner {
    paths: Mutex<Vec<PathBuf>>,
    cleaned: AtomicBool,
}

/// Shared list of scratch paths.
///
/// Cloning is cheap; every clone refers to the same list.
#[derive(Debug, Clone, Default)]
pub struct ScratchRegistry {
    inner: Arc<Inner>,
}

impl ScratchRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `path` for removal at the end of the run.
    pub fn register(&self, path: impl Into<PathBuf>) {
        if let Ok(mut paths) = self.inner.paths.lock() {
            paths.push(path.into());
        }
    }

    /// Create a fresh scratch directory under the system temp dir.
    ///
    /// The path is registered before the directory is created, so an
    /// interruption between the two still removes it.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be created.
    pub fn create_dir(&self, prefix: &str) -> Result<PathBuf> {
        static COUNTER: AtomicU32 = AtomicU32::new(0);
        let n = COUNTER.fetch_add(1, Ordering::Relaxed);
        let stamp = chrono::Local::now().format("%H%M%S");
        let path = std::env::temp_dir().join(format!(
            "{prefix}-{}-{stamp}-{n}",
            std::process::id()
        ));
        self.register(&path);
        std::fs::create_dir_all(&path)
            .with_context(|| format!("creating scratch directory {}", path.display()))?;
        Ok(path)
    }

    /// Snapshot of the registered paths.
    #[must_use]
    pub fn paths(&self) -> Vec<PathBuf> {
        self.inner
            .paths
            .lock()
            .map_or_else(|_| Vec::new(), |paths| paths.clone())
    }

    /// Whether [`cleanup`](Self::cleanup) has already run.
    #[must_use]
    pub fn is_cleaned(&self) -> bool {
        self.inner.cleaned.load(Ordering::SeqCst)
    }

    /// Remove every registered path (recursively, best effort).
    ///
    /// Only the first call does any work; later calls return `0`.
    /// Returns the number of paths that were removed.
    pub fn cleanup(&self) -> usize {
        if self.inner.cleaned.swap(true, Ordering::SeqCst) {
            return 0;
        }
        let paths = match self.inner.paths.lock() {
            Ok(mut paths) => std::mem::take(&mut *paths),
            Err(poisoned) => std::mem::take(&mut *poisoned.into_inner()),
        };
        paths.iter().filter(|p| remove_path(p)).count()
    }
}

/// Remove a file or directory tree. Returns `true` if something was removed.
fn remove_path(path: &Path) -> bool {
    match std::fs::symlink_metadata(path) {
        Ok(meta) if meta.is_dir() => std::fs::remove_dir_all(path).is_ok(),
        Ok(_) => std::fs::remove_file(path).is_ok(),
        Err(_) => false,
    }
}

/// Runs [`ScratchRegistry::cleanup`] when dropped.
///
/// Create one at the start of a run and keep it alive until the run ends.
#[derive(Debug)]
#[must_use = "cleanup runs when the guard is dropped"]
pub struct CleanupGuard {
    registry: ScratchRegistry,
}

impl CleanupGuard {
    /// Guard `registry`.
    pub const fn new(registry: ScratchRegistry) -> Self {
        Self { registry }
    }
}

impl Drop for CleanupGuard {
    fn drop(&mut self) {
        let removed = self.registry.cleanup();
        if removed > 0 {
            tracing::debug!("removed {removed} scratch path(s)");
        }
    }
}

/// Clean up after an interrupting signal. Returns the exit status to use.
fn on_signal(registry: &ScratchRegistry) -> i32 {
    tracing::warn!("interrupted; removing scratch paths");
    registry.cleanup();
    SIGNAL_EXIT_CODE
}

/// Install a handler for SIGINT, SIGTERM and SIGHUP that removes every
/// scratch path and exits with status 130.
///
/// # Errors
///
/// Returns an error if a handler is already installed.
pub fn install_signal_handler(registry: &ScratchRegistry) -> Result<()> {
    let registry = registry.clone();
    ctrlc::set_handler(move || std::process::exit(on_signal(&registry)))
        .context("installing signal handler")
}
