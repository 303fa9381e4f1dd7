//! Utility functions for log path resolution, ANSI stripping, and time formatting.
use std::fs;
use std::path::{Path, PathBuf};

/// Strip ANSI escape sequences from a string.
///
/// Handles SGR sequences (ending in `m`) and other CSI sequences (ending
/// in any letter in the `@`..`~` range), so cursor movement, erase, etc.
/// are also stripped without consuming unrelated text.
pub(super) fn strip_ansi(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut chars = s.chars();
    while let Some(c) = chars.next() {
        if c == '\x1b' {
            if let Some(next) = chars.next()
                && next == '['
            {
                for inner in chars.by_ref() {
                    if ('@'..='~').contains(&inner) {
                        break;
                    }
                }
            }
        } else {
            out.push(c);
        }
    }
    out
}

/// Return the terminal width in columns.
///
/// Asks the terminal first, then `COLUMNS`, then falls back to 80.
pub(super) fn terminal_columns() -> usize {
    if let Some((terminal_size::Width(w), _)) = terminal_size::terminal_size()
        && w > 0
    {
        return usize::from(w);
    }
    std::env::var("COLUMNS")
        .ok()
        .and_then(|v| v.parse::<usize>().ok())
        .filter(|&n| n > 0)
        .unwrap_or(80)
}

/// Default directory for run logs.
///
/// `$SETUP_LOG_DIR` is handled by the CLI layer; this resolves
/// `$XDG_STATE_HOME/workstation-setup/logs` (default
/// `~/.local/state/workstation-setup/logs`).
#[must_use]
pub fn default_log_dir() -> PathBuf {
    let state_dir = std::env::var_os("XDG_STATE_HOME")
        .map(PathBuf::from)
        .filter(|p| p.is_absolute())
        .unwrap_or_else(|| {
            dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".local/state")
        });
    state_dir.join("workstation-setup").join("logs")
}

/// Build a fresh, unique log file path in `dir`, creating the directory.
///
/// Names follow `setup-YYYYMMDD-HHMMSS.log`; a `-N` suffix is added when a
/// run in the same second already claimed the name.
///
/// # Errors
///
/// Returns an error if the directory cannot be created.
pub fn new_log_file_path(dir: &Path) -> std::io::Result<PathBuf> {
    fs::create_dir_all(dir)?;
    let stamp = chrono::Local::now().format("%Y%m%d-%H%M%S").to_string();
    let first = dir.join(format!("setup-{stamp}.log"));
    if !first.exists() {
        return Ok(first);
    }
    let mut n = 1u32;
    loop {
        let candidate = dir.join(format!("setup-{stamp}-{n}.log"));
        if !candidate.exists() {
            return Ok(candidate);
        }
        n += 1;
    }
}

/// Format the current local time as `YYYY-MM-DD HH:MM:SS`.
pub(super) fn format_datetime() -> String {
    chrono::Local::now().format("%Y-%m-%d %H:%M:%S").to_string()
}

/// Format the current local time as `HH:MM:SS`.
pub(super) fn format_time() -> String {
    chrono::Local::now().format("%H:%M:%S").to_string()
}
