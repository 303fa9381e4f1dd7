//! Root-owned file whose entire contents are generated by this tool.
use std::path::{Path, PathBuf};

use anyhow::{Context as _, Result};

use super::{Resource, ResourceChange, ResourceState};
use crate::exec::Executor;

/// First line of every managed file.
pub const MANAGED_MARKER: &str = "# Managed by workstation-setup; local edits are overwritten.";

/// A system file written through `sudo tee`.
#[derive(Debug)]
pub struct ManagedFileResource<'a> {
    path: PathBuf,
    content: String,
    executor: &'a dyn Executor,
}

impl<'a> ManagedFileResource<'a> {
    /// Create a managed file with the marker line followed by `lines`.
    #[must_use]
    pub fn new(path: &Path, lines: &[String], executor: &'a dyn Executor) -> Self {
        let mut content = String::from(MANAGED_MARKER);
        content.push('\n');
        for line in lines {
            content.push_str(line);
            content.push('\n');
        }
        Self {
            path: path.to_path_buf(),
            content,
            executor,
        }
    }

    /// Rendered file contents.
    #[must_use]
    pub fn content(&self) -> &str {
        &self.content
    }
}

impl Resource for ManagedFileResource<'_> {
    fn description(&self) -> String {
        self.path.display().to_string()
    }

    fn current_state(&self) -> Result<ResourceState> {
        match std::fs::read_to_string(&self.path) {
            Ok(existing) if existing == self.content => Ok(ResourceState::Correct),
            Ok(existing) if existing.lines().next() == Some(MANAGED_MARKER) => {
                Ok(ResourceState::Incorrect {
                    current: "outdated".to_string(),
                })
            }
            Ok(_) => Ok(ResourceState::Incorrect {
                current: "not managed by this tool".to_string(),
            }),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(ResourceState::Missing),
            Err(e) => Err(e).with_context(|| format!("reading {}", self.path.display())),
        }
    }

    fn apply(&self) -> Result<ResourceChange> {
        if let Some(parent) = self.path.parent() {
            self.executor
                .run("sudo", &["mkdir", "-p", &parent.to_string_lossy()])?;
        }
        self.executor.run_with_input(
            "sudo",
            &["tee", &self.path.to_string_lossy()],
            &self.content,
        )?;
        Ok(ResourceChange::Applied)
    }
}
