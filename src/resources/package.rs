//! Package installation resource.
use std::collections::HashSet;

use anyhow::Result;

use super::{Resource, ResourceChange, ResourceState};
use crate::exec::Executor;

/// Where a package comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PackageSource {
    /// Official repositories, installed with `sudo pacman`.
    Native,
    /// The AUR, installed with the named helper (e.g. `paru`).
    Aur(String),
}

impl std::fmt::Display for PackageSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Native => write!(f, "pacman"),
            Self::Aur(helper) => write!(f, "{helper}"),
        }
    }
}

/// A system package resource that can be checked and installed.
#[derive(Debug)]
pub struct PackageResource<'a> {
    /// Package name.
    pub name: String,
    /// Where the package is installed from.
    pub source: PackageSource,
    executor: &'a dyn Executor,
}

impl<'a> PackageResource<'a> {
    /// Create a new package resource.
    #[must_use]
    pub const fn new(name: String, source: PackageSource, executor: &'a dyn Executor) -> Self {
        Self {
            name,
            source,
            executor,
        }
    }

    /// Determine the resource state from a pre-fetched set of installed package names.
    ///
    /// This avoids running a per-package query when used with
    /// [`get_installed_packages`].
    #[must_use]
    pub fn state_from_installed(&self, installed: &HashSet<String>) -> ResourceState {
        if installed.contains(&self.name) {
            ResourceState::Correct
        } else {
            ResourceState::Missing
        }
    }
}

/// Query the full set of installed package names (`pacman -Qq`).
///
/// AUR packages are registered in the same local database, so one query
/// covers both sources.
///
/// # Errors
///
/// Returns an error if pacman cannot be spawned.
pub fn get_installed_packages(executor: &dyn Executor) -> Result<HashSet<String>> {
    let result = executor.run_unchecked("pacman", &["-Qq"])?;
    if !result.success {
        return Ok(HashSet::new());
    }
    Ok(result
        .stdout
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .map(String::from)
        .collect())
}

/// Install a batch of packages with one command per source.
///
/// Native packages use `sudo pacman -S --needed --noconfirm <names…>`; AUR
/// packages use `<helper> -S --needed --noconfirm <names…>`.
///
/// # Errors
///
/// Returns an error if any install command fails.
pub fn batch_install_packages(resources: &[&PackageResource<'_>]) -> Result<()> {
    let native: Vec<&str> = resources
        .iter()
        .filter(|r| r.source == PackageSource::Native)
        .map(|r| r.name.as_str())
        .collect();
    if let Some(first) = resources.iter().find(|r| r.source == PackageSource::Native) {
        let mut args = vec!["pacman", "-S", "--needed", "--noconfirm"];
        args.extend(&native);
        first.executor.run("sudo", &args)?;
    }

    for resource in resources {
        if let PackageSource::Aur(helper) = &resource.source {
            let names: Vec<&str> = resources
                .iter()
                .filter(|r| matches!(&r.source, PackageSource::Aur(h) if h == helper))
                .map(|r| r.name.as_str())
                .collect();
            if names.first() == Some(&resource.name.as_str()) {
                let mut args = vec!["-S", "--needed", "--noconfirm"];
                args.extend(&names);
                resource.executor.run(helper, &args)?;
            }
        }
    }

    Ok(())
}

impl Resource for PackageResource<'_> {
    fn description(&self) -> String {
        format!("{} ({})", self.name, self.source)
    }

    fn current_state(&self) -> Result<ResourceState> {
        let result = self.executor.run_unchecked("pacman", &["-Q", &self.name])?;
        if result.success {
            Ok(ResourceState::Correct)
        } else {
            Ok(ResourceState::Missing)
        }
    }

    fn apply(&self) -> Result<ResourceChange> {
        match &self.source {
            PackageSource::Native => {
                self.executor.run(
                    "sudo",
                    &["pacman", "-S", "--needed", "--noconfirm", &self.name],
                )?;
            }
            PackageSource::Aur(helper) => {
                self.executor
                    .run(helper, &["-S", "--needed", "--noconfirm", &self.name])?;
            }
        }
        Ok(ResourceChange::Applied)
    }
}
