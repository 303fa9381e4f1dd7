//! Package-manager sections: `[repositories]`, `[packages]`, `[cleanup]`.
use std::path::PathBuf;

use serde::Deserialize;

/// Default location of the pacman configuration.
pub const DEFAULT_PACMAN_CONF: &str = "/etc/pacman.conf";

/// Default AUR helper.
pub const DEFAULT_AUR_HELPER: &str = "paru";

/// `[repositories]`: pacman repositories to enable.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RepositoriesConfig {
    /// Path of `pacman.conf`.
    pub pacman_conf: PathBuf,
    /// Repository section names (e.g. `multilib`).
    pub enable: Vec<String>,
}

impl Default for RepositoriesConfig {
    fn default() -> Self {
        Self {
            pacman_conf: PathBuf::from(DEFAULT_PACMAN_CONF),
            enable: Vec::new(),
        }
    }
}

/// `[packages]`: native and AUR packages.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PackagesConfig {
    /// Packages from the official repositories.
    pub native: Vec<String>,
    /// Packages from the AUR.
    pub aur: Vec<String>,
    /// AUR helper command (built from the AUR when missing).
    pub aur_helper: String,
}

impl Default for PackagesConfig {
    fn default() -> Self {
        Self {
            native: Vec::new(),
            aur: Vec::new(),
            aur_helper: DEFAULT_AUR_HELPER.to_string(),
        }
    }
}

impl PackagesConfig {
    /// Whether any package is configured.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.native.is_empty() && self.aur.is_empty()
    }
}

/// `[cleanup]`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CleanupConfig {
    /// Remove packages that were installed as dependencies and are no longer required.
    pub remove_orphans: bool,
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let packages = PackagesConfig::default();
        assert_eq!(packages.aur_helper, "paru");
        assert!(packages.is_empty());
        assert_eq!(
            RepositoriesConfig::default().pacman_conf,
            PathBuf::from("/etc/pacman.conf")
        );
    }

    #[test]
    fn partial_section_keeps_defaults() {
        let packages: PackagesConfig = toml::from_str("aur = [\"yay-bin\"]").unwrap();
        assert_eq!(packages.aur, vec!["yay-bin"]);
        assert_eq!(packages.aur_helper, "paru");
        assert!(!packages.is_empty());
    }

    #[test]
    fn unknown_key_rejected() {
        assert!(toml::from_str::<CleanupConfig>("remove_orphan = true").is_err());
    }
}
