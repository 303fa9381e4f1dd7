//! Provisioning configuration loaded from `setup.toml` in the provisioning root.
//!
//! Every section is optional; an absent section leaves its task with
//! nothing to do. Unknown keys are rejected so typos fail loudly.
pub mod packages;
pub mod system;
pub mod toml_loader;
pub mod user;
pub mod validation;

use std::path::Path;

use serde::Deserialize;

pub use packages::{CleanupConfig, PackagesConfig, RepositoriesConfig};
pub use system::{HardeningConfig, LoginManagerConfig, PreflightConfig, SysctlValue};
pub use user::{DotfilesConfig, EditorConfig, HomeManagerConfig, UserConfig};

use crate::error::ConfigError;

/// Name of the configuration file inside the provisioning root.
pub const CONFIG_FILE: &str = "setup.toml";

/// All provisioning configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Pre-flight check settings.
    pub preflight: PreflightConfig,
    /// Repositories to enable.
    pub repositories: RepositoriesConfig,
    /// Packages to install.
    pub packages: PackagesConfig,
    /// Dotfiles to link.
    pub dotfiles: DotfilesConfig,
    /// Per-user configuration.
    pub user: UserConfig,
    /// Editors to bootstrap.
    pub editors: Vec<EditorConfig>,
    /// Cleanup settings.
    pub cleanup: CleanupConfig,
    /// Display manager to install and enable.
    pub login_manager: Option<LoginManagerConfig>,
    /// Firewall and kernel hardening.
    pub hardening: HardeningConfig,
}

impl Config {
    /// Load `setup.toml` from `root`.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] if the file is missing, unreadable, or invalid.
    pub fn load(root: &Path) -> Result<Self, ConfigError> {
        toml_loader::load_toml(&root.join(CONFIG_FILE))
    }
}
