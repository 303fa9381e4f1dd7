//! Per-user sections: `[dotfiles]`, `[user]`, `[[editors]]`.
use std::path::PathBuf;

use serde::Deserialize;

/// `[dotfiles]`: GNU stow packages linked into the home directory.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DotfilesConfig {
    /// Stow directory, relative to the provisioning root.
    pub source: PathBuf,
    /// Package directories under `source` to link.
    pub packages: Vec<String>,
}

impl Default for DotfilesConfig {
    fn default() -> Self {
        Self {
            source: PathBuf::from("dotfiles"),
            packages: Vec::new(),
        }
    }
}

/// `[user]`: login shell, groups and home-manager.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct UserConfig {
    /// Login shell name (e.g. `zsh`), resolved on `PATH`.
    pub shell: Option<String>,
    /// Supplementary groups.
    pub groups: Vec<String>,
    /// Home-manager configuration to apply.
    pub home_manager: Option<HomeManagerConfig>,
}

impl UserConfig {
    /// Whether there is anything to configure.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.shell.is_none() && self.groups.is_empty() && self.home_manager.is_none()
    }
}

/// `[user.home_manager]`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct HomeManagerConfig {
    /// Flake reference passed to `home-manager switch --flake`.
    pub flake: String,
    /// Extension for files moved aside when the switch is retried.
    #[serde(default = "default_backup_extension")]
    pub backup_extension: String,
}

fn default_backup_extension() -> String {
    "backup".to_string()
}

/// One `[[editors]]` entry.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EditorConfig {
    /// Display name.
    pub name: String,
    /// Bootstrap command line (program followed by arguments).
    pub command: Vec<String>,
    /// Path whose existence means the editor is already bootstrapped.
    /// `~/` expands to the home directory.
    pub creates: PathBuf,
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn user_config_empty_by_default() {
        assert!(UserConfig::default().is_empty());
    }

    #[test]
    fn home_manager_backup_extension_defaults() {
        let user: UserConfig =
            toml::from_str("[home_manager]\nflake = \"~/nix#me\"\n").unwrap();
        let hm = user.home_manager.unwrap();
        assert_eq!(hm.flake, "~/nix#me");
        assert_eq!(hm.backup_extension, "backup");
    }

    #[test]
    fn editor_requires_all_fields() {
        assert!(toml::from_str::<EditorConfig>("name = \"nvim\"").is_err());
        let editor: EditorConfig = toml::from_str(
            "name = \"nvim\"\ncommand = [\"nvim\", \"--headless\", \"+Lazy! sync\", \"+qa\"]\ncreates = \"~/.local/share/nvim/lazy\"\n",
        )
        .unwrap();
        assert_eq!(editor.command.len(), 4);
    }

    #[test]
    fn dotfiles_default_source() {
        assert_eq!(DotfilesConfig::default().source, PathBuf::from("dotfiles"));
    }
}
