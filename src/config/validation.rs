//! Non-fatal configuration checks reported as warnings before a run.
use std::collections::HashSet;
use std::path::Path;

use super::Config;

/// A validation warning detected during configuration loading.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationWarning {
    /// Configuration section (e.g. `packages`, `editors`).
    pub section: String,
    /// The specific item that triggered the warning.
    pub item: String,
    /// Human-readable warning message.
    pub message: String,
}

impl ValidationWarning {
    #[must_use]
    fn new(section: &str, item: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            section: section.to_string(),
            item: item.into(),
            message: message.into(),
        }
    }
}

/// Check `config` for mistakes that would make a task misbehave.
#[must_use]
pub fn validate(config: &Config, root: &Path) -> Vec<ValidationWarning> {
    let mut warnings = Vec::new();
    check_packages(config, &mut warnings);
    check_dotfiles(config, root, &mut warnings);
    check_editors(config, &mut warnings);
    warnings
}

fn check_packages(config: &Config, warnings: &mut Vec<ValidationWarning>) {
    let mut seen = HashSet::new();
    for name in config.packages.native.iter().chain(&config.packages.aur) {
        if !seen.insert(name.as_str()) {
            warnings.push(ValidationWarning::new(
                "packages",
                name.as_str(),
                "listed more than once",
            ));
        }
    }
    if !config.packages.aur.is_empty() && config.packages.aur_helper.trim().is_empty() {
        warnings.push(ValidationWarning::new(
            "packages",
            "aur_helper",
            "AUR packages are listed but no helper is configured",
        ));
    }
}

fn check_dotfiles(config: &Config, root: &Path, warnings: &mut Vec<ValidationWarning>) {
    let source = root.join(&config.dotfiles.source);
    for package in &config.dotfiles.packages {
        if !source.join(package).is_dir() {
            warnings.push(ValidationWarning::new(
                "dotfiles",
                package.as_str(),
                format!("package directory not found under {}", source.display()),
            ));
        }
    }
}

fn check_editors(config: &Config, warnings: &mut Vec<ValidationWarning>) {
    for editor in &config.editors {
        if editor.command.is_empty() {
            warnings.push(ValidationWarning::new(
                "editors",
                editor.name.as_str(),
                "bootstrap command is empty",
            ));
        }
    }
}
