//! System-wide sections: `[preflight]`, `[login_manager]`, `[hardening]`.
use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;

use serde::Deserialize;

/// URL requested by the network check unless configured otherwise.
pub const DEFAULT_NETWORK_CHECK_URL: &str = "https://archlinux.org";

/// Drop-in written by the hardening task.
pub const DEFAULT_SYSCTL_FILE: &str = "/etc/sysctl.d/99-workstation-hardening.conf";

/// `[preflight]`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PreflightConfig {
    /// URL requested to check connectivity; empty disables the check.
    pub network_check_url: String,
    /// Seconds before the network check gives up.
    pub network_timeout_secs: u64,
    /// Files that must exist (relative to the root, or `~/`).
    pub required_files: Vec<PathBuf>,
}

impl Default for PreflightConfig {
    fn default() -> Self {
        Self {
            network_check_url: DEFAULT_NETWORK_CHECK_URL.to_string(),
            network_timeout_secs: 10,
            required_files: Vec::new(),
        }
    }
}

/// `[login_manager]`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LoginManagerConfig {
    /// Package providing the display manager.
    pub package: String,
    /// Systemd unit to enable.
    pub service: String,
}

/// `[hardening]`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct HardeningConfig {
    /// Install and enable ufw.
    pub firewall: bool,
    /// `ufw allow` rules (e.g. `ssh`, `22/tcp`).
    pub allow: Vec<String>,
    /// Kernel parameters written to the sysctl drop-in.
    pub sysctl: BTreeMap<String, SysctlValue>,
    /// Path of the sysctl drop-in.
    pub sysctl_file: PathBuf,
}

impl Default for HardeningConfig {
    fn default() -> Self {
        Self {
            firewall: false,
            allow: Vec::new(),
            sysctl: BTreeMap::new(),
            sysctl_file: PathBuf::from(DEFAULT_SYSCTL_FILE),
        }
    }
}

impl HardeningConfig {
    /// Whether there is anything to apply.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        !self.firewall && self.sysctl.is_empty()
    }

    /// Render the sysctl drop-in contents (sorted by key).
    #[must_use]
    pub fn sysctl_lines(&self) -> Vec<String> {
        self.sysctl
            .iter()
            .map(|(key, value)| format!("{key} = {value}"))
            .collect()
    }
}

/// A sysctl value; TOML integers and strings are both accepted.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum SysctlValue {
    /// Numeric value.
    Int(i64),
    /// Any other value, written verbatim.
    Text(String),
}

impl fmt::Display for SysctlValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(n) => write!(f, "{n}"),
            Self::Text(s) => write!(f, "{s}"),
        }
    }
}
