//! TOML file loading with typed errors.
use std::path::Path;

use serde::de::DeserializeOwned;

use crate::error::ConfigError;

/// Read and deserialize a TOML file.
///
/// # Errors
///
/// Returns [`ConfigError::Missing`] if the file does not exist,
/// [`ConfigError::Io`] if it cannot be read, and [`ConfigError::Parse`] if it
/// is not valid TOML or does not match `T`.
pub fn load_toml<T: DeserializeOwned>(path: &Path) -> Result<T, ConfigError> {
    if !path.exists() {
        return Err(ConfigError::Missing(path.to_path_buf()));
    }
    let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse_toml(path, &content)
}

/// Deserialize TOML text; `path` is only used for error messages.
///
/// # Errors
///
/// Returns [`ConfigError::Parse`] on invalid input.
pub fn parse_toml<T: DeserializeOwned>(path: &Path, content: &str) -> Result<T, ConfigError> {
    toml::from_str(content).map_err(|e| ConfigError::Parse {
        path: path.to_path_buf(),
        message: e.message().to_string(),
    })
}
