//! Input validation for shell requests.
//!
//! Everything here runs before the lifecycle is touched.

use regex::Regex;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

static NAME_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z0-9][A-Za-z0-9_.-]+$").expect("shell name pattern is valid")
});

#[derive(Debug, thiserror::Error)]
pub enum ValidationError {
    #[error("Invalid name '{0}', only [a-zA-Z0-9][a-zA-Z0-9_.-] are allowed")]
    InvalidName(String),

    #[error("Invalid local port '{0}'")]
    InvalidPort(String),

    #[error("Too few arguments")]
    TooFewArguments,

    #[error("No command specified. Use 'sshbox --help' to see available commands.")]
    NoCommand,

    #[error("Invalid volume path {path}: {source}")]
    InvalidVolume {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Check a shell name against `^[A-Za-z0-9][A-Za-z0-9_.-]+$`.
pub fn validate_name(name: &str) -> Result<(), ValidationError> {
    if NAME_PATTERN.is_match(name) {
        Ok(())
    } else {
        Err(ValidationError::InvalidName(name.to_string()))
    }
}

/// Check that a host port is a TCP port number.
pub fn validate_port(port: &str) -> Result<u16, ValidationError> {
    port.trim()
        .parse::<u16>()
        .map_err(|_| ValidationError::InvalidPort(port.to_string()))
}

/// Make `path` absolute and create the directory if missing.
pub fn prepare_volume(path: &Path) -> Result<PathBuf, ValidationError> {
    let absolute = std::path::absolute(path).map_err(|source| ValidationError::InvalidVolume {
        path: path.to_path_buf(),
        source,
    })?;

    std::fs::create_dir_all(&absolute).map_err(|source| ValidationError::InvalidVolume {
        path: absolute.clone(),
        source,
    })?;

    Ok(absolute)
}
