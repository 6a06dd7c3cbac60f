//! Process-wide shell configuration.
//!
//! Holds the values that identify and shape every shell: the image tag, the
//! ownership label, the in-container mount target and SSH port, and how the
//! connect hint is rendered. Loaded once at startup and never mutated.

use crate::env::defaults;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// When the SSH daemon image is (re)built before provisioning.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BuildPolicy {
    /// Submit the build on every create; the engine's layer cache keeps it cheap
    #[default]
    Always,
    /// Only build when the tag is missing from the local image store
    IfMissing,
}

/// Shell configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShellConfig {
    /// Image built from the embedded definition and used for every shell
    pub image_tag: String,
    /// Ownership label key
    pub label_key: String,
    /// Ownership label value
    pub label_value: String,
    /// Where the host volume is mounted inside the container
    pub mount_target: String,
    /// SSH daemon port inside the container
    pub ssh_port: u16,
    /// User shown in the connect hint
    pub ssh_user: String,
    /// Host shown in the connect hint
    pub connect_host: String,
    /// Image build policy
    pub build_policy: BuildPolicy,
}

impl Default for ShellConfig {
    fn default() -> Self {
        Self {
            image_tag: defaults::IMAGE_TAG.to_string(),
            label_key: defaults::LABEL_KEY.to_string(),
            label_value: defaults::LABEL_VALUE.to_string(),
            mount_target: defaults::MOUNT_TARGET.to_string(),
            ssh_port: defaults::SSH_PORT,
            ssh_user: defaults::SSH_USER.to_string(),
            connect_host: defaults::CONNECT_HOST.to_string(),
            build_policy: BuildPolicy::default(),
        }
    }
}

/// Errors while loading or saving configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read configuration: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid configuration: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("failed to serialize configuration: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("invalid configuration: {0}")]
    Invalid(String),
}

impl ShellConfig {
    /// Load from TOML file
    pub fn from_toml_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Parse and validate a TOML document
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: ShellConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Save to TOML file
    pub fn to_toml_file<P: AsRef<Path>>(&self, path: P) -> Result<(), ConfigError> {
        let content = toml::to_string_pretty(self)?;
        fs::write(path, content)?;
        Ok(())
    }

    /// Reject values the engine would refuse later in a less readable way.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.image_tag.trim().is_empty() {
            return Err(ConfigError::Invalid("image_tag must not be empty".into()));
        }
        if self.label_key.trim().is_empty() {
            return Err(ConfigError::Invalid("label_key must not be empty".into()));
        }
        if !self.mount_target.starts_with('/') {
            return Err(ConfigError::Invalid(format!(
                "mount_target must be an absolute path, got '{}'",
                self.mount_target
            )));
        }
        if self.ssh_port == 0 {
            return Err(ConfigError::Invalid("ssh_port must be non-zero".into()));
        }
        Ok(())
    }
}
