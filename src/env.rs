//! Environment constants and path utilities for sshbox.
//!
//! This module centralizes the hardcoded names, paths and built-in defaults
//! used throughout the application.

use std::path::{Path, PathBuf};

/// Application directory name (hidden directory like .git, .vscode)
pub const APP_DIR_NAME: &str = ".sshbox";

/// Configuration file name inside the application directory
pub const CONFIG_FILE_NAME: &str = "config.toml";

/// Configuration file name looked up directly in the current directory
pub const LOCAL_CONFIG_FILE_NAME: &str = "sshbox.toml";

/// System-wide configuration file (Unix-like systems)
#[cfg(unix)]
pub const SYSTEM_CONFIG_FILE: &str = "/etc/sshbox/config.toml";

/// Built-in configuration defaults.
pub mod defaults {
    /// Tag of the SSH daemon image built and run for every shell
    pub const IMAGE_TAG: &str = "sshbox-sshd:latest";

    /// Ownership label key attached to every shell container
    pub const LABEL_KEY: &str = "org.label-schema.url";

    /// Ownership label value attached to every shell container
    pub const LABEL_VALUE: &str = "https://github.com/sshbox/sshbox";

    /// Directory inside the container where the host volume is mounted
    pub const MOUNT_TARGET: &str = "/mnt";

    /// Port the SSH daemon listens on inside the container
    pub const SSH_PORT: u16 = 22;

    /// User printed in the SSH connect hint
    pub const SSH_USER: &str = "root";

    /// Host printed in the SSH connect hint
    pub const CONNECT_HOST: &str = "localhost";

    /// Host port suggested when creating a shell interactively
    pub const HOST_PORT: &str = "3000";
}

/// Build the application directory path from a root directory
pub fn app_dir_path(root: &Path) -> PathBuf {
    root.join(APP_DIR_NAME)
}

/// Build the project-local configuration file path (`<root>/.sshbox/config.toml`)
pub fn local_config_file_path(root: &Path) -> PathBuf {
    app_dir_path(root).join(CONFIG_FILE_NAME)
}

/// Build the user configuration file path (`~/.sshbox/config.toml`)
pub fn user_config_file_path(home: &Path) -> PathBuf {
    app_dir_path(home).join(CONFIG_FILE_NAME)
}
