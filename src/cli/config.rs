//! Configuration discovery and loading
//!
//! This module handles the configuration discovery hierarchy:
//! 1. Explicit `--config <FILE>`
//! 2. Current directory: ./sshbox.toml or ./.sshbox/config.toml
//! 3. User config: ~/.sshbox/config.toml
//! 4. System config: /etc/sshbox/config.toml
//! 5. Built-in defaults

use crate::{ConfigError, ShellConfig, env};
use std::env as std_env;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Configuration discovery system
pub struct ConfigDiscovery;

impl ConfigDiscovery {
    /// Load the explicit file if given, otherwise discover one.
    pub fn load(explicit: Option<&Path>) -> Result<ShellConfig, ConfigError> {
        if let Some(path) = explicit {
            info!("Loading configuration from: {:?}", path);
            return ShellConfig::from_toml_file(path);
        }
        Self::discover_config()
    }

    /// Discover and load configuration using the hierarchy
    pub fn discover_config() -> Result<ShellConfig, ConfigError> {
        if let Some(config_path) = Self::find_config_file() {
            info!("Loading configuration from: {:?}", config_path);
            return ShellConfig::from_toml_file(config_path);
        }

        debug!("No configuration file found, using defaults");
        Ok(ShellConfig::default())
    }

    /// Find configuration file using discovery hierarchy
    pub fn find_config_file() -> Option<PathBuf> {
        Self::first_existing(Self::get_config_candidates())
    }

    fn first_existing(candidates: Vec<PathBuf>) -> Option<PathBuf> {
        for candidate in candidates {
            debug!("Checking for config file: {:?}", candidate);
            if candidate.is_file() {
                debug!("Found config file: {:?}", candidate);
                return Some(candidate);
            }
        }

        debug!("No config file found in discovery hierarchy");
        None
    }

    /// Get list of configuration file candidates in priority order
    pub fn get_config_candidates() -> Vec<PathBuf> {
        let current_dir = std_env::current_dir().ok();
        let home_dir = Self::get_home_dir();
        Self::candidates_for(current_dir.as_deref(), home_dir.as_deref())
    }

    fn candidates_for(current_dir: Option<&Path>, home_dir: Option<&Path>) -> Vec<PathBuf> {
        let mut candidates = Vec::new();

        if let Some(current_dir) = current_dir {
            candidates.push(current_dir.join(env::LOCAL_CONFIG_FILE_NAME));
            candidates.push(env::local_config_file_path(current_dir));
        }

        if let Some(home_dir) = home_dir {
            candidates.push(env::user_config_file_path(home_dir));
        }

        #[cfg(unix)]
        candidates.push(PathBuf::from(env::SYSTEM_CONFIG_FILE));

        candidates
    }

    fn get_home_dir() -> Option<PathBuf> {
        std_env::var_os("HOME")
            .or_else(|| std_env::var_os("USERPROFILE"))
            .map(PathBuf::from)
    }

    /// Print the effective configuration and the discovery candidates
    pub fn show_discovery_info(explicit: Option<&Path>, config: &ShellConfig) {
        println!("Configuration discovery:");
        if let Some(path) = explicit {
            println!("  --config {}", path.display());
        }
        for candidate in Self::get_config_candidates() {
            let marker = if candidate.is_file() { "✔" } else { " " };
            println!("  {} {}", marker, candidate.display());
        }
        println!();

        match toml::to_string_pretty(config) {
            Ok(rendered) => println!("{}", rendered),
            Err(e) => println!("(failed to render configuration: {})", e),
        }
    }
}
