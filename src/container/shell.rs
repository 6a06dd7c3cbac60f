//! Shell request and record types.

use crate::ShellConfig;
use crate::container::ContainerDescriptor;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// A request to provision one shell.
///
/// Built by the caller after validation: the name matches
/// `^[A-Za-z0-9][A-Za-z0-9_.-]+$`, the port is numeric and the volume path
/// is absolute and exists. The lifecycle does not re-validate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShellRequest {
    /// Shell name, also the container name and hostname
    pub name: String,
    /// Host TCP port bound to the in-container SSH port
    pub host_port: String,
    /// Host directory mounted read/write at the mount target
    pub host_volume_path: Option<PathBuf>,
    /// Stream image build output to stdout
    pub verbose: bool,
}

impl ShellRequest {
    pub fn new(name: impl Into<String>, host_port: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            host_port: host_port.into(),
            host_volume_path: None,
            verbose: false,
        }
    }

    /// Mount `path` into the shell.
    pub fn volume(mut self, path: impl Into<PathBuf>) -> Self {
        self.host_volume_path = Some(path.into());
        self
    }

    pub fn verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    /// Volume path, treating an empty path as no volume.
    pub fn volume_path(&self) -> Option<&Path> {
        self.host_volume_path
            .as_deref()
            .filter(|p| !p.as_os_str().is_empty())
    }
}

/// A shell as currently reported by the engine.
///
/// Rebuilt on every listing; never stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShellRecord {
    pub name: String,
    /// SSH command for the first published port, empty when none
    pub connect_hint: String,
    /// `"<host path> -> <mount target>"` for the first mount, empty when none
    pub volume_description: String,
    /// Engine state, verbatim
    pub state: String,
}

impl ShellRecord {
    /// Project an engine container into a record.
    ///
    /// The first published port and the first mount win when several exist.
    pub fn from_descriptor(container: &ContainerDescriptor, config: &ShellConfig) -> Self {
        let connect_hint = container
            .first_published_port()
            .map(|port| {
                format!(
                    "ssh -p {} {}@{}",
                    port, config.ssh_user, config.connect_host
                )
            })
            .unwrap_or_default();

        let volume_description = container
            .mounts
            .first()
            .map(|mount| {
                format!(
                    "{} -> {}",
                    mount.source.as_deref().unwrap_or_default(),
                    config.mount_target
                )
            })
            .unwrap_or_default();

        Self {
            name: container.name().to_string(),
            connect_hint,
            volume_description,
            state: container.state.clone(),
        }
    }

    pub fn is_running(&self) -> bool {
        self.state == "running"
    }
}
