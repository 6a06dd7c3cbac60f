//! Container configuration builders.
//!
//! Provides a fluent API for describing a container to create, independent
//! of any particular engine's wire types.

use crate::container::{ContainerError, Result};
use std::collections::HashMap;

/// Restart policy applied by the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RestartPolicy {
    /// Never restart
    #[default]
    No,
    /// Restart whenever the container stops, including after engine restarts
    Always,
}

/// A container port published on the host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PortPublish {
    /// Port inside the container
    pub container_port: u16,
    /// Host interface to bind
    pub host_ip: String,
    /// Host port, as given by the caller
    pub host_port: String,
}

impl PortPublish {
    /// Engine key for the exposed port (`22/tcp`).
    pub fn port_key(&self) -> String {
        format!("{}/tcp", self.container_port)
    }
}

/// A host directory bound into the container.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BindMount {
    /// Host path
    pub source: String,
    /// Path inside the container
    pub target: String,
    /// Mount read-only
    pub read_only: bool,
}

/// Container configuration builder.
///
/// Provides a fluent interface for constructing container specifications
/// with validation of the required fields.
#[derive(Debug, Default)]
pub struct ContainerSpecBuilder {
    name: Option<String>,
    image: Option<String>,
    hostname: Option<String>,
    labels: HashMap<String, String>,
    ports: Vec<PortPublish>,
    mounts: Vec<BindMount>,
    restart_policy: RestartPolicy,
}

impl ContainerSpecBuilder {
    /// Create a new container specification builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the engine-level container name.
    pub fn name<S: Into<String>>(mut self, name: S) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Set the container image.
    pub fn image<S: Into<String>>(mut self, image: S) -> Self {
        self.image = Some(image.into());
        self
    }

    /// Set the hostname seen inside the container.
    pub fn hostname<S: Into<String>>(mut self, hostname: S) -> Self {
        self.hostname = Some(hostname.into());
        self
    }

    /// Add a label to the container.
    pub fn label<K: Into<String>, V: Into<String>>(mut self, key: K, value: V) -> Self {
        self.labels.insert(key.into(), value.into());
        self
    }

    /// Publish a container TCP port on all host interfaces.
    pub fn publish<S: Into<String>>(mut self, container_port: u16, host_port: S) -> Self {
        self.ports.push(PortPublish {
            container_port,
            host_ip: "0.0.0.0".to_string(),
            host_port: host_port.into(),
        });
        self
    }

    /// Add a bind mount.
    pub fn bind_mount<S: Into<String>, T: Into<String>>(
        mut self,
        source: S,
        target: T,
        read_only: bool,
    ) -> Self {
        self.mounts.push(BindMount {
            source: source.into(),
            target: target.into(),
            read_only,
        });
        self
    }

    /// Set the restart policy.
    pub fn restart_policy(mut self, policy: RestartPolicy) -> Self {
        self.restart_policy = policy;
        self
    }

    /// Build the container specification.
    ///
    /// # Errors
    ///
    /// Returns error if the name or image is missing.
    pub fn build(self) -> Result<ContainerSpec> {
        let name = self
            .name
            .ok_or_else(|| ContainerError::Other("Container name is required".to_string()))?;
        let image = self
            .image
            .ok_or_else(|| ContainerError::Other("Image is required".to_string()))?;

        Ok(ContainerSpec {
            hostname: self.hostname.unwrap_or_else(|| name.clone()),
            name,
            image,
            labels: self.labels,
            ports: self.ports,
            mounts: self.mounts,
            restart_policy: self.restart_policy,
        })
    }
}

/// Engine-agnostic container specification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContainerSpec {
    /// Engine-level name, unique per engine
    pub name: String,
    /// Image tag
    pub image: String,
    /// Hostname inside the container
    pub hostname: String,
    /// Labels
    pub labels: HashMap<String, String>,
    /// Published ports
    pub ports: Vec<PortPublish>,
    /// Bind mounts
    pub mounts: Vec<BindMount>,
    /// Restart policy
    pub restart_policy: RestartPolicy,
}

impl ContainerSpec {
    /// Create a new specification builder.
    pub fn builder() -> ContainerSpecBuilder {
        ContainerSpecBuilder::new()
    }
}
