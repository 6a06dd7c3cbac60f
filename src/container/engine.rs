//! Engine capability set.
//!
//! The lifecycle components only ever talk to the container runtime through
//! [`Engine`]. [`DockerEngine`](super::DockerEngine) implements it over the
//! Docker API; tests substitute an in-memory engine.

use crate::container::{ContainerSpec, Result};
use async_trait::async_trait;
use std::collections::HashMap;
use std::io::Write;

/// Operations the shell lifecycle needs from a container engine.
#[async_trait]
pub trait Engine: Send + Sync {
    /// Check whether `tag` is present in the local image store.
    async fn image_exists(&self, tag: &str) -> Result<bool>;

    /// Build an image from a tar build context and tag it.
    ///
    /// Progress output is written to `progress`; the build output must be
    /// consumed to completion either way.
    async fn build_image(
        &self,
        context: Vec<u8>,
        tag: &str,
        progress: &mut (dyn Write + Send),
    ) -> Result<()>;

    /// Create a container and return its engine-assigned ID.
    async fn create_container(&self, spec: &ContainerSpec) -> Result<String>;

    /// Start a created container.
    async fn start_container(&self, id: &str) -> Result<()>;

    /// List containers, stopped ones included, matching `filter`.
    async fn list_containers(&self, filter: &ListFilter) -> Result<Vec<ContainerDescriptor>>;

    /// Remove a container by name or ID, killing it first if it is running.
    async fn remove_container(&self, name_or_id: &str) -> Result<()>;
}

/// Filter for [`Engine::list_containers`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListFilter {
    /// Required label key
    pub label_key: String,
    /// Required label value
    pub label_value: String,
    /// Optional container name
    pub name: Option<String>,
}

impl ListFilter {
    /// Match containers carrying `key=value`.
    pub fn label(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            label_key: key.into(),
            label_value: value.into(),
            name: None,
        }
    }

    /// Additionally restrict to one container name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }
}

/// A port mapping reported for a container.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PortMapping {
    /// Port inside the container
    pub private_port: u16,
    /// Host port, when published
    pub public_port: Option<u16>,
    /// Host interface
    pub ip: Option<String>,
}

/// A mount reported for a container.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MountPoint {
    /// Host source path
    pub source: Option<String>,
    /// Path inside the container
    pub destination: Option<String>,
}

/// Engine-native description of one container.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ContainerDescriptor {
    /// Container ID
    pub id: String,
    /// Engine names, without the leading `/`
    pub names: Vec<String>,
    /// Lifecycle state (running, exited, created, ...)
    pub state: String,
    /// Port mappings in engine order
    pub ports: Vec<PortMapping>,
    /// Mounts in engine order
    pub mounts: Vec<MountPoint>,
    /// Labels
    pub labels: HashMap<String, String>,
}

impl ContainerDescriptor {
    /// Primary name, falling back to the ID.
    pub fn name(&self) -> &str {
        self.names.first().map(String::as_str).unwrap_or(&self.id)
    }

    /// Whether any of the container's names is exactly `name`.
    pub fn has_name(&self, name: &str) -> bool {
        self.names.iter().any(|n| n == name)
    }

    /// First port mapping published on the host.
    pub fn first_published_port(&self) -> Option<u16> {
        self.ports.iter().find_map(|p| p.public_port)
    }

    /// Host source of the first mount.
    pub fn first_mount_source(&self) -> Option<&str> {
        self.mounts.first().and_then(|m| m.source.as_deref())
    }
}
