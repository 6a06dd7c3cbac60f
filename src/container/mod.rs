//! Shell container lifecycle management.
//!
//! This module turns a validated [`ShellRequest`] into a running, labeled,
//! SSH-reachable container, and later discovers and removes those containers
//! by the ownership label attached at creation time.
//!
//! ## Architecture
//!
//! - [`engine`]: the [`Engine`] capability set every component talks through
//! - [`client`]: [`DockerEngine`], the Docker/Podman implementation via bollard
//! - [`image`]: [`ImageBuilder`], builds the embedded SSH daemon image
//! - [`config`]: [`ContainerSpec`] builder, engine-agnostic creation settings
//! - [`provisioner`]: [`Provisioner`], create + start for one shell
//! - [`registry`]: [`Registry`], label-scoped discovery and record projection
//! - [`destroyer`]: [`Destroyer`], batch removal with per-name bookkeeping
//! - [`manager`]: [`ShellManager`], composes the above over one engine handle
//!
//! ## Usage
//!
//! ```rust,no_run
//! use sshbox::ShellConfig;
//! use sshbox::container::{ShellManager, ShellRequest};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let manager = ShellManager::connect(ShellConfig::default()).await?;
//!
//!     let request = ShellRequest::new("alpha", "3000").volume("/tmp/alpha");
//!     manager.create(&request).await?;
//!
//!     for shell in manager.list().await? {
//!         println!("{} {} {}", shell.name, shell.state, shell.connect_hint);
//!     }
//!
//!     let report = manager.destroy(true, &["alpha".to_string()]).await;
//!     assert!(report.is_success());
//!     Ok(())
//! }
//! ```

pub mod client;
pub mod config;
pub mod destroyer;
pub mod engine;
pub mod image;
pub mod manager;
pub mod provisioner;
pub mod registry;
pub mod shell;

#[cfg(test)]
pub(crate) mod fake;

pub use client::{DockerEngine, DockerEngineConfig};
pub use config::{BindMount, ContainerSpec, ContainerSpecBuilder, PortPublish, RestartPolicy};
pub use destroyer::{DestroyFailure, DestroyReport, Destroyer, ReclaimFailure};
pub use engine::{ContainerDescriptor, Engine, ListFilter, MountPoint, PortMapping};
pub use image::{ImageBuilder, SSHD_DOCKERFILE};
pub use manager::ShellManager;
pub use provisioner::Provisioner;
pub use registry::Registry;
pub use shell::{ShellRecord, ShellRequest};

/// Container engine errors.
///
/// Raised by [`Engine`] implementations; the lifecycle components wrap them
/// in a [`ShellError`] naming the phase that failed.
#[derive(Debug, thiserror::Error)]
pub enum ContainerError {
    /// Docker/Podman API error
    #[error("Container API error: {0}")]
    ApiError(#[from] bollard::errors::Error),

    /// A container with this name already exists
    #[error("container already exists: {0}")]
    Conflict(String),

    /// Container or image not found
    #[error("not found: {0}")]
    NotFound(String),

    /// Error reported inside the image build output
    #[error("build error: {0}")]
    BuildError(String),

    /// Could not reach the engine
    #[error("connection error: {0}")]
    ConnectionError(String),

    /// IO error
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// General error
    #[error("{0}")]
    Other(String),
}

/// Result type for engine operations.
pub type Result<T> = std::result::Result<T, ContainerError>;

/// Errors surfaced by the shell lifecycle, prefixed by phase.
#[derive(Debug, thiserror::Error)]
pub enum ShellError {
    #[error("engine unavailable: {0}")]
    Connect(#[source] ContainerError),

    #[error("image build failed: {0}")]
    Build(#[source] ContainerError),

    #[error("container create failed: {0}")]
    Create(#[source] ContainerError),

    /// The container exists but is stopped; nothing removes it automatically.
    #[error("container start failed ({id}): {source}")]
    Start {
        id: String,
        #[source]
        source: ContainerError,
    },

    #[error("list services failed: {0}")]
    List(#[source] ContainerError),

    #[error("remove {name} failed: {source}")]
    Remove {
        name: String,
        #[source]
        source: ContainerError,
    },

    #[error("no shell named {0}")]
    NotFound(String),

    #[error("{count} containers match shell name {name}")]
    Ambiguous { name: String, count: usize },

    #[error("failed to reclaim volume {path}: {source}")]
    Reclaim {
        path: std::path::PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("operation cancelled")]
    Cancelled,
}

impl ShellError {
    /// Whether the failure was a name collision at create time.
    pub fn is_conflict(&self) -> bool {
        matches!(self, ShellError::Create(ContainerError::Conflict(_)))
    }
}
