//! # sshbox
//!
//! Provisions, lists and destroys SSH-accessible sandbox containers ("shells")
//! on a local Docker or Podman engine.
//!
//! Each shell is a container running an SSH daemon, published on a host TCP
//! port, optionally with a host directory bind-mounted inside it. Shells are
//! discovered exclusively through an ownership label attached at creation
//! time; the engine's own state is the only source of truth.
//!
//! ## Architecture Overview
//!
//! - **[`container`]**: the lifecycle core (image builder, provisioner,
//!   label-scoped registry, destroyer) over an [`container::Engine`]
//! - **[`config`]**: process-wide [`ShellConfig`] loaded from TOML
//! - **[`cli`]**: argument parsing, validation, prompts and rendering
//! - **[`env`]**: built-in defaults and configuration paths
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use sshbox::ShellConfig;
//! use sshbox::container::{ShellManager, ShellRequest};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let manager = ShellManager::connect(ShellConfig::default()).await?;
//!     manager.create(&ShellRequest::new("alpha", "3000")).await?;
//!     println!("{:?}", manager.list().await?);
//!     Ok(())
//! }
//! ```

/// Shell container lifecycle.
///
/// Image building, provisioning, label-scoped discovery and batch removal
/// over a substitutable container engine.
pub mod container;

/// Shell configuration and TOML loading.
pub mod config;

/// Environment constants and path utilities.
pub mod env;

/// Command-line front end.
pub mod cli;

pub use config::{BuildPolicy, ConfigError, ShellConfig};
pub use container::{
    ContainerError, DestroyReport, ShellError, ShellManager, ShellRecord, ShellRequest,
};
