//! CLI-specific functionality for sshbox
//!
//! This module contains argument parsing, input validation, interactive
//! prompts, configuration discovery and console rendering. The lifecycle core
//! never prints; everything user-facing lives here.

pub mod args;
pub mod config;
pub mod prompt;
pub mod render;
pub mod validate;

pub use args::{Args, CreateConfig, DestroyConfig, ExecutionMode, VolumeChoice};
pub use config::ConfigDiscovery;
pub use validate::{ValidationError, prepare_volume, validate_name, validate_port};
