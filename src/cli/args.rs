//! Command line argument parsing
//!
//! This module handles CLI argument parsing with subcommands:
//! - `create` (`c`): Create a new shell
//! - `list` (`l`): List all shells
//! - `destroy` (`d`): Destroy one or more shells
//! - `config`: Show the effective configuration and where it came from

use super::validate::{ValidationError, validate_name, validate_port};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Debug)]
pub enum ExecutionMode {
    Create(CreateConfig),
    List { json: bool },
    Destroy(DestroyConfig),
    ShowConfig,
}

/// How the host volume for a new shell is chosen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VolumeChoice {
    /// Ask, defaulting to `./<name>`
    Prompt,
    /// Use this directory
    Path(PathBuf),
    /// No persistent mount
    Disabled,
}

#[derive(Debug)]
pub struct CreateConfig {
    pub name: String,
    /// Already validated; `None` means prompt
    pub port: Option<String>,
    pub volume: VolumeChoice,
    pub verbose: bool,
}

#[derive(Debug)]
pub struct DestroyConfig {
    pub names: Vec<String>,
    pub reclaim_volume: bool,
}

#[derive(Debug, Parser)]
#[command(name = "sshbox")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Create, list and destroy SSH-accessible sandbox containers")]
#[command(long_about = None)]
#[command(arg_required_else_help = true)]
pub struct Args {
    /// Configuration file path
    #[arg(short = 'c', long = "config", global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Create a new shell
    #[command(visible_alias = "c")]
    Create {
        /// Shell name ([A-Za-z0-9][A-Za-z0-9_.-]+)
        name: String,
        /// Host port for SSH (prompted when omitted)
        #[arg(short = 'p', long = "port")]
        port: Option<String>,
        /// Host directory mounted in the shell (prompted when omitted)
        #[arg(long = "volume", conflicts_with = "no_volume")]
        volume: Option<PathBuf>,
        /// Do not mount a host directory
        #[arg(long = "no-volume")]
        no_volume: bool,
        /// Show image build output
        #[arg(short = 'v', long = "verbose")]
        verbose: bool,
    },
    /// List all shells
    #[command(visible_alias = "l")]
    List {
        /// Print JSON instead of a table
        #[arg(long = "json")]
        json: bool,
    },
    /// Destroy one or more shells
    #[command(visible_alias = "d")]
    Destroy {
        /// Shell names
        #[arg(required = true)]
        names: Vec<String>,
        /// Also delete each shell's host directory
        #[arg(long = "volume")]
        reclaim_volume: bool,
    },
    /// Show configuration discovery information
    Config,
}

impl Args {
    pub fn parse() -> Self {
        Parser::parse()
    }

    pub fn mode(&self) -> Result<ExecutionMode, ValidationError> {
        match &self.command {
            Some(Commands::Create {
                name,
                port,
                volume,
                no_volume,
                verbose,
            }) => {
                validate_name(name)?;
                let port = port
                    .as_deref()
                    .map(|p| validate_port(p).map(|port| port.to_string()))
                    .transpose()?;

                let volume = match (volume, no_volume) {
                    (_, true) => VolumeChoice::Disabled,
                    (Some(path), false) => VolumeChoice::Path(path.clone()),
                    (None, false) => VolumeChoice::Prompt,
                };

                Ok(ExecutionMode::Create(CreateConfig {
                    name: name.clone(),
                    port,
                    volume,
                    verbose: *verbose,
                }))
            }
            Some(Commands::List { json }) => Ok(ExecutionMode::List { json: *json }),
            Some(Commands::Destroy {
                names,
                reclaim_volume,
            }) => {
                if names.is_empty() {
                    return Err(ValidationError::TooFewArguments);
                }
                Ok(ExecutionMode::Destroy(DestroyConfig {
                    names: names.clone(),
                    reclaim_volume: *reclaim_volume,
                }))
            }
            Some(Commands::Config) => Ok(ExecutionMode::ShowConfig),
            None => Err(ValidationError::NoCommand),
        }
    }
}
