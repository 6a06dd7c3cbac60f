use anyhow::{Context, Result};
use sshbox::cli::{
    Args, ConfigDiscovery, CreateConfig, DestroyConfig, ExecutionMode, ValidationError,
    VolumeChoice, prepare_volume, prompt::prompt_value, render, validate_port,
};
use sshbox::container::{ShellManager, ShellRequest};
use sshbox::env::defaults;
use sshbox::{ShellConfig, ShellError};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();

    let mode = match args.mode() {
        Ok(mode) => mode,
        Err(e) => {
            eprintln!("✗ {}", e);
            return ExitCode::FAILURE;
        }
    };

    init_logging(matches!(&mode, ExecutionMode::Create(c) if c.verbose));

    match run(args.config.as_deref(), mode).await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("✗ {:#}", e);
            ExitCode::FAILURE
        }
    }
}

fn init_logging(verbose: bool) {
    let default_filter = if verbose { "sshbox=info" } else { "sshbox=warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

async fn run(config_path: Option<&Path>, mode: ExecutionMode) -> Result<ExitCode> {
    let config = ConfigDiscovery::load(config_path).context("Failed to load configuration")?;
    debug!("Effective configuration: {:?}", config);

    match mode {
        ExecutionMode::ShowConfig => {
            ConfigDiscovery::show_discovery_info(config_path, &config);
            Ok(ExitCode::SUCCESS)
        }
        ExecutionMode::Create(create) => {
            let (manager, cancel) = connect(config).await?;
            run_create(&manager, create, &cancel).await
        }
        ExecutionMode::List { json } => {
            let (manager, _) = connect(config).await?;
            run_list(&manager, json).await
        }
        ExecutionMode::Destroy(destroy) => {
            let (manager, cancel) = connect(config).await?;
            run_destroy(&manager, destroy, &cancel).await
        }
    }
}

/// Connect to the engine and wire Ctrl-C to a cancellation token.
async fn connect(config: ShellConfig) -> Result<(ShellManager, CancellationToken)> {
    let manager = ShellManager::connect(config).await?;

    let cancel = CancellationToken::new();
    let on_interrupt = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("Interrupted, stopping after the current step");
            on_interrupt.cancel();
        }
    });

    Ok((manager, cancel))
}

async fn run_create(
    manager: &ShellManager,
    create: CreateConfig,
    cancel: &CancellationToken,
) -> Result<ExitCode> {
    println!("✔ Name: {}", create.name);

    let port = match create.port {
        Some(port) => port,
        None => {
            let answer = prompt_value("Port", defaults::HOST_PORT, |value| {
                validate_port(value).map(|_| ())
            })?;
            validate_port(&answer)?.to_string()
        }
    };

    let volume = match create.volume {
        VolumeChoice::Disabled => None,
        VolumeChoice::Path(path) => Some(prepare_volume(&path)?),
        VolumeChoice::Prompt => {
            let default = format!("./{}", create.name);
            let answer = prompt_value("Volume", &default, |_| Ok::<(), ValidationError>(()))?;
            Some(prepare_volume(&PathBuf::from(answer))?)
        }
    };

    let mut request = ShellRequest::new(&create.name, port).verbose(create.verbose);
    if let Some(path) = volume {
        request = request.volume(path);
    }

    match manager.create_with_cancel(&request, cancel).await {
        Ok(id) => {
            debug!("Shell {} running as {}", request.name, id);
            println!("✔ Success");
            let hint = manager.list().await.ok().and_then(|shells| {
                shells
                    .into_iter()
                    .find(|s| s.name == request.name)
                    .map(|s| s.connect_hint)
            });
            if let Some(hint) = hint.filter(|h| !h.is_empty()) {
                println!("  {}", hint);
            }
            Ok(ExitCode::SUCCESS)
        }
        Err(e @ ShellError::Start { .. }) => {
            eprintln!("✗ {}", e);
            eprintln!(
                "  the container was created but is stopped; remove it with: sshbox destroy {}",
                request.name
            );
            Ok(ExitCode::FAILURE)
        }
        Err(e) => {
            eprintln!("✗ {}", e);
            Ok(ExitCode::FAILURE)
        }
    }
}

async fn run_list(manager: &ShellManager, json: bool) -> Result<ExitCode> {
    let shells = manager.list().await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&shells)?);
    } else if shells.is_empty() {
        println!("No shells");
    } else {
        println!("{}", render::shells_table(&shells));
    }

    Ok(ExitCode::SUCCESS)
}

async fn run_destroy(
    manager: &ShellManager,
    destroy: DestroyConfig,
    cancel: &CancellationToken,
) -> Result<ExitCode> {
    let report = manager
        .destroy_with_cancel(destroy.reclaim_volume, &destroy.names, cancel)
        .await;

    for line in render::destroy_lines(&report) {
        println!("{}", line);
    }

    if report.failures.is_empty() {
        Ok(ExitCode::SUCCESS)
    } else {
        Ok(ExitCode::FAILURE)
    }
}
