//! Docker/Podman engine adapter.
//!
//! Implements [`Engine`] over the bollard Docker API with connection
//! fallback to Podman sockets and a health check at startup.

use crate::container::{
    ContainerDescriptor, ContainerError, ContainerSpec, Engine, ListFilter, MountPoint,
    PortMapping, Result,
};
use async_trait::async_trait;
use bollard::Docker;
use bollard::errors::Error as BollardError;
use bollard::models::{
    BuildInfo, ContainerCreateBody, HostConfig, Mount, MountTypeEnum, PortBinding,
    RestartPolicy as BollardRestartPolicy, RestartPolicyNameEnum,
};
use bollard::query_parameters::{
    BuildImageOptionsBuilder, CreateContainerOptionsBuilder, ListContainersOptions,
    RemoveContainerOptionsBuilder, StartContainerOptions,
};
use futures::stream::{Stream, StreamExt};
use std::collections::HashMap;
use std::io::Write;
use std::sync::Arc;
use tracing::{debug, info};

/// Engine connection configuration.
#[derive(Debug, Clone)]
pub struct DockerEngineConfig {
    /// Request timeout in seconds for socket connections
    pub timeout: u64,
}

impl Default for DockerEngineConfig {
    fn default() -> Self {
        Self { timeout: 120 }
    }
}

/// Docker/Podman engine.
///
/// Cheap to clone; all clones share one connection.
#[derive(Clone)]
pub struct DockerEngine {
    docker: Arc<Docker>,
}

impl DockerEngine {
    /// Connect with default configuration and verify the engine answers.
    ///
    /// # Errors
    ///
    /// Returns error if neither Docker nor Podman are reachable.
    pub async fn connect() -> Result<Self> {
        Self::connect_with_config(DockerEngineConfig::default()).await
    }

    /// Connect with custom configuration.
    ///
    /// # Errors
    ///
    /// Returns error if connection to the engine fails.
    pub async fn connect_with_config(config: DockerEngineConfig) -> Result<Self> {
        let docker = Self::open(&config)?;
        let engine = Self {
            docker: Arc::new(docker),
        };

        engine.ping().await?;

        Ok(engine)
    }

    /// Open a client to Docker or Podman.
    ///
    /// Tries in order:
    /// 1. Local defaults (DOCKER_HOST, Unix socket or Windows named pipe)
    /// 2. Rootless Podman socket
    /// 3. System Podman socket
    fn open(config: &DockerEngineConfig) -> Result<Docker> {
        debug!("Attempting to connect to container engine...");

        match Docker::connect_with_local_defaults() {
            Ok(docker) => {
                debug!("Using container engine via local defaults");
                return Ok(docker);
            }
            Err(e) => {
                debug!("Local defaults failed: {}", e);
            }
        }

        #[cfg(unix)]
        {
            let mut sockets = Vec::new();
            if let Ok(runtime_dir) = std::env::var("XDG_RUNTIME_DIR") {
                sockets.push(format!("unix://{}/podman/podman.sock", runtime_dir));
            }
            sockets.push("unix:///run/podman/podman.sock".to_string());

            for socket in sockets {
                debug!("Trying Podman socket: {}", socket);
                match Docker::connect_with_socket(
                    &socket,
                    config.timeout,
                    bollard::API_DEFAULT_VERSION,
                ) {
                    Ok(docker) => {
                        debug!("Using Podman via {}", socket);
                        return Ok(docker);
                    }
                    Err(e) => {
                        debug!("Podman socket {} failed: {}", socket, e);
                    }
                }
            }
        }

        #[cfg(not(unix))]
        let _ = config;

        Err(ContainerError::ConnectionError(
            "Failed to connect to Docker or Podman. Please ensure Docker or Podman is installed and running.".to_string(),
        ))
    }

    /// Ping the engine to verify connectivity.
    ///
    /// # Errors
    ///
    /// Returns error if ping fails.
    pub async fn ping(&self) -> Result<()> {
        self.docker.ping().await.map_err(|e| {
            ContainerError::ConnectionError(format!("Failed to ping container engine: {}", e))
        })?;
        debug!("Container engine ping successful");
        Ok(())
    }

    /// Get the underlying Docker client.
    pub fn docker(&self) -> &Docker {
        &self.docker
    }
}

#[async_trait]
impl Engine for DockerEngine {
    async fn image_exists(&self, tag: &str) -> Result<bool> {
        match self.docker.inspect_image(tag).await {
            Ok(_) => Ok(true),
            Err(e) if is_status(&e, 404) => Ok(false),
            Err(e) => Err(ContainerError::ApiError(e)),
        }
    }

    async fn build_image(
        &self,
        context: Vec<u8>,
        tag: &str,
        progress: &mut (dyn Write + Send),
    ) -> Result<()> {
        debug!("Building image {} ({} byte context)", tag, context.len());

        let options = BuildImageOptionsBuilder::new()
            .dockerfile("Dockerfile")
            .t(tag)
            .rm(true)
            .build();

        let stream =
            self.docker
                .build_image(options, None, Some(bollard::body_full(context.into())));

        drain_build_output(stream, progress).await?;

        info!("Built image: {}", tag);
        Ok(())
    }

    async fn create_container(&self, spec: &ContainerSpec) -> Result<String> {
        debug!("Creating container: {}", spec.name);

        let options = CreateContainerOptionsBuilder::new().name(&spec.name).build();
        let body = to_create_body(spec);

        let response = self
            .docker
            .create_container(Some(options), body)
            .await
            .map_err(|e| {
                if is_status(&e, 409) {
                    ContainerError::Conflict(spec.name.clone())
                } else {
                    ContainerError::ApiError(e)
                }
            })?;

        info!("Created container: {} ({})", spec.name, response.id);
        Ok(response.id)
    }

    async fn start_container(&self, id: &str) -> Result<()> {
        debug!("Starting container: {}", id);

        self.docker
            .start_container(id, None::<StartContainerOptions>)
            .await?;

        info!("Started container: {}", id);
        Ok(())
    }

    async fn list_containers(&self, filter: &ListFilter) -> Result<Vec<ContainerDescriptor>> {
        let mut filters = HashMap::new();
        filters.insert(
            "label".to_string(),
            vec![format!("{}={}", filter.label_key, filter.label_value)],
        );
        if let Some(name) = &filter.name {
            // The engine matches names as regular expressions against "/name".
            filters.insert(
                "name".to_string(),
                vec![format!("^/{}$", regex::escape(name))],
            );
        }

        let containers = self
            .docker
            .list_containers(Some(ListContainersOptions {
                all: true,
                filters: Some(filters),
                ..Default::default()
            }))
            .await?;

        Ok(containers
            .into_iter()
            .map(|c| ContainerDescriptor {
                id: c.id.unwrap_or_default(),
                names: c
                    .names
                    .unwrap_or_default()
                    .into_iter()
                    .map(|n| n.trim_start_matches('/').to_string())
                    .collect(),
                state: c.state.map(|s| s.to_string()).unwrap_or_default(),
                ports: c
                    .ports
                    .unwrap_or_default()
                    .into_iter()
                    .map(|p| PortMapping {
                        private_port: p.private_port,
                        public_port: p.public_port,
                        ip: p.ip,
                    })
                    .collect(),
                mounts: c
                    .mounts
                    .unwrap_or_default()
                    .into_iter()
                    .map(|m| MountPoint {
                        source: m.source,
                        destination: m.destination,
                    })
                    .collect(),
                labels: c.labels.unwrap_or_default(),
            })
            .collect())
    }

    async fn remove_container(&self, name_or_id: &str) -> Result<()> {
        debug!("Removing container: {}", name_or_id);

        self.docker
            .remove_container(
                name_or_id,
                Some(
                    RemoveContainerOptionsBuilder::new()
                        .force(true)
                        .v(true)
                        .build(),
                ),
            )
            .await
            .map_err(|e| {
                if is_status(&e, 404) {
                    ContainerError::NotFound(name_or_id.to_string())
                } else {
                    ContainerError::ApiError(e)
                }
            })?;

        info!("Removed container: {}", name_or_id);
        Ok(())
    }
}

/// Consume build output to the end, copying log lines to `progress`.
///
/// The first reported error wins; output after it is drained but not copied.
async fn drain_build_output<S>(stream: S, progress: &mut (dyn Write + Send)) -> Result<()>
where
    S: Stream<Item = std::result::Result<BuildInfo, BollardError>>,
{
    let mut stream = std::pin::pin!(stream);
    let mut failure: Option<ContainerError> = None;

    while let Some(result) = stream.next().await {
        let info = match result {
            Ok(info) => info,
            Err(e) => {
                failure.get_or_insert(ContainerError::ApiError(e));
                continue;
            }
        };
        if let Some(detail) = info.error_detail {
            let message = detail
                .message
                .unwrap_or_else(|| "unknown build error".to_string());
            failure.get_or_insert(ContainerError::BuildError(message));
            continue;
        }
        if failure.is_some() {
            continue;
        }
        if let Some(line) = info.stream {
            progress.write_all(line.as_bytes())?;
        } else if let Some(status) = info.status {
            writeln!(progress, "{}", status)?;
        }
    }
    progress.flush()?;

    match failure {
        Some(error) => Err(error),
        None => Ok(()),
    }
}

/// Translate a [`ContainerSpec`] into the Docker create body.
fn to_create_body(spec: &ContainerSpec) -> ContainerCreateBody {
    let exposed_ports: HashMap<String, HashMap<(), ()>> = spec
        .ports
        .iter()
        .map(|p| (p.port_key(), HashMap::new()))
        .collect();

    let port_bindings: HashMap<String, Option<Vec<PortBinding>>> = spec
        .ports
        .iter()
        .map(|p| {
            (
                p.port_key(),
                Some(vec![PortBinding {
                    host_ip: Some(p.host_ip.clone()),
                    host_port: Some(p.host_port.clone()),
                }]),
            )
        })
        .collect();

    let mounts: Vec<Mount> = spec
        .mounts
        .iter()
        .map(|m| Mount {
            target: Some(m.target.clone()),
            source: Some(m.source.clone()),
            typ: Some(MountTypeEnum::BIND),
            read_only: Some(m.read_only),
            ..Default::default()
        })
        .collect();

    let restart_policy = match spec.restart_policy {
        crate::container::RestartPolicy::Always => RestartPolicyNameEnum::ALWAYS,
        crate::container::RestartPolicy::No => RestartPolicyNameEnum::NO,
    };

    ContainerCreateBody {
        image: Some(spec.image.clone()),
        hostname: Some(spec.hostname.clone()),
        labels: Some(spec.labels.clone()),
        exposed_ports: (!exposed_ports.is_empty()).then_some(exposed_ports),
        host_config: Some(HostConfig {
            port_bindings: (!port_bindings.is_empty()).then_some(port_bindings),
            mounts: (!mounts.is_empty()).then_some(mounts),
            restart_policy: Some(BollardRestartPolicy {
                name: Some(restart_policy),
                maximum_retry_count: None,
            }),
            ..Default::default()
        }),
        ..Default::default()
    }
}

fn is_status(error: &BollardError, status: u16) -> bool {
    matches!(
        error,
        BollardError::DockerResponseServerError { status_code, .. } if *status_code == status
    )
}
