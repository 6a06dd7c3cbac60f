//! In-memory engine for unit tests.
//!
//! Mirrors the engine behaviour the lifecycle relies on: unique names,
//! host port allocation at start, label filtering, loose name filtering.

use crate::ShellConfig;
use crate::container::{
    ContainerDescriptor, ContainerError, ContainerSpec, Engine, ListFilter, MountPoint,
    PortMapping, Result,
};
use async_trait::async_trait;
use std::collections::hash_map::DefaultHasher;
use std::collections::{HashMap, HashSet};
use std::hash::{Hash, Hasher};
use std::io::Write;
use std::sync::Mutex;

#[derive(Debug, Clone)]
struct FakeContainer {
    id: String,
    name: String,
    state: String,
    host_port: Option<u16>,
    mount_source: Option<String>,
    labels: HashMap<String, String>,
}

#[derive(Default)]
struct FakeState {
    images: HashMap<String, String>,
    containers: Vec<FakeContainer>,
    next_id: u64,
    builds: usize,
    build_error: Option<String>,
    fail_start: bool,
    fail_list: bool,
    fail_remove: HashSet<String>,
}

#[derive(Default)]
pub(crate) struct FakeEngine {
    state: Mutex<FakeState>,
}

impl FakeEngine {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, FakeState> {
        self.state.lock().unwrap()
    }

    fn insert(&self, name: &str, port: Option<u16>, mount: Option<&str>, state: &str, labeled: bool) {
        let config = ShellConfig::default();
        let mut inner = self.lock();
        inner.next_id += 1;
        let id = format!("{:012x}", inner.next_id);

        let mut labels = HashMap::new();
        if labeled {
            labels.insert(config.label_key, config.label_value);
        }

        inner.containers.push(FakeContainer {
            id,
            name: name.to_string(),
            state: state.to_string(),
            host_port: port,
            mount_source: mount.map(str::to_string),
            labels,
        });
    }

    /// Seed a container carrying the default ownership label.
    pub(crate) fn add_shell(&self, name: &str, port: Option<u16>, mount: Option<&str>, state: &str) {
        self.insert(name, port, mount, state, true);
    }

    /// Seed a container created by some other tool.
    pub(crate) fn add_foreign(&self, name: &str, port: Option<u16>, state: &str) {
        self.insert(name, port, None, state, false);
    }

    pub(crate) fn fail_builds(&self, message: &str) {
        self.lock().build_error = Some(message.to_string());
    }

    pub(crate) fn fail_starts(&self) {
        self.lock().fail_start = true;
    }

    pub(crate) fn fail_lists(&self) {
        self.lock().fail_list = true;
    }

    pub(crate) fn fail_removal_of(&self, name: &str) {
        self.lock().fail_remove.insert(name.to_string());
    }

    pub(crate) fn image_id(&self, tag: &str) -> Option<String> {
        self.lock().images.get(tag).cloned()
    }

    pub(crate) fn build_count(&self) -> usize {
        self.lock().builds
    }

    pub(crate) fn container_count(&self) -> usize {
        self.lock().containers.len()
    }

    pub(crate) fn state_of(&self, name: &str) -> Option<String> {
        self.lock()
            .containers
            .iter()
            .find(|c| c.name == name)
            .map(|c| c.state.clone())
    }

    pub(crate) fn id_of(&self, name: &str) -> Option<String> {
        self.lock()
            .containers
            .iter()
            .find(|c| c.name == name)
            .map(|c| c.id.clone())
    }
}

#[async_trait]
impl Engine for FakeEngine {
    async fn image_exists(&self, tag: &str) -> Result<bool> {
        Ok(self.lock().images.contains_key(tag))
    }

    async fn build_image(
        &self,
        context: Vec<u8>,
        tag: &str,
        progress: &mut (dyn Write + Send),
    ) -> Result<()> {
        let image_id = {
            let mut inner = self.lock();
            inner.builds += 1;
            if let Some(message) = &inner.build_error {
                return Err(ContainerError::BuildError(message.clone()));
            }

            let mut hasher = DefaultHasher::new();
            context.hash(&mut hasher);
            let image_id = format!("sha256:{:016x}", hasher.finish());
            inner.images.insert(tag.to_string(), image_id.clone());
            image_id
        };

        writeln!(progress, "Successfully built {}", image_id)?;
        writeln!(progress, "Successfully tagged {}", tag)?;
        Ok(())
    }

    async fn create_container(&self, spec: &ContainerSpec) -> Result<String> {
        let mut inner = self.lock();
        if inner.containers.iter().any(|c| c.name == spec.name) {
            return Err(ContainerError::Conflict(spec.name.clone()));
        }

        inner.next_id += 1;
        let id = format!("{:012x}", inner.next_id);
        inner.containers.push(FakeContainer {
            id: id.clone(),
            name: spec.name.clone(),
            state: "created".to_string(),
            host_port: spec
                .ports
                .first()
                .and_then(|p| p.host_port.parse().ok()),
            mount_source: spec.mounts.first().map(|m| m.source.clone()),
            labels: spec.labels.clone(),
        });
        Ok(id)
    }

    async fn start_container(&self, id: &str) -> Result<()> {
        let mut inner = self.lock();
        if inner.fail_start {
            return Err(ContainerError::Other("start refused".to_string()));
        }

        let port = inner
            .containers
            .iter()
            .find(|c| c.id == id)
            .ok_or_else(|| ContainerError::NotFound(id.to_string()))?
            .host_port;

        let port_taken = inner
            .containers
            .iter()
            .any(|c| c.id != id && c.state == "running" && port.is_some() && c.host_port == port);
        if port_taken {
            return Err(ContainerError::Other("port is already allocated".to_string()));
        }

        if let Some(container) = inner.containers.iter_mut().find(|c| c.id == id) {
            container.state = "running".to_string();
        }
        Ok(())
    }

    async fn list_containers(&self, filter: &ListFilter) -> Result<Vec<ContainerDescriptor>> {
        let inner = self.lock();
        if inner.fail_list {
            return Err(ContainerError::Other("engine unavailable".to_string()));
        }

        Ok(inner
            .containers
            .iter()
            .filter(|c| c.labels.get(&filter.label_key) == Some(&filter.label_value))
            // Substring match, like the engine's unanchored name filter.
            .filter(|c| filter.name.as_ref().is_none_or(|n| c.name.contains(n.as_str())))
            .map(|c| ContainerDescriptor {
                id: c.id.clone(),
                names: vec![c.name.clone()],
                state: c.state.clone(),
                ports: c
                    .host_port
                    .map(|port| PortMapping {
                        private_port: 22,
                        public_port: Some(port),
                        ip: Some("0.0.0.0".to_string()),
                    })
                    .into_iter()
                    .collect(),
                mounts: c
                    .mount_source
                    .clone()
                    .map(|source| MountPoint {
                        source: Some(source),
                        destination: Some("/mnt".to_string()),
                    })
                    .into_iter()
                    .collect(),
                labels: c.labels.clone(),
            })
            .collect())
    }

    async fn remove_container(&self, name_or_id: &str) -> Result<()> {
        let mut inner = self.lock();
        let index = inner
            .containers
            .iter()
            .position(|c| c.id == name_or_id || c.name == name_or_id)
            .ok_or_else(|| ContainerError::NotFound(name_or_id.to_string()))?;

        if inner.fail_remove.contains(&inner.containers[index].name) {
            return Err(ContainerError::Other("removal refused".to_string()));
        }

        inner.containers.remove(index);
        Ok(())
    }
}
