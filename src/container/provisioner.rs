//! Shell container provisioning.
//!
//! Turns a [`ShellRequest`] into a labeled container spec, then creates and
//! starts it.

use crate::ShellConfig;
use crate::container::{
    ContainerError, ContainerSpec, Engine, RestartPolicy, ShellError, ShellRequest,
};
use std::sync::Arc;
use tracing::{info, warn};

/// Creates and starts shell containers.
#[derive(Clone)]
pub struct Provisioner {
    engine: Arc<dyn Engine>,
    config: Arc<ShellConfig>,
}

impl Provisioner {
    pub fn new(engine: Arc<dyn Engine>, config: Arc<ShellConfig>) -> Self {
        Self { engine, config }
    }

    /// Container spec for a request.
    ///
    /// The shell name doubles as hostname and engine name, the SSH port is
    /// published on all host interfaces, the volume (if any) is bound
    /// read/write at the mount target, and the ownership label is attached.
    pub fn spec_for(&self, request: &ShellRequest) -> Result<ContainerSpec, ShellError> {
        let mut builder = ContainerSpec::builder()
            .name(&request.name)
            .hostname(&request.name)
            .image(&self.config.image_tag)
            .label(&self.config.label_key, &self.config.label_value)
            .publish(self.config.ssh_port, &request.host_port)
            .restart_policy(RestartPolicy::Always);

        if let Some(path) = request.volume_path() {
            let source = path.to_str().ok_or_else(|| {
                ShellError::Create(ContainerError::Other(format!(
                    "volume path is not valid UTF-8: {}",
                    path.display()
                )))
            })?;
            builder = builder.bind_mount(source, &self.config.mount_target, false);
        }

        builder.build().map_err(ShellError::Create)
    }

    /// Create and start the container for `request`; returns its ID.
    ///
    /// Start is only attempted once create succeeded. A failed start leaves
    /// the created container in place.
    ///
    /// # Errors
    ///
    /// [`ShellError::Create`] on name or port collision, [`ShellError::Start`]
    /// when the created container will not start.
    pub async fn provision(&self, request: &ShellRequest) -> Result<String, ShellError> {
        let spec = self.spec_for(request)?;

        let id = self
            .engine
            .create_container(&spec)
            .await
            .map_err(ShellError::Create)?;

        if let Err(source) = self.engine.start_container(&id).await {
            warn!("Shell {} created as {} but failed to start", request.name, id);
            return Err(ShellError::Start { id, source });
        }

        info!("Provisioned shell {} ({})", request.name, id);
        Ok(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::container::fake::FakeEngine;

    fn provisioner(engine: &Arc<FakeEngine>) -> Provisioner {
        Provisioner::new(engine.clone(), Arc::new(ShellConfig::default()))
    }

    #[test]
    fn test_spec_with_volume() {
        let engine = Arc::new(FakeEngine::new());
        let request = ShellRequest::new("alpha", "3000").volume("/tmp/x");

        let spec = provisioner(&engine).spec_for(&request).unwrap();

        assert_eq!(spec.name, "alpha");
        assert_eq!(spec.hostname, "alpha");
        assert_eq!(spec.image, "sshbox-sshd:latest");
        assert_eq!(spec.restart_policy, RestartPolicy::Always);
        assert_eq!(
            spec.labels.get("org.label-schema.url").map(String::as_str),
            Some("https://github.com/sshbox/sshbox")
        );
        assert_eq!(spec.ports.len(), 1);
        assert_eq!(spec.ports[0].container_port, 22);
        assert_eq!(spec.ports[0].host_port, "3000");
        assert_eq!(spec.mounts.len(), 1);
        assert_eq!(spec.mounts[0].source, "/tmp/x");
        assert_eq!(spec.mounts[0].target, "/mnt");
        assert!(!spec.mounts[0].read_only);
    }

    #[test]
    fn test_spec_without_volume() {
        let engine = Arc::new(FakeEngine::new());
        let spec = provisioner(&engine)
            .spec_for(&ShellRequest::new("alpha", "3000"))
            .unwrap();
        assert!(spec.mounts.is_empty());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_non_utf8_volume_is_rejected_before_create() {
        use std::ffi::OsStr;
        use std::os::unix::ffi::OsStrExt;

        let engine = Arc::new(FakeEngine::new());
        let request =
            ShellRequest::new("alpha", "3000").volume(OsStr::from_bytes(b"/tmp/vol\xff"));

        let err = provisioner(&engine).provision(&request).await.unwrap_err();

        assert!(matches!(err, ShellError::Create(ContainerError::Other(_))));
        assert_eq!(engine.container_count(), 0);
    }

    #[tokio::test]
    async fn test_provision_creates_and_starts() {
        let engine = Arc::new(FakeEngine::new());
        let id = provisioner(&engine)
            .provision(&ShellRequest::new("alpha", "3000"))
            .await
            .unwrap();

        assert_eq!(engine.state_of("alpha").as_deref(), Some("running"));
        assert_eq!(engine.id_of("alpha"), Some(id));
    }

    #[tokio::test]
    async fn test_duplicate_name_fails_without_touching_first() {
        let engine = Arc::new(FakeEngine::new());
        let provisioner = provisioner(&engine);

        provisioner
            .provision(&ShellRequest::new("alpha", "3000"))
            .await
            .unwrap();
        let err = provisioner
            .provision(&ShellRequest::new("alpha", "3001"))
            .await
            .unwrap_err();

        assert!(err.is_conflict());
        assert!(err.to_string().starts_with("container create failed"));
        assert_eq!(engine.container_count(), 1);
        assert_eq!(engine.state_of("alpha").as_deref(), Some("running"));
    }

    #[tokio::test]
    async fn test_port_collision_fails_at_start() {
        let engine = Arc::new(FakeEngine::new());
        let provisioner = provisioner(&engine);

        provisioner
            .provision(&ShellRequest::new("alpha", "3000"))
            .await
            .unwrap();
        let err = provisioner
            .provision(&ShellRequest::new("beta", "3000"))
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            ShellError::Start {
                source: ContainerError::Other(_),
                ..
            }
        ));
        assert_eq!(engine.state_of("alpha").as_deref(), Some("running"));
        assert_eq!(engine.state_of("beta").as_deref(), Some("created"));
    }

    #[tokio::test]
    async fn test_start_failure_leaves_created_container() {
        let engine = Arc::new(FakeEngine::new());
        engine.fail_starts();

        let err = provisioner(&engine)
            .provision(&ShellRequest::new("alpha", "3000"))
            .await
            .unwrap_err();

        match err {
            ShellError::Start { id, .. } => assert_eq!(engine.id_of("alpha"), Some(id)),
            other => panic!("Expected start error, got {other}"),
        }
        assert_eq!(engine.state_of("alpha").as_deref(), Some("created"));
    }
}
