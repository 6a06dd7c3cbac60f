//! Shell lifecycle orchestration.
//!
//! [`ShellManager`] owns the engine handle and hands it to the image builder,
//! provisioner, registry and destroyer. It is the only composition point;
//! nothing else holds engine state.

use crate::ShellConfig;
use crate::container::{
    DestroyReport, Destroyer, DockerEngine, Engine, ImageBuilder, Provisioner, Registry,
    ShellError, ShellRecord, ShellRequest,
};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

/// High-level shell manager.
pub struct ShellManager {
    images: ImageBuilder,
    provisioner: Provisioner,
    registry: Registry,
    destroyer: Destroyer,
}

impl ShellManager {
    /// Compose the lifecycle components over an engine.
    pub fn new(engine: Arc<dyn Engine>, config: ShellConfig) -> Self {
        let config = Arc::new(config);
        let registry = Registry::new(engine.clone(), config.clone());

        Self {
            images: ImageBuilder::new(engine.clone(), config.clone()),
            provisioner: Provisioner::new(engine.clone(), config),
            destroyer: Destroyer::new(engine, registry.clone()),
            registry,
        }
    }

    /// Connect to the local Docker/Podman engine.
    ///
    /// # Errors
    ///
    /// Returns [`ShellError::Connect`] if no engine is reachable.
    pub async fn connect(config: ShellConfig) -> Result<Self, ShellError> {
        let engine = DockerEngine::connect().await.map_err(ShellError::Connect)?;
        Ok(Self::new(Arc::new(engine), config))
    }

    /// Build the image (per build policy), then create and start the shell.
    ///
    /// Returns the container ID.
    pub async fn create(&self, request: &ShellRequest) -> Result<String, ShellError> {
        self.create_with_cancel(request, &CancellationToken::new())
            .await
    }

    /// Like [`create`](Self::create), checking `cancel` between engine calls.
    pub async fn create_with_cancel(
        &self,
        request: &ShellRequest,
        cancel: &CancellationToken,
    ) -> Result<String, ShellError> {
        if cancel.is_cancelled() {
            return Err(ShellError::Cancelled);
        }

        let tag = self.images.ensure_image(request.verbose).await?;
        debug!("Image {} ready", tag);

        if cancel.is_cancelled() {
            return Err(ShellError::Cancelled);
        }

        let id = self.provisioner.provision(request).await?;
        info!("Shell {} is up", request.name);
        Ok(id)
    }

    /// Build the shell image without creating a shell.
    pub async fn ensure_image(&self, verbose: bool) -> Result<String, ShellError> {
        self.images.ensure_image(verbose).await
    }

    /// All shells currently known to the engine.
    pub async fn list(&self) -> Result<Vec<ShellRecord>, ShellError> {
        self.registry.list_all().await
    }

    /// Destroy shells by name; see [`Destroyer::destroy_many`].
    pub async fn destroy(&self, reclaim_volume: bool, names: &[String]) -> DestroyReport {
        self.destroyer.destroy_many(reclaim_volume, names).await
    }

    /// Destroy shells by name, stopping between names once `cancel` fires.
    pub async fn destroy_with_cancel(
        &self,
        reclaim_volume: bool,
        names: &[String],
        cancel: &CancellationToken,
    ) -> DestroyReport {
        self.destroyer
            .destroy_many_with_cancel(reclaim_volume, names, cancel)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::container::fake::FakeEngine;

    fn manager(engine: &Arc<FakeEngine>) -> ShellManager {
        ShellManager::new(engine.clone(), ShellConfig::default())
    }

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[tokio::test]
    async fn test_list_after_create() {
        let engine = Arc::new(FakeEngine::new());
        let manager = manager(&engine);

        manager
            .create(&ShellRequest::new("alpha", "3000"))
            .await
            .unwrap();
        let records = manager.list().await.unwrap();

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].name, "alpha");
        assert!(records[0].connect_hint.contains("-p 3000"));
        assert_eq!(records[0].volume_description, "");
        assert!(records[0].is_running());
    }

    #[tokio::test]
    async fn test_volume_description_after_create() {
        let engine = Arc::new(FakeEngine::new());
        let manager = manager(&engine);

        manager
            .create(&ShellRequest::new("alpha", "3000").volume("/tmp/x"))
            .await
            .unwrap();
        let records = manager.list().await.unwrap();

        assert_eq!(records[0].volume_description, "/tmp/x -> /mnt");
    }

    #[tokio::test]
    async fn test_build_happens_before_create() {
        let engine = Arc::new(FakeEngine::new());
        engine.fail_builds("broken definition");
        let manager = manager(&engine);

        let err = manager
            .create(&ShellRequest::new("alpha", "3000"))
            .await
            .unwrap_err();

        assert!(matches!(err, ShellError::Build(_)));
        assert_eq!(engine.container_count(), 0);
    }

    #[tokio::test]
    async fn test_destroy_then_list() {
        let engine = Arc::new(FakeEngine::new());
        let manager = manager(&engine);

        manager
            .create(&ShellRequest::new("alpha", "3000"))
            .await
            .unwrap();
        let report = manager.destroy(false, &names(&["alpha", "ghost"])).await;

        assert_eq!(report.removed, names(&["alpha"]));
        assert_eq!(report.failures.len(), 1);
        assert!(manager.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_cancelled_create_does_nothing() {
        let engine = Arc::new(FakeEngine::new());
        let cancel = CancellationToken::new();
        cancel.cancel();

        let err = manager(&engine)
            .create_with_cancel(&ShellRequest::new("alpha", "3000"), &cancel)
            .await
            .unwrap_err();

        assert!(matches!(err, ShellError::Cancelled));
        assert_eq!(engine.build_count(), 0);
        assert_eq!(engine.container_count(), 0);
    }
}
