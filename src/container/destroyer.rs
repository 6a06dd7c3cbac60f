//! Batch shell removal.
//!
//! Every requested name is handled on its own: a failure is recorded and the
//! batch moves on. Names are processed sequentially, in input order.

use crate::container::{Engine, Registry, ShellError};
use std::path::PathBuf;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// A name that could not be destroyed.
#[derive(Debug)]
pub struct DestroyFailure {
    pub name: String,
    pub error: ShellError,
}

/// A removed shell whose host directory could not be deleted.
///
/// The container removal still counts; the name stays in
/// [`DestroyReport::removed`].
#[derive(Debug)]
pub struct ReclaimFailure {
    pub name: String,
    pub error: ShellError,
}

/// Outcome of a batch destroy.
#[derive(Debug, Default)]
pub struct DestroyReport {
    /// Removed shells, in input order
    pub removed: Vec<String>,
    /// Per-name failures; these shells were not removed
    pub failures: Vec<DestroyFailure>,
    /// Removed shells whose volume survived
    pub reclaim_failures: Vec<ReclaimFailure>,
}

impl DestroyReport {
    /// No name failed, volume reclamation included.
    pub fn is_success(&self) -> bool {
        self.failures.is_empty() && self.reclaim_failures.is_empty()
    }

    fn fail(&mut self, name: &str, error: ShellError) {
        warn!("Failed to destroy shell {}: {}", name, error);
        self.failures.push(DestroyFailure {
            name: name.to_string(),
            error,
        });
    }
}

/// Removes shells resolved through the [`Registry`].
#[derive(Clone)]
pub struct Destroyer {
    engine: Arc<dyn Engine>,
    registry: Registry,
}

impl Destroyer {
    pub fn new(engine: Arc<dyn Engine>, registry: Registry) -> Self {
        Self { engine, registry }
    }

    /// Destroy every shell in `names`.
    ///
    /// With `reclaim_volume`, the host directory bound into a removed shell is
    /// deleted recursively.
    pub async fn destroy_many(&self, reclaim_volume: bool, names: &[String]) -> DestroyReport {
        self.destroy_many_with_cancel(reclaim_volume, names, &CancellationToken::new())
            .await
    }

    /// Like [`destroy_many`](Self::destroy_many), stopping between names once
    /// `cancel` fires. Names not reached are reported as cancelled.
    pub async fn destroy_many_with_cancel(
        &self,
        reclaim_volume: bool,
        names: &[String],
        cancel: &CancellationToken,
    ) -> DestroyReport {
        let mut report = DestroyReport::default();

        for name in names {
            if cancel.is_cancelled() {
                report.fail(name, ShellError::Cancelled);
                continue;
            }

            let container = match self.registry.resolve_one(name).await {
                Ok(container) => container,
                Err(e) => {
                    report.fail(name, e);
                    continue;
                }
            };

            // Captured before removal: the mount list disappears with the container.
            let volume = container.first_mount_source().map(PathBuf::from);

            if let Err(source) = self.engine.remove_container(&container.id).await {
                report.fail(
                    name,
                    ShellError::Remove {
                        name: name.clone(),
                        source,
                    },
                );
                continue;
            }

            info!("Destroyed shell {}", name);
            report.removed.push(name.clone());

            if let (true, Some(path)) = (reclaim_volume, volume) {
                debug!("Reclaiming volume {}", path.display());
                if let Err(source) = tokio::fs::remove_dir_all(&path).await {
                    warn!("Failed to reclaim volume {}: {}", path.display(), source);
                    report.reclaim_failures.push(ReclaimFailure {
                        name: name.clone(),
                        error: ShellError::Reclaim { path, source },
                    });
                }
            }
        }

        report
    }
}
