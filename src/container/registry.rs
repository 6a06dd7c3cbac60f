//! Label-scoped shell discovery.
//!
//! The ownership label is the only source of truth: containers without it are
//! never listed or resolved, whatever their name or image.

use crate::ShellConfig;
use crate::container::{ContainerDescriptor, Engine, ListFilter, ShellError, ShellRecord};
use std::sync::Arc;
use tracing::debug;

/// Read path over the engine's labeled containers.
#[derive(Clone)]
pub struct Registry {
    engine: Arc<dyn Engine>,
    config: Arc<ShellConfig>,
}

impl Registry {
    pub fn new(engine: Arc<dyn Engine>, config: Arc<ShellConfig>) -> Self {
        Self { engine, config }
    }

    fn filter(&self) -> ListFilter {
        ListFilter::label(&self.config.label_key, &self.config.label_value)
    }

    /// All shells, stopped ones included, in engine order.
    ///
    /// # Errors
    ///
    /// Returns [`ShellError::List`] if the engine query fails; no partial list
    /// is returned.
    pub async fn list_all(&self) -> Result<Vec<ShellRecord>, ShellError> {
        let containers = self
            .engine
            .list_containers(&self.filter())
            .await
            .map_err(ShellError::List)?;

        debug!("Found {} labeled containers", containers.len());

        Ok(containers
            .iter()
            .map(|c| ShellRecord::from_descriptor(c, &self.config))
            .collect())
    }

    /// Labeled containers named exactly `name`.
    ///
    /// Engine name filters may match more loosely, so the result is narrowed
    /// to exact matches here.
    pub async fn resolve(&self, name: &str) -> Result<Vec<ContainerDescriptor>, ShellError> {
        let containers = self
            .engine
            .list_containers(&self.filter().with_name(name))
            .await
            .map_err(ShellError::List)?;

        Ok(containers.into_iter().filter(|c| c.has_name(name)).collect())
    }

    /// The single labeled container named `name`.
    ///
    /// # Errors
    ///
    /// [`ShellError::NotFound`] when nothing matches, [`ShellError::Ambiguous`]
    /// when the engine reports more than one.
    pub async fn resolve_one(&self, name: &str) -> Result<ContainerDescriptor, ShellError> {
        let mut matches = self.resolve(name).await?;
        match matches.len() {
            0 => Err(ShellError::NotFound(name.to_string())),
            1 => Ok(matches.remove(0)),
            count => Err(ShellError::Ambiguous {
                name: name.to_string(),
                count,
            }),
        }
    }
}
