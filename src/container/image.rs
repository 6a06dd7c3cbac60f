//! SSH daemon image building.
//!
//! The build definition is compiled into the binary and shipped to the
//! engine as a single-file tar build context.

use crate::container::{ContainerError, Engine, Result, ShellError};
use crate::{BuildPolicy, ShellConfig};
use std::io::{self, Write};
use std::sync::Arc;
use tracing::{debug, info};

/// Build definition of the SSH daemon image.
pub const SSHD_DOCKERFILE: &str = include_str!("sshd.Dockerfile");

/// Ensures the shell image exists in the engine's image store.
#[derive(Clone)]
pub struct ImageBuilder {
    engine: Arc<dyn Engine>,
    config: Arc<ShellConfig>,
}

impl ImageBuilder {
    /// Create a new image builder.
    pub fn new(engine: Arc<dyn Engine>, config: Arc<ShellConfig>) -> Self {
        Self { engine, config }
    }

    /// Build the shell image according to the configured [`BuildPolicy`].
    ///
    /// With `verbose`, build output goes to stdout; otherwise it is drained
    /// and discarded. Returns the image tag.
    ///
    /// # Errors
    ///
    /// Returns [`ShellError::Build`] if the engine rejects or fails the build.
    pub async fn ensure_image(&self, verbose: bool) -> std::result::Result<String, ShellError> {
        if verbose {
            let mut stdout = io::stdout();
            self.ensure_image_with(&mut stdout).await
        } else {
            let mut sink = io::sink();
            self.ensure_image_with(&mut sink).await
        }
    }

    /// Like [`ensure_image`](Self::ensure_image) with an explicit progress sink.
    pub async fn ensure_image_with(
        &self,
        progress: &mut (dyn Write + Send),
    ) -> std::result::Result<String, ShellError> {
        let tag = self.config.image_tag.as_str();

        if self.config.build_policy == BuildPolicy::IfMissing
            && self.engine.image_exists(tag).await.map_err(ShellError::Build)?
        {
            debug!("Image {} already exists locally", tag);
            return Ok(tag.to_string());
        }

        info!("Building image: {}", tag);
        let context = build_context(SSHD_DOCKERFILE).map_err(ShellError::Build)?;
        self.engine
            .build_image(context, tag, progress)
            .await
            .map_err(ShellError::Build)?;

        Ok(tag.to_string())
    }
}

/// Package a Dockerfile as the only entry of a tar build context.
pub fn build_context(dockerfile: &str) -> Result<Vec<u8>> {
    let data = dockerfile.as_bytes();

    let mut header = tar::Header::new_gnu();
    header.set_size(data.len() as u64);
    header.set_mode(0o644);

    let mut archive = tar::Builder::new(Vec::new());
    archive
        .append_data(&mut header, "Dockerfile", data)
        .map_err(ContainerError::IoError)?;
    archive.into_inner().map_err(ContainerError::IoError)
}
