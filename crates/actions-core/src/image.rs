//! Container image resolution for synthesized callback tasks.

use crate::error::{ActionsError, Result};
use crate::io::read_trimmed;
use crate::paths;
use std::path::PathBuf;

pub trait ImageResolver: Send + Sync {
    /// Turn a symbolic image name (e.g. `decision`) into a pullable reference.
    fn resolve(&self, name: &str) -> Result<String>;
}

impl<F> ImageResolver for F
where
    F: Fn(&str) -> Result<String> + Send + Sync,
{
    fn resolve(&self, name: &str) -> Result<String> {
        self(name)
    }
}

/// Resolves images from the in-tree docker definitions:
/// `taskcluster/docker/<name>/REGISTRY` (or the shared `taskcluster/docker/REGISTRY`)
/// and `taskcluster/docker/<name>/VERSION`.
#[derive(Debug, Clone)]
pub struct InTreeImages {
    root: PathBuf,
}

impl InTreeImages {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

impl ImageResolver for InTreeImages {
    fn resolve(&self, name: &str) -> Result<String> {
        let dir = paths::image_dir(&self.root, name);
        let registry = match read_trimmed(&dir.join(paths::REGISTRY_FILE))? {
            Some(r) => r,
            None => read_trimmed(&paths::docker_dir(&self.root).join(paths::REGISTRY_FILE))?
                .ok_or_else(|| ActionsError::Image {
                    name: name.to_string(),
                    reason: "no REGISTRY file".to_string(),
                })?,
        };
        let version =
            read_trimmed(&dir.join(paths::VERSION_FILE))?.ok_or_else(|| ActionsError::Image {
                name: name.to_string(),
                reason: format!("missing {}", dir.join(paths::VERSION_FILE).display()),
            })?;
        Ok(format!("{registry}/{name}:{version}"))
    }
}
