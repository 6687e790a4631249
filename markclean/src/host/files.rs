// markclean/src/host/files.rs
//! File sink that resolves logical export paths against a vault directory.

use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use log::debug;
use std::path::{Component, Path, PathBuf};

use markclean_core::{normalize_logical_path, FileSink};

#[derive(Debug, Clone)]
pub struct VaultFileSink {
    root: PathBuf,
}

impl VaultFileSink {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Maps a logical path onto the filesystem. Paths that would leave the vault
    /// are rejected.
    pub fn resolve(&self, logical: &str) -> Result<PathBuf> {
        let normalized = normalize_logical_path(logical);
        let relative = Path::new(&normalized);
        if normalized == "/" {
            bail!("Export path is empty");
        }
        if relative.components().any(|c| !matches!(c, Component::Normal(_) | Component::CurDir)) {
            bail!("Export path '{}' must stay inside the vault", logical);
        }
        Ok(self.root.join(relative))
    }
}

#[async_trait]
impl FileSink for VaultFileSink {
    async fn create_or_overwrite(&self, path: &str, content: &str) -> Result<()> {
        let target = self.resolve(path)?;
        if let Some(parent) = target.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .with_context(|| format!("Failed to create directory {}", parent.display()))?;
        }
        tokio::fs::write(&target, content)
            .await
            .with_context(|| format!("Failed to write {}", target.display()))?;
        debug!("Wrote {} byte(s) to {}", content.len(), target.display());
        Ok(())
    }
}
