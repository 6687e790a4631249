// markclean/src/utils/settings_store.rs
//! File-backed settings storage for the `markclean` CLI tool.
//!
//! The profile blob lives in a single JSON file. Reads take a shared lock, writes
//! go to a sibling temp file under an exclusive lock and are renamed into place, so
//! a concurrent reader never sees a half-written file. A file that cannot be read
//! as settings is copied to `<name>.bak` before it is first overwritten.

use anyhow::{Context, Result, anyhow};
use log::{debug, warn};
use std::fs::{self, OpenOptions};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use markclean_core::{is_settings_blob, SettingsBackend};

const SETTINGS_DIR: &str = "markclean";
const SETTINGS_FILE: &str = "settings.json";
const SETTINGS_FILE_TMP_SUFFIX: &str = ".tmp";
const SETTINGS_FILE_BACKUP_SUFFIX: &str = ".bak";

/// `<config dir>/markclean/settings.json`.
pub fn default_settings_path() -> Result<PathBuf> {
    dirs::config_dir()
        .map(|dir| dir.join(SETTINGS_DIR).join(SETTINGS_FILE))
        .ok_or_else(|| anyhow!("Could not determine the configuration directory; pass --settings FILE"))
}

#[derive(Debug, Clone)]
pub struct JsonFileBackend {
    path: PathBuf,
}

impl JsonFileBackend {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Uses `explicit` when given, the default location otherwise.
    pub fn resolve(explicit: Option<&Path>) -> Result<Self> {
        let path = match explicit {
            Some(p) => p.to_path_buf(),
            None => default_settings_path()?,
        };
        debug!("Using settings file {}", path.display());
        Ok(Self::new(path))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn sibling_path(&self, suffix: &str) -> PathBuf {
        let mut name = self.path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
        name.push(suffix);
        self.path.with_file_name(name)
    }

    fn tmp_path(&self) -> PathBuf {
        self.sibling_path(SETTINGS_FILE_TMP_SUFFIX)
    }

    pub fn backup_path(&self) -> PathBuf {
        self.sibling_path(SETTINGS_FILE_BACKUP_SUFFIX)
    }

    /// Copies the settings file to [`Self::backup_path`] when its content is not
    /// readable settings. Returns the backup path when a copy was made.
    pub fn backup_if_unreadable(&self) -> Result<Option<PathBuf>> {
        let Some(raw) = self.load()? else {
            return Ok(None);
        };
        if is_settings_blob(&raw) {
            return Ok(None);
        }
        let backup = self.backup_path();
        fs::write(&backup, raw).with_context(|| format!("Failed to back up settings to {}", backup.display()))?;
        warn!("Settings file {} is unreadable; kept a copy at {}", self.path.display(), backup.display());
        Ok(Some(backup))
    }
}

impl SettingsBackend for JsonFileBackend {
    fn load(&self) -> Result<Option<String>> {
        if !self.path.exists() {
            return Ok(None);
        }
        let mut f = OpenOptions::new()
            .read(true)
            .open(&self.path)
            .with_context(|| format!("Failed to open settings file {}", self.path.display()))?;
        fs2::FileExt::lock_shared(&f)?;
        let mut raw = String::new();
        let read = f.read_to_string(&mut raw);
        fs2::FileExt::unlock(&f)?;
        read.with_context(|| format!("Failed to read settings file {}", self.path.display()))?;
        Ok(Some(raw))
    }

    fn save(&self, blob: &str) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create settings directory {}", parent.display()))?;
        }

        let tmp_path = self.tmp_path();
        {
            let mut tmp = OpenOptions::new().create(true).write(true).truncate(true).open(&tmp_path)?;
            fs2::FileExt::lock_exclusive(&tmp)?;
            tmp.write_all(blob.as_bytes())?;
            tmp.flush()?;
            fs2::FileExt::unlock(&tmp)?;
        }

        fs::rename(&tmp_path, &self.path)
            .with_context(|| format!("Failed to replace settings file {}", self.path.display()))?;
        debug!("Saved settings to {}", self.path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use markclean_core::{load_store, save_store, ProfileStore};
    use tempfile::tempdir;

    #[test]
    fn save_creates_parent_directories() -> Result<()> {
        let dir = tempdir()?;
        let backend = JsonFileBackend::new(dir.path().join("nested/deeper/settings.json"));
        assert_eq!(backend.load()?, None);
        save_store(&backend, &ProfileStore::with_default())?;
        assert!(backend.path().exists());
        assert!(!backend.tmp_path().exists());
        assert_eq!(load_store(&backend)?, ProfileStore::with_default());
        Ok(())
    }

    #[test]
    fn unreadable_settings_are_backed_up_once() -> Result<()> {
        let dir = tempdir()?;
        let backend = JsonFileBackend::new(dir.path().join("settings.json"));
        assert_eq!(backend.backup_if_unreadable()?, None);

        fs::write(backend.path(), "not json")?;
        assert_eq!(backend.backup_if_unreadable()?, Some(dir.path().join("settings.json.bak")));
        assert_eq!(fs::read_to_string(backend.backup_path())?, "not json");

        save_store(&backend, &ProfileStore::with_default())?;
        assert_eq!(backend.backup_if_unreadable()?, None);
        assert_eq!(fs::read_to_string(backend.backup_path())?, "not json");
        Ok(())
    }
}
