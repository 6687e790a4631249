// markclean/src/commands/mod.rs
//! Subcommand implementations.
//!
//! Every command that edits profiles loads the store, applies one change and
//! saves it again before returning.

pub mod allow_list;
pub mod clean;
pub mod export;
pub mod profiles;
pub mod rules;

use anyhow::{Context, Result};
use std::fs;
use std::io::{self, Read};
use std::path::Path;

use markclean_core::{load_store, save_store, ProfileStore};

use crate::ui::output_format::{stderr_msg, MessageKind};
use crate::utils::settings_store::JsonFileBackend;

/// Reads `path`, or stdin when no path is given.
pub fn read_input(path: Option<&Path>) -> Result<String> {
    match path {
        Some(path) => fs::read_to_string(path).with_context(|| format!("Failed to read input file {}", path.display())),
        None => {
            let mut buffer = String::new();
            io::stdin().read_to_string(&mut buffer).context("Failed to read from stdin")?;
            Ok(buffer)
        }
    }
}

/// Settings access shared by the commands.
pub struct Session {
    backend: JsonFileBackend,
    pub quiet: bool,
}

impl Session {
    pub fn new(backend: JsonFileBackend, quiet: bool) -> Self {
        Self { backend, quiet }
    }

    pub fn load(&self) -> Result<ProfileStore> {
        load_store(&self.backend)
    }

    pub fn save(&self, store: &ProfileStore) -> Result<()> {
        if let Some(backup) = self.backend.backup_if_unreadable()? {
            self.warn(format!("Settings could not be read; the old file was saved as {}", backup.display()));
        }
        save_store(&self.backend, store)
    }

    /// Loads the store, hands it to `edit` and saves the result.
    pub fn edit<T>(&self, edit: impl FnOnce(&mut ProfileStore) -> Result<T>) -> Result<T> {
        let mut store = self.load()?;
        let value = edit(&mut store)?;
        self.save(&store)?;
        Ok(value)
    }

    pub fn success(&self, message: impl AsRef<str>) {
        if !self.quiet {
            stderr_msg(MessageKind::Success, message);
        }
    }

    pub fn warn(&self, message: impl AsRef<str>) {
        if !self.quiet {
            stderr_msg(MessageKind::Warn, message);
        }
    }
}

/// Name of the profile a command targets: `name` if given, the active one otherwise.
pub fn target_name(store: &mut ProfileStore, name: Option<&str>) -> Result<String> {
    Ok(store.resolve(name)?.0)
}
