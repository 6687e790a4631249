// File: markclean-core/src/profiles.rs

//! profiles.rs - Named cleanup profiles and the store that holds them.
//!
//! A profile bundles a [`CleanupConfig`] with the export destinations it routes to.
//! The [`ProfileStore`] keeps profiles keyed by name and guarantees that at most one
//! of them is active; [`ProfileStore::resolve_active`] turns "at most one" into
//! "exactly one" by falling back to the built-in `default` profile, recreating it
//! from its preset when it has gone missing.
//!
//! Single profiles can be exchanged as YAML files.
//!
//! license: MIT OR Apache-2.0

use anyhow::{Context, Result};
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use crate::config::{CleanupConfig, CleanupRule, RuleSet};
use crate::errors::MarkcleanError;

/// Name of the built-in profile.
pub const DEFAULT_PROFILE: &str = "default";

/// Attributes the built-in profile keeps.
pub const DEFAULT_ATTRIBUTES: [&str; 8] = ["id", "href", "src", "width", "height", "alt", "colspan", "rowspan"];

/// Where a profile's exports go and how they are produced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ExportTargets {
    pub clipboard: bool,
    pub file: bool,
    /// Export the rendered markup without cleanup.
    pub dirty: bool,
    /// Publishing to a remote service; carried for compatibility, never acted on.
    pub remote: bool,
    pub resolve_internal_links: bool,
    /// Logical path the file sink writes to. Empty means "next to the note".
    pub file_path: String,
}

impl Default for ExportTargets {
    fn default() -> Self {
        Self {
            clipboard: true,
            file: false,
            dirty: false,
            remote: false,
            resolve_internal_links: false,
            file_path: String::new(),
        }
    }
}

impl ExportTargets {
    pub fn any_sink(&self) -> bool {
        self.clipboard || self.file
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    #[serde(flatten)]
    pub cleanup: CleanupConfig,
    #[serde(default)]
    pub is_active: bool,
    #[serde(flatten)]
    pub targets: ExportTargets,
}

impl Profile {
    /// The built-in `default` profile.
    pub fn default_preset() -> Self {
        Self {
            cleanup: CleanupConfig {
                attribute_allow_list: DEFAULT_ATTRIBUTES.iter().map(|a| a.to_string()).collect(),
                class_allow_list: Default::default(),
                rules: RuleSet::from(vec![CleanupRule::new("div", "p")]),
            },
            is_active: true,
            targets: ExportTargets::default(),
        }
    }

    /// A freshly created user profile: inactive, empty allow-lists, one no-op rule.
    pub fn new_empty() -> Self {
        Self {
            cleanup: CleanupConfig {
                rules: RuleSet::from(vec![CleanupRule::empty()]),
                ..CleanupConfig::default()
            },
            is_active: false,
            targets: ExportTargets::default(),
        }
    }
}

impl Default for Profile {
    fn default() -> Self {
        Self::new_empty()
    }
}

/// The on-disk shape of a single exported profile.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct ProfileExchange {
    pub profile_name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub profile: Profile,
}

/// Reads a profile exchange file.
pub fn load_profile_file(path: &Path) -> Result<ProfileExchange> {
    debug!("Loading profile file: {}", path.display());
    let raw = fs::read_to_string(path).with_context(|| format!("reading profile file {}", path.display()))?;
    let exchange: ProfileExchange =
        serde_yml::from_str(&raw).with_context(|| format!("parsing profile YAML {}", path.display()))?;
    Ok(exchange)
}

/// Serializes a named profile to YAML. The active flag is never exported.
pub fn profile_to_yaml(name: &str, profile: &Profile) -> Result<String> {
    let mut profile = profile.clone();
    profile.is_active = false;
    let exchange = ProfileExchange { profile_name: name.to_string(), description: None, profile };
    serde_yml::to_string(&exchange).context("Failed to serialize profile to YAML.")
}

/// Name → profile mapping with at most one active profile.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProfileStore {
    profiles: BTreeMap<String, Profile>,
}

impl ProfileStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store holding only the built-in profile, active.
    pub fn with_default() -> Self {
        let mut store = Self::new();
        store.profiles.insert(DEFAULT_PROFILE.to_string(), Profile::default_preset());
        store
    }

    /// Builds a store from loaded records, repairing the active flags.
    pub fn from_profiles(profiles: BTreeMap<String, Profile>) -> Self {
        let mut store = Self { profiles };
        store.normalize_active();
        store
    }

    pub fn len(&self) -> usize {
        self.profiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.profiles.is_empty()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.profiles.contains_key(name)
    }

    /// Profile names, sorted.
    pub fn list(&self) -> Vec<&str> {
        self.profiles.keys().map(String::as_str).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Profile)> {
        self.profiles.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn get(&self, name: &str) -> Result<&Profile, MarkcleanError> {
        self.profiles.get(name).ok_or_else(|| MarkcleanError::ProfileNotFound(name.to_string()))
    }

    pub fn get_mut(&mut self, name: &str) -> Result<&mut Profile, MarkcleanError> {
        self.profiles.get_mut(name).ok_or_else(|| MarkcleanError::ProfileNotFound(name.to_string()))
    }

    /// Name of the active profile, if any.
    pub fn active_name(&self) -> Option<&str> {
        self.profiles.iter().find(|(_, p)| p.is_active).map(|(k, _)| k.as_str())
    }

    /// Makes `name` the only active profile.
    pub fn activate(&mut self, name: &str) -> Result<(), MarkcleanError> {
        if !self.profiles.contains_key(name) {
            return Err(MarkcleanError::ProfileNotFound(name.to_string()));
        }
        for (key, profile) in self.profiles.iter_mut() {
            profile.is_active = key == name;
        }
        info!("Profile '{}' is now active.", name);
        Ok(())
    }

    /// Adds a new inactive profile. Without `initial` it starts empty with one no-op rule.
    pub fn create(&mut self, name: &str, initial: Option<Profile>) -> Result<(), MarkcleanError> {
        let name = validate_name(name)?;
        if self.profiles.contains_key(name) {
            return Err(MarkcleanError::ProfileAlreadyExists(name.to_string()));
        }
        let mut profile = initial.unwrap_or_else(Profile::new_empty);
        profile.is_active = false;
        self.profiles.insert(name.to_string(), profile);
        debug!("Created profile '{}'.", name);
        Ok(())
    }

    /// Removes a profile. Deleting the active profile leaves none active.
    pub fn delete(&mut self, name: &str) -> Result<Profile, MarkcleanError> {
        let removed = self.profiles.remove(name).ok_or_else(|| MarkcleanError::ProfileNotFound(name.to_string()))?;
        debug!("Deleted profile '{}' (was active: {}).", name, removed.is_active);
        Ok(removed)
    }

    pub fn rename(&mut self, old: &str, new: &str) -> Result<(), MarkcleanError> {
        let new = validate_name(new)?;
        if old == new {
            return self.get(old).map(|_| ());
        }
        if self.profiles.contains_key(new) {
            return Err(MarkcleanError::ProfileAlreadyExists(new.to_string()));
        }
        let profile = self.profiles.remove(old).ok_or_else(|| MarkcleanError::ProfileNotFound(old.to_string()))?;
        self.profiles.insert(new.to_string(), profile);
        debug!("Renamed profile '{}' to '{}'.", old, new);
        Ok(())
    }

    /// Returns the active profile's name, activating `default` when nothing is active.
    pub fn resolve_active(&mut self) -> String {
        if let Some(name) = self.active_name() {
            return name.to_string();
        }
        if !self.profiles.contains_key(DEFAULT_PROFILE) {
            warn!("Profile '{}' is missing; recreating it from the built-in preset.", DEFAULT_PROFILE);
            self.profiles.insert(DEFAULT_PROFILE.to_string(), Profile::default_preset());
        } else {
            warn!("No active profile found; falling back to '{}'.", DEFAULT_PROFILE);
        }
        for (key, profile) in self.profiles.iter_mut() {
            profile.is_active = key == DEFAULT_PROFILE;
        }
        DEFAULT_PROFILE.to_string()
    }

    /// Resolves `name`, or the active profile when `None`.
    ///
    /// A named profile that does not exist is an error; only the implicit lookup
    /// falls back to `default`.
    pub fn resolve(&mut self, name: Option<&str>) -> Result<(String, &Profile), MarkcleanError> {
        let name = match name {
            Some(n) => n.to_string(),
            None => self.resolve_active(),
        };
        let profile = self.get(&name)?;
        Ok((name, profile))
    }

    /// Restores the built-in attribute allow-list on `name`.
    pub fn reset_attributes(&mut self, name: &str) -> Result<(), MarkcleanError> {
        let profile = self.get_mut(name)?;
        profile.cleanup.attribute_allow_list = DEFAULT_ATTRIBUTES.iter().map(|a| a.to_string()).collect();
        Ok(())
    }

    pub fn clear_classes(&mut self, name: &str) -> Result<(), MarkcleanError> {
        self.get_mut(name)?.cleanup.class_allow_list.clear();
        Ok(())
    }

    /// Leaves at most one profile active: the first by name wins. Returns whether
    /// anything changed.
    pub fn normalize_active(&mut self) -> bool {
        let active: Vec<String> =
            self.profiles.iter().filter(|(_, p)| p.is_active).map(|(k, _)| k.clone()).collect();
        if active.len() <= 1 {
            return false;
        }
        warn!("{} profiles are marked active ({}); keeping '{}'.", active.len(), active.join(", "), active[0]);
        for name in &active[1..] {
            if let Some(p) = self.profiles.get_mut(name) {
                p.is_active = false;
            }
        }
        true
    }

    pub fn into_inner(self) -> BTreeMap<String, Profile> {
        self.profiles
    }
}

fn validate_name(name: &str) -> Result<&str, MarkcleanError> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(MarkcleanError::InvalidProfileName(name.to_string()));
    }
    Ok(trimmed)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn active_count(store: &ProfileStore) -> usize {
        store.iter().filter(|(_, p)| p.is_active).count()
    }

    #[test]
    fn activate_keeps_exactly_one_active() {
        let mut store = ProfileStore::with_default();
        store.create("blog", None).unwrap();
        store.create("wiki", None).unwrap();
        for name in ["blog", "wiki", "default", "wiki", "wiki"] {
            store.activate(name).unwrap();
            assert_eq!(active_count(&store), 1);
            assert_eq!(store.active_name(), Some(name));
        }
        assert!(matches!(store.activate("nope"), Err(MarkcleanError::ProfileNotFound(_))));
        assert_eq!(store.active_name(), Some("wiki"));
    }

    #[test]
    fn create_rejects_duplicates_and_blank_names() {
        let mut store = ProfileStore::with_default();
        assert!(matches!(store.create("default", None), Err(MarkcleanError::ProfileAlreadyExists(_))));
        assert!(matches!(store.create("  ", None), Err(MarkcleanError::InvalidProfileName(_))));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn new_profile_starts_with_noop_rule() {
        let mut store = ProfileStore::with_default();
        store.create("blog", None).unwrap();
        let blog = store.get("blog").unwrap();
        assert!(!blog.is_active);
        assert!(blog.cleanup.attribute_allow_list.is_empty());
        assert_eq!(blog.cleanup.rules.len(), 1);
        assert!(blog.cleanup.rules.get(0).unwrap().is_noop());
    }

    #[test]
    fn deleting_active_profile_falls_back_to_recreated_default() {
        let mut store = ProfileStore::with_default();
        store.create("blog", None).unwrap();
        store.activate("blog").unwrap();
        store.delete("default").unwrap();
        store.delete("blog").unwrap();
        assert_eq!(store.active_name(), None);

        assert_eq!(store.resolve_active(), DEFAULT_PROFILE);
        assert_eq!(store.get(DEFAULT_PROFILE).unwrap(), &Profile::default_preset());
        assert_eq!(active_count(&store), 1);
    }

    #[test]
    fn rename_moves_profile_and_keeps_flags() {
        let mut store = ProfileStore::with_default();
        store.rename("default", "main").unwrap();
        assert_eq!(store.list(), vec!["main"]);
        assert_eq!(store.active_name(), Some("main"));
        store.create("x", None).unwrap();
        assert!(matches!(store.rename("x", "main"), Err(MarkcleanError::ProfileAlreadyExists(_))));
    }

    #[test]
    fn several_active_profiles_are_normalized() {
        let mut map = BTreeMap::new();
        let mut a = Profile::new_empty();
        a.is_active = true;
        map.insert("b".to_string(), a.clone());
        map.insert("a".to_string(), a);
        let store = ProfileStore::from_profiles(map);
        assert_eq!(store.active_name(), Some("a"));
        assert_eq!(active_count(&store), 1);
    }

    #[test]
    fn reset_and_clear() {
        let mut store = ProfileStore::with_default();
        {
            let p = store.get_mut("default").unwrap();
            p.cleanup.attribute_allow_list.clear();
            p.cleanup.class_allow_list.insert("x".to_string());
        }
        store.reset_attributes("default").unwrap();
        store.clear_classes("default").unwrap();
        assert_eq!(store.get("default").unwrap(), &Profile::default_preset());
    }

    #[test]
    fn yaml_exchange_round_trip_drops_active_flag() {
        let yaml = profile_to_yaml("default", &Profile::default_preset()).unwrap();
        let exchange: ProfileExchange = serde_yml::from_str(&yaml).unwrap();
        assert_eq!(exchange.profile_name, "default");
        assert!(!exchange.profile.is_active);
        assert_eq!(exchange.profile.cleanup, Profile::default_preset().cleanup);
    }
}
