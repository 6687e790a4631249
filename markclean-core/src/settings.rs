//! Persisted settings: the versioned profile blob and its debounced writer.
//!
//! The blob is a JSON object mapping profile name to profile record. Every record
//! written by this crate carries `schemaVersion`; records without one come from
//! older releases and are upgraded field by field. A field that cannot be read is
//! replaced by its default and logged, so a damaged settings file never prevents
//! startup.
//!
//! License: MIT OR APACHE 2.0

use anyhow::{Context, Result};
use log::{debug, error, warn};
use serde_json::{Map, Value};
use std::collections::{BTreeMap, BTreeSet};
use tokio::time::{Duration, Instant};

use crate::config::{CleanupRule, RuleSet};
use crate::errors::MarkcleanError;
use crate::export::debounce::Debouncer;
use crate::profiles::{ExportTargets, Profile, ProfileStore};

/// Version stamped on every record this crate writes.
pub const SETTINGS_SCHEMA_VERSION: u64 = 2;

/// Quiet period before pending settings changes are written.
pub const SETTINGS_WRITE_DELAY: Duration = Duration::from_millis(250);

const SCHEMA_KEY: &str = "schemaVersion";

/// Storage for the serialized settings blob.
pub trait SettingsBackend: Send + Sync {
    /// Returns the stored blob, or `None` when nothing has been saved yet.
    fn load(&self) -> Result<Option<String>>;
    fn save(&self, blob: &str) -> Result<()>;
}

/// Whether `blob` is a settings object [`load_store_from_json`] can read. A blob
/// that is not falls back to the default store, and saving over it loses it.
pub fn is_settings_blob(blob: &str) -> bool {
    blob.trim().is_empty() || matches!(serde_json::from_str::<Value>(blob), Ok(Value::Object(_)))
}

/// Parses a settings blob. Never fails: unreadable input yields the default store.
pub fn load_store_from_json(blob: &str) -> ProfileStore {
    let value: Value = match serde_json::from_str(blob) {
        Ok(v) => v,
        Err(e) => {
            error!("Settings are not valid JSON ({}); starting from the default profile.", e);
            return ProfileStore::with_default();
        }
    };
    let Value::Object(records) = value else {
        error!("Settings root is not an object; starting from the default profile.");
        return ProfileStore::with_default();
    };

    let profiles: BTreeMap<String, Profile> =
        records.iter().map(|(name, record)| (name.clone(), migrate_record(name, record))).collect();
    if profiles.is_empty() {
        return ProfileStore::with_default();
    }
    ProfileStore::from_profiles(profiles)
}

/// Serializes the store, stamping the current schema version on each record.
pub fn store_to_json(store: &ProfileStore) -> Result<String, MarkcleanError> {
    let mut root = Map::new();
    for (name, profile) in store.iter() {
        let mut record = serde_json::to_value(profile).map_err(|e| MarkcleanError::SerializationError(e.to_string()))?;
        if let Value::Object(fields) = &mut record {
            fields.insert(SCHEMA_KEY.to_string(), Value::from(SETTINGS_SCHEMA_VERSION));
        }
        root.insert(name.to_string(), record);
    }
    serde_json::to_string_pretty(&Value::Object(root)).map_err(|e| MarkcleanError::SerializationError(e.to_string()))
}

/// Loads the store through `backend`, falling back to defaults when nothing is stored.
pub fn load_store(backend: &dyn SettingsBackend) -> Result<ProfileStore> {
    let blob = backend.load().context("Failed to read settings")?;
    Ok(match blob {
        Some(blob) if !blob.trim().is_empty() => load_store_from_json(&blob),
        _ => {
            debug!("No stored settings; using the default profile.");
            ProfileStore::with_default()
        }
    })
}

pub fn save_store(backend: &dyn SettingsBackend, store: &ProfileStore) -> Result<()> {
    let blob = store_to_json(store)?;
    backend.save(&blob).context("Failed to write settings")
}

/// Upgrades one stored record to the current [`Profile`] shape.
pub fn migrate_record(name: &str, record: &Value) -> Profile {
    let Some(fields) = record.as_object() else {
        warn!("Settings record '{}' is not an object; using an empty profile.", name);
        return Profile::new_empty();
    };

    let version = fields.get(SCHEMA_KEY).and_then(Value::as_u64).unwrap_or(1);
    if version > SETTINGS_SCHEMA_VERSION {
        warn!("Settings record '{}' has schema version {}; unknown fields are ignored.", name, version);
    } else if version < SETTINGS_SCHEMA_VERSION {
        debug!("Upgrading settings record '{}' from schema version {}.", name, version);
    }

    let reader = FieldReader { name, fields };
    let defaults = ExportTargets::default();

    let file_path = reader.string(&["filePath", "htmlExportFilePath"]).unwrap_or_default();
    let dirty = match reader.bool(&["dirty", "exportDirty"]) {
        Some(d) => d,
        None => reader.bool(&["exportCleaned"]).map(|cleaned| !cleaned).unwrap_or(defaults.dirty),
    };

    let mut profile = Profile::new_empty();
    profile.cleanup.attribute_allow_list = reader.string_set(&["attributeAllowList", "attributeList"]);
    profile.cleanup.class_allow_list = reader.string_set(&["classAllowList", "classList"]);
    profile.cleanup.rules = reader.rules();
    profile.is_active = reader.bool(&["isActive", "isActiveProfile"]).unwrap_or(false);
    profile.targets = ExportTargets {
        clipboard: reader.bool(&["clipboard", "exportClipboard"]).unwrap_or(defaults.clipboard),
        // older releases exported to a file whenever a path was set
        file: reader.bool(&["file"]).unwrap_or(!file_path.is_empty()),
        dirty,
        remote: reader.bool(&["remote", "exportRemote"]).unwrap_or(defaults.remote),
        resolve_internal_links: reader
            .bool(&["resolveInternalLinks"])
            .unwrap_or(defaults.resolve_internal_links),
        file_path,
    };
    profile
}

struct FieldReader<'a> {
    name: &'a str,
    fields: &'a Map<String, Value>,
}

impl<'a> FieldReader<'a> {
    fn find<'k>(&self, keys: &[&'k str]) -> Option<(&'k str, &'a Value)> {
        keys.iter().find_map(|k| self.fields.get(*k).map(|v| (*k, v)))
    }

    fn bool(&self, keys: &[&str]) -> Option<bool> {
        let (key, value) = self.find(keys)?;
        match value {
            Value::Bool(b) => Some(*b),
            Value::Null => None,
            other => {
                warn!("Settings record '{}': field '{}' is not a boolean ({}); using default.", self.name, key, other);
                None
            }
        }
    }

    fn string(&self, keys: &[&str]) -> Option<String> {
        let (key, value) = self.find(keys)?;
        match value {
            Value::String(s) => Some(s.clone()),
            Value::Null => None,
            other => {
                warn!("Settings record '{}': field '{}' is not a string ({}); using default.", self.name, key, other);
                None
            }
        }
    }

    fn string_set(&self, keys: &[&str]) -> BTreeSet<String> {
        let Some((key, value)) = self.find(keys) else {
            return BTreeSet::new();
        };
        match value {
            Value::Array(items) => items
                .iter()
                .filter_map(|item| match item {
                    Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
                    Value::String(_) => None,
                    other => {
                        warn!("Settings record '{}': dropping non-string entry {} in '{}'.", self.name, other, key);
                        None
                    }
                })
                .collect(),
            Value::Null => BTreeSet::new(),
            other => {
                warn!("Settings record '{}': field '{}' is not a list ({}); using default.", self.name, key, other);
                BTreeSet::new()
            }
        }
    }

    /// Reads `rules` (current) or `rulesMap` (legacy). The legacy field was written
    /// either as an object or as an array of `[match, replace]` pairs.
    fn rules(&self) -> RuleSet {
        let Some((key, value)) = self.find(&["rules", "rulesMap"]) else {
            return RuleSet::new();
        };
        let parsed: Option<Vec<CleanupRule>> = match value {
            Value::Array(items) => items.iter().map(rule_from_value).collect(),
            Value::Object(map) => Some(
                map.iter()
                    .map(|(m, r)| CleanupRule::new(m.clone(), r.as_str().unwrap_or_default()))
                    .collect(),
            ),
            Value::Null => Some(Vec::new()),
            _ => None,
        };
        match parsed {
            Some(rules) => RuleSet::from(rules),
            None => {
                warn!("Settings record '{}': field '{}' is unreadable; using no rules.", self.name, key);
                RuleSet::new()
            }
        }
    }
}

fn rule_from_value(value: &Value) -> Option<CleanupRule> {
    match value {
        Value::Object(_) => serde_json::from_value(value.clone()).ok(),
        Value::Array(pair) if pair.len() == 2 => Some(CleanupRule::new(pair[0].as_str()?, pair[1].as_str()?)),
        _ => None,
    }
}

/// Coalesces settings writes: each change re-arms a trailing debounce and only the
/// last state of a burst is written.
pub struct SettingsWriter<B: SettingsBackend> {
    backend: B,
    debouncer: Debouncer,
    pending: Option<String>,
    writes: usize,
}

impl<B: SettingsBackend> SettingsWriter<B> {
    pub fn new(backend: B) -> Self {
        Self::with_delay(backend, SETTINGS_WRITE_DELAY)
    }

    pub fn with_delay(backend: B, delay: Duration) -> Self {
        Self { backend, debouncer: Debouncer::trailing(delay), pending: None, writes: 0 }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Number of blobs handed to the backend so far.
    pub fn writes(&self) -> usize {
        self.writes
    }

    pub fn has_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Snapshots `store` and restarts the quiet period.
    pub fn schedule(&mut self, store: &ProfileStore, now: Instant) -> Result<()> {
        self.pending = Some(store_to_json(store)?);
        self.debouncer.signal(now);
        Ok(())
    }

    /// Writes the pending snapshot if the quiet period has elapsed. Returns whether
    /// a write happened.
    pub fn poll(&mut self, now: Instant) -> Result<bool> {
        if self.debouncer.poll(now) {
            return self.write_pending();
        }
        Ok(false)
    }

    /// Writes any pending snapshot immediately.
    pub fn flush(&mut self) -> Result<bool> {
        self.debouncer.flush();
        self.write_pending()
    }

    fn write_pending(&mut self) -> Result<bool> {
        let Some(blob) = self.pending.take() else {
            return Ok(false);
        };
        self.backend.save(&blob).context("Failed to write settings")?;
        self.writes += 1;
        debug!("Settings written ({} byte(s)).", blob.len());
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[derive(Default)]
    struct MemoryBackend {
        saved: Mutex<Vec<String>>,
    }

    impl SettingsBackend for MemoryBackend {
        fn load(&self) -> Result<Option<String>> {
            Ok(self.saved.lock().unwrap().last().cloned())
        }

        fn save(&self, blob: &str) -> Result<()> {
            self.saved.lock().unwrap().push(blob.to_string());
            Ok(())
        }
    }

    #[test]
    fn only_objects_count_as_settings() {
        assert!(is_settings_blob("{}"));
        assert!(is_settings_blob("  "));
        assert!(!is_settings_blob("not json"));
        assert!(!is_settings_blob("[1, 2]"));
    }

    #[test]
    fn current_records_round_trip() {
        let mut store = ProfileStore::with_default();
        store.create("blog", None).unwrap();
        store.get_mut("blog").unwrap().targets.file_path = "out/blog.html".to_string();
        let json = store_to_json(&store).unwrap();
        assert!(json.contains("\"schemaVersion\": 2"));
        assert_eq!(load_store_from_json(&json), store);
    }

    #[test]
    fn legacy_record_is_upgraded() {
        let legacy = r#"{
            "default": {
                "attributeList": ["id", "href"],
                "classList": ["keep"],
                "isActiveProfile": true,
                "exportCleaned": true,
                "rulesMap": {"div": "p", "span": ""}
            }
        }"#;
        let store = load_store_from_json(legacy);
        let p = store.get("default").unwrap();
        assert!(p.is_active);
        assert!(p.cleanup.attribute_allow_list.contains("href"));
        assert!(p.cleanup.class_allow_list.contains("keep"));
        assert_eq!(p.cleanup.rules.len(), 2);
        assert_eq!(p.cleanup.rules.get(0), Some(&CleanupRule::new("div", "p")));
        assert!(p.targets.clipboard);
        assert!(!p.targets.dirty);
        assert!(!p.targets.file);
    }

    #[test]
    fn legacy_rules_map_keeps_written_order() {
        let store = load_store_from_json(r#"{"x": {"rulesMap": {"p": "span", "div": "p", "a": "b"}}}"#);
        let rules: Vec<String> = store.get("x").unwrap().cleanup.rules.iter().map(|r| r.to_string()).collect();
        assert_eq!(rules, vec!["p -> span", "div -> p", "a -> b"]);
    }

    #[test]
    fn legacy_pair_array_rules() {
        let store = load_store_from_json(r#"{"x": {"rulesMap": [["h1", "h2"], ["", ""]]}}"#);
        let rules = &store.get("x").unwrap().cleanup.rules;
        assert_eq!(rules.get(0), Some(&CleanupRule::new("h1", "h2")));
        assert!(rules.get(1).unwrap().is_noop());
    }

    #[test]
    fn corrupt_fields_default_individually() {
        let store = load_store_from_json(
            r#"{"x": {"schemaVersion": 2, "attributeAllowList": "id", "clipboard": "yes", "rules": 7, "classAllowList": ["a", 3]}}"#,
        );
        let p = store.get("x").unwrap();
        assert!(p.cleanup.attribute_allow_list.is_empty());
        assert!(p.targets.clipboard);
        assert!(p.cleanup.rules.is_empty());
        assert_eq!(p.cleanup.class_allow_list.len(), 1);
    }

    #[test]
    fn unreadable_blob_yields_default_store() {
        assert_eq!(load_store_from_json("not json"), ProfileStore::with_default());
        assert_eq!(load_store_from_json("[1,2]"), ProfileStore::with_default());
        assert_eq!(load_store_from_json("{}"), ProfileStore::with_default());
    }

    #[test]
    fn writes_within_window_coalesce() -> Result<()> {
        let t0 = Instant::now();
        let mut writer = SettingsWriter::new(MemoryBackend::default());
        let mut store = ProfileStore::with_default();
        writer.schedule(&store, t0)?;
        store.create("a", None)?;
        writer.schedule(&store, t0 + Duration::from_millis(100))?;
        store.create("b", None)?;
        writer.schedule(&store, t0 + Duration::from_millis(200))?;

        assert!(!writer.poll(t0 + Duration::from_millis(300))?);
        assert!(writer.poll(t0 + Duration::from_millis(450))?);
        assert_eq!(writer.writes(), 1);

        let stored = load_store(writer.backend())?;
        assert_eq!(stored.list(), vec!["a", "b", "default"]);
        Ok(())
    }

    #[test]
    fn flush_writes_immediately() -> Result<()> {
        let mut writer = SettingsWriter::new(MemoryBackend::default());
        assert!(!writer.flush()?);
        writer.schedule(&ProfileStore::with_default(), Instant::now())?;
        assert!(writer.flush()?);
        assert!(!writer.has_pending());
        Ok(())
    }
}
