// markclean-core/tests/settings_tests.rs
use anyhow::{Context, Result};
use markclean_core::{
    load_store, save_store, CleanupRule, ProfileStore, SettingsBackend, SettingsWriter, SETTINGS_WRITE_DELAY,
};
use std::fs;
use std::path::PathBuf;
use tempfile::tempdir;
use tokio::time::{Duration, Instant};

struct FileBackend {
    path: PathBuf,
}

impl SettingsBackend for FileBackend {
    fn load(&self) -> Result<Option<String>> {
        if !self.path.exists() {
            return Ok(None);
        }
        fs::read_to_string(&self.path).map(Some).context("reading settings")
    }

    fn save(&self, blob: &str) -> Result<()> {
        fs::write(&self.path, blob).context("writing settings")
    }
}

#[test]
fn missing_file_starts_with_default_profile() -> Result<()> {
    let dir = tempdir()?;
    let backend = FileBackend { path: dir.path().join("settings.json") };
    let store = load_store(&backend)?;
    assert_eq!(store, ProfileStore::with_default());
    Ok(())
}

#[test]
fn saved_store_loads_back_identically() -> Result<()> {
    let dir = tempdir()?;
    let backend = FileBackend { path: dir.path().join("settings.json") };
    let mut store = ProfileStore::with_default();
    store.create("wiki", None)?;
    store.get_mut("wiki")?.cleanup.rules.append(CleanupRule::new("span", "em"));
    store.activate("wiki")?;
    save_store(&backend, &store)?;

    assert_eq!(load_store(&backend)?, store);
    Ok(())
}

#[test]
fn plugin_era_settings_file_is_upgraded() -> Result<()> {
    let dir = tempdir()?;
    let path = dir.path().join("data.json");
    fs::write(
        &path,
        r#"{
            "default": {"attributeList": ["id"], "classList": [], "isActiveProfile": false, "exportCleaned": true, "rulesMap": {}},
            "blog": {"attributeList": ["href"], "classList": ["tag"], "isActiveProfile": true, "exportClipboard": false,
                     "htmlExportFilePath": "out/blog.html", "rulesMap": [["div", "section"]]}
        }"#,
    )?;
    let store = load_store(&FileBackend { path })?;

    assert_eq!(store.active_name(), Some("blog"));
    let blog = store.get("blog")?;
    assert!(!blog.targets.clipboard);
    assert!(blog.targets.file);
    assert_eq!(blog.targets.file_path, "out/blog.html");
    assert_eq!(blog.cleanup.rules.get(0), Some(&CleanupRule::new("div", "section")));
    assert!(store.get("default")?.cleanup.rules.is_empty());
    Ok(())
}

#[test]
fn burst_of_changes_is_written_once() -> Result<()> {
    let dir = tempdir()?;
    let path = dir.path().join("settings.json");
    let mut writer = SettingsWriter::new(FileBackend { path: path.clone() });
    let mut store = ProfileStore::with_default();
    let t0 = Instant::now();

    for (i, name) in ["a", "b", "c"].iter().enumerate() {
        store.create(name, None)?;
        writer.schedule(&store, t0 + Duration::from_millis(100 * i as u64))?;
        assert!(!writer.poll(t0 + Duration::from_millis(100 * i as u64 + 50))?);
    }
    assert!(!path.exists());
    assert!(writer.poll(t0 + Duration::from_millis(200) + SETTINGS_WRITE_DELAY)?);
    assert_eq!(writer.writes(), 1);
    assert_eq!(load_store(writer.backend())?.list(), vec!["a", "b", "c", "default"]);
    Ok(())
}
