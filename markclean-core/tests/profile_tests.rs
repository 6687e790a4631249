// markclean-core/tests/profile_tests.rs
use anyhow::Result;
use markclean_core::profiles::*;
use markclean_core::{headless_clean_string, HeadlessEngineType, MarkcleanError};
use std::fs;
use tempfile::tempdir;

fn active_profiles(store: &ProfileStore) -> Vec<&str> {
    store.iter().filter(|(_, p)| p.is_active).map(|(n, _)| n).collect()
}

#[test]
fn test_exactly_one_active_after_any_activation_sequence() -> Result<()> {
    let mut store = ProfileStore::with_default();
    for name in ["a", "b", "c"] {
        store.create(name, None)?;
    }
    let sequence = ["c", "a", "a", "default", "b", "c"];
    for name in sequence {
        store.activate(name)?;
        assert_eq!(active_profiles(&store), vec![name]);
    }
    Ok(())
}

#[test]
fn test_empty_store_has_no_active_profile_until_resolved() {
    let mut store = ProfileStore::new();
    assert!(active_profiles(&store).is_empty());
    assert_eq!(store.resolve_active(), DEFAULT_PROFILE);
    assert_eq!(active_profiles(&store), vec![DEFAULT_PROFILE]);
}

#[test]
fn test_resolve_named_profile_does_not_fall_back() {
    let mut store = ProfileStore::with_default();
    let err = store.resolve(Some("missing")).unwrap_err();
    assert!(matches!(err, MarkcleanError::ProfileNotFound(name) if name == "missing"));
}

#[test]
fn test_duplicate_create_leaves_store_untouched() -> Result<()> {
    let mut store = ProfileStore::with_default();
    store.get_mut("default")?.cleanup.class_allow_list.insert("keep".to_string());
    let before = store.clone();
    assert!(matches!(store.create("default", None), Err(MarkcleanError::ProfileAlreadyExists(_))));
    assert_eq!(store, before);
    Ok(())
}

#[test]
fn test_created_profile_from_initial_is_inactive() -> Result<()> {
    let mut store = ProfileStore::with_default();
    store.create("copy", Some(Profile::default_preset()))?;
    assert!(!store.get("copy")?.is_active);
    assert_eq!(store.active_name(), Some("default"));
    Ok(())
}

#[test]
fn test_yaml_profile_file_round_trip() -> Result<()> {
    let dir = tempdir()?;
    let path = dir.path().join("blog.yaml");

    let mut profile = Profile::new_empty();
    profile.cleanup.attribute_allow_list.insert("href".to_string());
    profile.cleanup.rules.append(markclean_core::CleanupRule::new("h1", "h2"));
    profile.targets.file = true;
    profile.targets.file_path = "export/blog.html".to_string();
    fs::write(&path, profile_to_yaml("blog", &profile)?)?;

    let exchange = load_profile_file(&path)?;
    assert_eq!(exchange.profile_name, "blog");
    assert_eq!(exchange.profile, profile);
    Ok(())
}

#[test]
fn test_loading_a_malformed_profile_file_fails_with_context() -> Result<()> {
    let dir = tempdir()?;
    let path = dir.path().join("broken.yaml");
    fs::write(&path, "profile_name: [unclosed")?;
    let err = load_profile_file(&path).unwrap_err();
    assert!(format!("{:#}", err).contains("parsing profile YAML"));
    Ok(())
}

#[test]
fn test_default_preset_cleans_rendered_note() -> Result<()> {
    let profile = Profile::default_preset();
    let rendered = concat!(
        "<div class=\"el-h1\"><h1 data-heading=\"Title\" dir=\"auto\">Title</h1></div>\n",
        "<div class=\"el-p\"><p dir=\"auto\">See <a href=\"https://example.com\" class=\"external-link\" target=\"_blank\">this</a>.</p></div>\n",
        "<div class=\"el-table\"><table><tr><td colspan=\"2\" style=\"x\">c</td></tr></table></div>"
    );
    let out = headless_clean_string(&profile, rendered, HeadlessEngineType::Clean)?;
    assert_eq!(
        out,
        concat!(
            "<p><h1>Title</h1></p>\n",
            "<p><p>See <a href=\"https://example.com\">this</a>.</p></p>\n",
            "<p><table><tbody><tr><td colspan=\"2\">c</td></tr></tbody></table></p>"
        )
    );
    Ok(())
}
