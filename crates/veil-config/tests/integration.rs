use std::fs;

use serde_json::{Map, Value, json};
use veil_config::{ConfigError, ConfigStore, default_config};
use veil_test_support::fixtures::TempProject;

fn store_for(project: &TempProject) -> ConfigStore {
    ConfigStore::in_project(project.root())
}

#[test]
fn load_seeds_storage_with_defaults() -> anyhow::Result<()> {
    let project = TempProject::new()?;
    let store = store_for(&project);
    assert!(!store.path().exists());

    let loaded = store.load();

    assert_eq!(loaded, default_config());
    let persisted: Value = serde_json::from_str(&fs::read_to_string(store.path())?)?;
    assert_eq!(persisted, serde_json::to_value(default_config())?);
    Ok(())
}

#[test]
fn reset_is_idempotent() -> anyhow::Result<()> {
    let project = TempProject::new()?;
    let store = store_for(&project);
    let mut partial = Map::new();
    partial.insert("authToken".to_string(), json!("changed"));
    store.update(partial)?;

    assert!(store.reset());
    let once = fs::read_to_string(store.path())?;
    assert!(store.reset());
    let twice = fs::read_to_string(store.path())?;

    assert_eq!(once, twice);
    assert_eq!(store.load(), default_config());
    Ok(())
}

#[test]
fn export_then_import_round_trips() -> anyhow::Result<()> {
    let project = TempProject::new()?;
    let store = store_for(&project);
    let mut partial = Map::new();
    partial.insert("authToken".to_string(), json!("round-trip-token"));
    partial.insert("fallbackPort".to_string(), json!(8443));
    let exported_doc = store.update(partial)?;

    let external = project.root().join("exports/my-config.json");
    assert!(store.export_to(&external));

    let other = ConfigStore::new(project.root().join("other/default.json"));
    let imported = other.import_from(&external)?;

    assert_eq!(imported, exported_doc);
    assert_eq!(other.load(), exported_doc);
    Ok(())
}

#[test]
fn import_missing_region_mapping_leaves_document_untouched() -> anyhow::Result<()> {
    let project = TempProject::new()?;
    let store = store_for(&project);
    let _ = store.load();
    let before = fs::read_to_string(store.path())?;

    let external = project.root().join("incomplete.json");
    fs::write(
        &external,
        serde_json::to_string_pretty(&json!({
            "authToken": "token",
            "fallbackAddress": ["proxy.example"]
        }))?,
    )?;

    let err = store.import_from(&external).unwrap_err();
    match err {
        ConfigError::Validation { missing } => assert_eq!(missing, vec!["regionMapping"]),
        other => panic!("unexpected error: {other}"),
    }
    assert_eq!(fs::read_to_string(store.path())?, before);
    Ok(())
}

#[test]
fn import_fills_optional_keys_from_defaults() -> anyhow::Result<()> {
    let project = TempProject::new()?;
    let store = store_for(&project);
    let external = project.root().join("minimal.json");
    fs::write(
        &external,
        json!({
            "authToken": "token",
            "fallbackAddress": ["proxy.example"],
            "regionMapping": { "JP": "Japan" }
        })
        .to_string(),
    )?;

    let imported = store.import_from(&external)?;

    assert_eq!(imported.fallback_address, vec!["proxy.example".to_string()]);
    assert_eq!(imported.backup_ips, default_config().backup_ips);
    assert_eq!(imported.obfuscation, default_config().obfuscation);
    Ok(())
}

#[test]
fn export_failure_is_reported_not_raised() -> anyhow::Result<()> {
    let project = TempProject::new()?;
    let store = store_for(&project);
    let blocker = project.root().join("blocker");
    fs::write(&blocker, "plain file")?;

    assert!(!store.export_to(&blocker.join("config.json")));
    Ok(())
}
