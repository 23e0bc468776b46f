// tests/catalog_tests.rs
use std::fs;
use std::path::Path;

use encrypted_object_store::catalog::CorruptPolicy;
use encrypted_object_store::error::CoreError;
use encrypted_object_store::{Catalog, CatalogEntries, JsonCatalog, ObjectRecord, SqliteCatalog};
use tempfile::tempdir;

mod common;

fn record(id: &str, name: &str, created_at: i64) -> ObjectRecord {
    ObjectRecord {
        storage_id: id.to_owned(),
        original_name: name.to_owned(),
        content_digest: format!("{:0>64}", created_at),
        created_at,
    }
}

fn sample() -> CatalogEntries {
    [record("aa11", "report.txt", 1_700_000_000), record("bb22", "photo.png", 1_700_000_100)]
        .into_iter()
        .map(|r| (r.storage_id.clone(), r))
        .collect()
}

fn files_in(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = fs::read_dir(dir)
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}

#[test]
fn test_json_absent_snapshot_is_created_empty() {
    common::setup();
    let dir = tempdir().unwrap();
    let path = dir.path().join("uploads").join("metadata.json");
    let catalog = JsonCatalog::open(&path, CorruptPolicy::Reset).unwrap();

    assert!(catalog.load().unwrap().is_empty());
    assert!(path.is_file());
    let doc: serde_json::Value = serde_json::from_slice(&fs::read(&path).unwrap()).unwrap();
    assert_eq!(doc, serde_json::json!({}));
}

#[test]
fn test_json_absent_snapshot_is_created_empty_on_update() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("metadata.json");
    let catalog = JsonCatalog::open(&path, CorruptPolicy::Reset).unwrap();

    assert!(catalog.load_for_update().unwrap().is_empty());
    assert_eq!(files_in(dir.path()), vec!["metadata.json".to_owned()]);
}

#[test]
fn test_json_save_survives_restart() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("metadata.json");
    JsonCatalog::open(&path, CorruptPolicy::Reset)
        .unwrap()
        .save(&sample())
        .unwrap();

    let reloaded = JsonCatalog::open(&path, CorruptPolicy::Reset)
        .unwrap()
        .load()
        .unwrap();
    assert_eq!(reloaded, sample());
    assert_eq!(files_in(dir.path()), vec!["metadata.json"]);
}

#[test]
fn test_json_document_uses_stable_field_names() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("metadata.json");
    JsonCatalog::open(&path, CorruptPolicy::Reset)
        .unwrap()
        .save(&sample())
        .unwrap();

    let doc: serde_json::Value = serde_json::from_slice(&fs::read(&path).unwrap()).unwrap();
    let entry = &doc["aa11"];
    assert_eq!(entry["original_filename"], "report.txt");
    assert_eq!(entry["timestamp"], 1_700_000_000);
    assert_eq!(entry["hash"].as_str().unwrap().len(), 64);
}

#[test]
fn test_json_tolerates_unknown_and_missing_fields() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("metadata.json");
    fs::write(
        &path,
        r#"{
            "3f2a.enc": { "hash": "abc", "timestamp": 5, "uploader": "alice" },
            "c0ffee": { "original_filename": "notes.md", "timestamp": null }
        }"#,
    )
    .unwrap();

    let entries = JsonCatalog::open(&path, CorruptPolicy::Reset)
        .unwrap()
        .load()
        .unwrap();

    let legacy = &entries["3f2a.enc"];
    assert_eq!(legacy.original_name, "3f2a");
    assert_eq!(legacy.content_digest, "abc");
    assert_eq!(legacy.created_at, 5);

    let partial = &entries["c0ffee"];
    assert_eq!(partial.original_name, "notes.md");
    assert_eq!(partial.content_digest, "");
    assert_eq!(partial.created_at, 0);
}

#[test]
fn test_json_plain_load_reads_corrupt_snapshot_as_empty_and_leaves_it() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("metadata.json");
    fs::write(&path, b"{ \"half\": { \"hash\": ").unwrap();

    let catalog = JsonCatalog::open(&path, CorruptPolicy::Reset).unwrap();
    assert!(catalog.load().unwrap().is_empty());
    assert!(catalog.load().unwrap().is_empty());

    assert_eq!(files_in(dir.path()), vec!["metadata.json".to_owned()]);
    assert_eq!(fs::read(&path).unwrap(), b"{ \"half\": { \"hash\": ");
}

#[test]
fn test_json_corrupt_snapshot_resets_and_is_kept_aside() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("metadata.json");
    fs::write(&path, b"{ \"half\": { \"hash\": ").unwrap();

    let catalog = JsonCatalog::open(&path, CorruptPolicy::Reset).unwrap();
    assert!(catalog.load_for_update().unwrap().is_empty());

    let names = files_in(dir.path());
    assert_eq!(names.len(), 1);
    assert!(names[0].starts_with("metadata.json.corrupt-"));
    assert_eq!(
        fs::read(dir.path().join(&names[0])).unwrap(),
        b"{ \"half\": { \"hash\": "
    );

    catalog.save(&sample()).unwrap();
    assert_eq!(catalog.load().unwrap(), sample());
}

#[test]
fn test_json_empty_file_counts_as_corrupt() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("metadata.json");
    fs::write(&path, b"").unwrap();

    let catalog = JsonCatalog::open(&path, CorruptPolicy::Reset).unwrap();
    assert!(catalog.load().unwrap().is_empty());
}

#[test]
fn test_json_fail_policy_surfaces_corruption() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("metadata.json");
    fs::write(&path, b"[1, 2, 3]").unwrap();

    let catalog = JsonCatalog::open(&path, CorruptPolicy::Fail).unwrap();
    assert!(matches!(catalog.load(), Err(CoreError::CatalogCorrupt(_))));
    assert!(matches!(
        catalog.load_for_update(),
        Err(CoreError::CatalogCorrupt(_))
    ));
    assert_eq!(fs::read(&path).unwrap(), b"[1, 2, 3]");
}

#[test]
fn test_json_save_is_a_full_replace() {
    let dir = tempdir().unwrap();
    let catalog =
        JsonCatalog::open(dir.path().join("metadata.json"), CorruptPolicy::Reset).unwrap();
    catalog.save(&sample()).unwrap();

    let mut fewer = sample();
    fewer.remove("aa11");
    catalog.save(&fewer).unwrap();

    let reloaded = catalog.load().unwrap();
    assert_eq!(reloaded.len(), 1);
    assert!(reloaded.contains_key("bb22"));
}

#[test]
fn test_sqlite_roundtrip_and_full_replace() {
    let catalog = SqliteCatalog::open_in_memory().unwrap();
    assert!(catalog.load().unwrap().is_empty());

    catalog.save(&sample()).unwrap();
    assert_eq!(catalog.load().unwrap(), sample());

    let mut fewer = sample();
    fewer.remove("bb22");
    catalog.save(&fewer).unwrap();
    assert_eq!(catalog.load().unwrap(), fewer);
}

#[test]
fn test_sqlite_survives_reopen() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("catalog.db");
    SqliteCatalog::open(&path).unwrap().save(&sample()).unwrap();

    assert_eq!(SqliteCatalog::open(&path).unwrap().load().unwrap(), sample());
}

#[test]
fn test_sqlite_missing_name_falls_back_to_storage_id() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("catalog.db");
    let catalog = SqliteCatalog::open(&path).unwrap();

    let conn = rusqlite::Connection::open(&path).unwrap();
    conn.execute(
        "INSERT INTO objects (storage_id, hash, timestamp) VALUES ('dead.enc', 'x', 9)",
        [],
    )
    .unwrap();

    let entries = catalog.load().unwrap();
    assert_eq!(entries["dead.enc"].original_name, "dead");
}
