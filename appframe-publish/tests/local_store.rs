use std::collections::BTreeMap;

use appframe_publish::store::LocalStore;
use appframe_publish_core::contract::{Authenticator, DataBackend, RecordDescriptor};
use tempfile::tempdir;

fn descriptor(article_id: &str, criteria: &[(&str, &str)]) -> RecordDescriptor {
    RecordDescriptor {
        domain: "host1".into(),
        hostname: "host1".into(),
        article_id: article_id.into(),
        data_object_id: "dsScripts".into(),
        criteria: criteria
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect(),
    }
}

#[tokio::test]
async fn test_missing_file_is_empty_store() {
    let dir = tempdir().unwrap();
    let store = LocalStore::open(dir.path().join("store.json")).unwrap();
    assert!(store.records().unwrap().is_empty());

    let found = store
        .fetch_record_if_exists(&descriptor("appdesigner-script", &[("ID", "init")]))
        .await
        .unwrap();
    assert!(found.is_none());
}

#[tokio::test]
async fn test_insert_then_update_survives_reopen() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("store.json");
    let store = LocalStore::open(&path).unwrap();

    let mut fields = BTreeMap::new();
    fields.insert("HostName".to_string(), "host1".to_string());
    fields.insert("ID".to_string(), "init".to_string());
    fields.insert("Script".to_string(), "first();".to_string());
    assert!(store
        .insert_record(&descriptor("appdesigner", &[]), fields)
        .await
        .unwrap());

    let lookup = descriptor("appdesigner-script", &[("HostName", "host1"), ("ID", "init")]);
    let record = store
        .fetch_record_if_exists(&lookup)
        .await
        .unwrap()
        .expect("inserted record should be found");
    assert!(store
        .write_field(&lookup, "Script", "second();", &record.primary_key)
        .await
        .unwrap());
    assert!(!store
        .write_field(&lookup, "Script", "x", "no-such-key")
        .await
        .unwrap());

    let reopened = LocalStore::open(&path).unwrap();
    let records = reopened.records().unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].primary_key, record.primary_key);
    assert_eq!(records[0].fields.get("Script").map(String::as_str), Some("second();"));
}

#[tokio::test]
async fn test_login_requires_domain() {
    let dir = tempdir().unwrap();
    let store = LocalStore::open(dir.path().join("store.json")).unwrap();
    assert!(store.login("host1", "me", "secret").await.unwrap());
    assert!(!store.login("", "me", "secret").await.unwrap());
}

#[tokio::test]
async fn test_failed_write_leaves_store_unchanged() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("store.json");
    let store = LocalStore::open(&path).unwrap();
    // A directory in place of the store file makes every write fail.
    std::fs::create_dir(&path).unwrap();

    let mut fields = BTreeMap::new();
    fields.insert("HostName".to_string(), "host1".to_string());
    fields.insert("ID".to_string(), "init".to_string());
    assert!(store
        .insert_record(&descriptor("appdesigner", &[]), fields)
        .await
        .is_err());

    assert!(store.records().unwrap().is_empty());
    let found = store
        .fetch_record_if_exists(&descriptor("appdesigner-script", &[("ID", "init")]))
        .await
        .unwrap();
    assert!(found.is_none());
}
