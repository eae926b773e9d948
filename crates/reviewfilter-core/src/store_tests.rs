use super::*;
use crate::storage::{FileStorage, MemoryStorage};
use serde_json::json;
use tempfile::TempDir;

fn tab(id: &str) -> TabId {
    TabId::new(id)
}

fn memory_store() -> (Arc<MemoryStorage>, FilterStateStore) {
    let storage = Arc::new(MemoryStorage::new());
    let store = FilterStateStore::new(storage.clone());
    (storage, store)
}

#[test]
fn test_session_key_format() {
    assert_eq!(session_key(&tab("42")), "session_42");
}

#[tokio::test]
async fn test_load_defaults_when_empty() {
    let (_storage, mut store) = memory_store();
    let config = store.load(&tab("1")).await;
    assert_eq!(config, FilterConfiguration::default());
}

#[tokio::test]
async fn test_load_prefers_session_over_global() {
    let (storage, mut store) = memory_store();
    storage
        .set(
            StorageArea::Global,
            GLOBAL_STATE_KEY,
            json!({"visibilityState": {"Critical": false}, "showAllState": true}),
        )
        .await
        .unwrap();
    storage
        .set(
            StorageArea::Session,
            "session_1",
            json!({"visibilityState": {"Minor": false}, "showAllState": false}),
        )
        .await
        .unwrap();

    let config = store.load(&tab("1")).await;
    assert!(!config.show_all());
    assert!(config.severity_visible(Severity::Critical));
    assert!(!config.severity_visible(Severity::Minor));
}

#[tokio::test]
async fn test_load_falls_back_to_global() {
    let (storage, mut store) = memory_store();
    storage
        .set(
            StorageArea::Global,
            GLOBAL_STATE_KEY,
            json!({"visibilityState": {"Major": false}, "showAllState": true}),
        )
        .await
        .unwrap();
    storage
        .set(StorageArea::Global, GLOBAL_CUSTOM_BOTS_KEY, json!({"DepBot": false}))
        .await
        .unwrap();

    let config = store.load(&tab("7")).await;
    assert!(!config.severity_visible(Severity::Major));
    assert_eq!(config.custom_bot("depbot"), Some(false));
}

#[tokio::test]
async fn test_load_custom_bots_only_global() {
    let (storage, mut store) = memory_store();
    storage
        .set(StorageArea::Global, GLOBAL_CUSTOM_BOTS_KEY, json!({"renovate": true}))
        .await
        .unwrap();

    let config = store.load(&tab("1")).await;
    assert!(config.show_all());
    assert_eq!(config.custom_bot("renovate"), Some(true));
}

#[tokio::test]
async fn test_load_flattened_global_record() {
    let (storage, mut store) = memory_store();
    storage
        .set(StorageArea::Global, "visibilityState", json!({"Critical": false}))
        .await
        .unwrap();
    storage
        .set(StorageArea::Global, "showAllState", json!(false))
        .await
        .unwrap();

    let config = store.load(&tab("1")).await;
    assert!(!config.show_all());
    assert!(!config.severity_visible(Severity::Critical));
    assert!(config.severity_visible(Severity::Major));
}

#[tokio::test]
async fn test_load_sanitizes_tampered_session() {
    let (storage, mut store) = memory_store();
    storage
        .set(
            StorageArea::Session,
            "session_1",
            json!({"visibilityState": "broken", "customBots": {"  ": true, " X ": 1}}),
        )
        .await
        .unwrap();

    let config = store.load(&tab("1")).await;
    assert_eq!(config.severity_visibility().len(), 3);
    assert!(config.show_all());
    assert_eq!(config.custom_bots().len(), 1);
    assert_eq!(config.custom_bot("x"), Some(true));
}

#[tokio::test]
async fn test_load_with_unavailable_storage_uses_defaults() {
    let mut store = FilterStateStore::new(Arc::new(MemoryStorage::unavailable()));
    store.set_show_all(false);

    let config = store.load(&tab("1")).await;
    assert_eq!(config, FilterConfiguration::default());
}

#[tokio::test]
async fn test_save_to_session_then_load() {
    let (storage, mut store) = memory_store();
    store.set_severity_visibility("Major", false);
    store.set_custom_bot(" Foo ", true);
    store.save_to_session(&tab("3")).await;

    let mut fresh = FilterStateStore::new(storage);
    let config = fresh.load(&tab("3")).await;
    assert_eq!(config, store.get());

    let other = fresh.load(&tab("4")).await;
    assert_eq!(other, FilterConfiguration::default());
}

#[tokio::test]
async fn test_save_to_session_unavailable_is_silent() {
    let storage = Arc::new(MemoryStorage::unavailable());
    let store = FilterStateStore::new(storage);
    store.save_to_session(&tab("1")).await;
}

#[tokio::test]
async fn test_save_as_default_round_trip() {
    let (storage, mut store) = memory_store();
    store.set_show_all(false);
    store.set_severity_visibility("Critical", true);
    store.set_custom_bot("depbot", false);
    store.set_custom_bot("renovate", true);
    assert!(store.save_as_default().await);

    let mut fresh = FilterStateStore::new(storage);
    let config = fresh.load(&tab("99")).await;
    assert_eq!(config, store.get());
}

#[tokio::test]
async fn test_save_as_default_reports_failure() {
    let storage = Arc::new(MemoryStorage::unavailable());
    let store = FilterStateStore::new(storage);
    assert!(!store.save_as_default().await);
}

#[tokio::test]
async fn test_file_storage_round_trip() {
    let temp_dir = TempDir::new().unwrap();
    {
        let storage = Arc::new(FileStorage::new(temp_dir.path()).await.unwrap());
        let mut store = FilterStateStore::new(storage);
        store.set_severity_visibility("Minor", false);
        store.set_custom_bot("DepBot", false);
        assert!(store.save_as_default().await);
    }

    let storage = Arc::new(FileStorage::new(temp_dir.path()).await.unwrap());
    let mut store = FilterStateStore::new(storage);
    let config = store.load(&tab("1")).await;
    assert!(!config.severity_visible(Severity::Minor));
    assert_eq!(config.custom_bot("depbot"), Some(false));
}

#[tokio::test]
async fn test_clear_session_reverts_to_global() {
    let (storage, mut store) = memory_store();
    store.set_show_all(false);
    store.save_to_session(&tab("1")).await;
    store.clear_session(&tab("1")).await;

    let mut fresh = FilterStateStore::new(storage);
    assert_eq!(fresh.load(&tab("1")).await, FilterConfiguration::default());
}

#[test]
fn test_unknown_severity_label_ignored() {
    let (_storage, mut store) = memory_store();
    store.set_severity_visibility("Trivial", false);
    store.set_severity_visibility("critical", false);
    assert_eq!(store.get(), FilterConfiguration::default());
}

#[test]
fn test_set_show_all_cascade() {
    let (_storage, mut store) = memory_store();
    store.set_severity_visibility("Major", false);
    store.set_show_all(true);
    let config = store.get();
    assert!(config.show_all());
    assert!(Severity::ALL.iter().all(|s| config.severity_visible(*s)));
}

#[test]
fn test_custom_bot_update_not_duplicate() {
    let (_storage, mut store) = memory_store();
    store.set_custom_bot(" Foo ", true);
    store.set_custom_bot("foo", false);
    let config = store.get();
    assert_eq!(config.custom_bots().len(), 1);
    assert_eq!(config.custom_bots().get("foo"), Some(&false));

    store.remove_custom_bot("FOO");
    assert!(store.get().custom_bots().is_empty());
}

#[test]
fn test_get_returns_defensive_copy() {
    let (_storage, mut store) = memory_store();
    let snapshot = store.get();
    let mutated = snapshot.clone().reduce(FilterAction::set_show_all(false));
    assert!(!mutated.show_all());
    assert!(store.get().show_all());

    store.set_show_all(false);
    assert!(snapshot.show_all());
}
