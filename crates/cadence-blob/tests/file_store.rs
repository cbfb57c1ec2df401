//! Integration tests for the file-backed blob store.

use cadence_blob::{BlobStore, Error, FileBlobStore};
use rstest::rstest;
use tempfile::TempDir;

async fn open_store() -> (TempDir, FileBlobStore) {
    let dir = TempDir::new().unwrap();
    let store = FileBlobStore::open(dir.path().join("data")).await.unwrap();
    (dir, store)
}

#[tokio::test]
async fn open_creates_data_directory() {
    let dir = TempDir::new().unwrap();
    let root = dir.path().join("nested").join("data");

    let store = FileBlobStore::open(&root).await.unwrap();

    assert!(root.is_dir());
    assert_eq!(store.root(), root.as_path());
}

#[tokio::test]
async fn get_missing_key_returns_none() {
    let (_dir, store) = open_store().await;
    assert!(store.get("state.json").await.unwrap().is_none());
}

#[tokio::test]
async fn put_then_get_returns_same_bytes() {
    let (_dir, store) = open_store().await;
    let payload = br#"{"issues":{},"sprints":{}}"#;

    store.put("state.json", payload).await.unwrap();

    let read_back = store.get("state.json").await.unwrap().unwrap();
    assert_eq!(read_back, payload);
}

#[tokio::test]
async fn put_overwrites_previous_blob() {
    let (_dir, store) = open_store().await;

    store.put("state.json", b"a much longer first blob").await.unwrap();
    store.put("state.json", b"short").await.unwrap();

    assert_eq!(store.get("state.json").await.unwrap().unwrap(), b"short");
}

#[tokio::test]
async fn reopened_store_sees_persisted_blobs() {
    let dir = TempDir::new().unwrap();
    let root = dir.path().join("data");

    {
        let store = FileBlobStore::open(&root).await.unwrap();
        store.put("state.json", b"persisted").await.unwrap();
    }

    let reopened = FileBlobStore::open(&root).await.unwrap();
    assert_eq!(
        reopened.get("state.json").await.unwrap().unwrap(),
        b"persisted"
    );
}

#[tokio::test]
async fn keys_lists_blobs_and_skips_temp_files() {
    let (_dir, store) = open_store().await;

    store.put("b-state", b"1").await.unwrap();
    store.put("a-state", b"2").await.unwrap();
    tokio::fs::write(store.root().join(".c-state.tmp"), b"partial")
        .await
        .unwrap();

    assert_eq!(store.keys().await.unwrap(), vec!["a-state", "b-state"]);
}

#[tokio::test]
async fn tmp_suffixed_key_survives_write_of_its_stem() {
    let (_dir, store) = open_store().await;

    store.put("notes.tmp", b"keep me").await.unwrap();
    assert_eq!(store.keys().await.unwrap(), vec!["notes.tmp"]);

    store.put("notes", b"other").await.unwrap();

    assert_eq!(
        store.get("notes.tmp").await.unwrap().as_deref(),
        Some(&b"keep me"[..])
    );
    assert_eq!(store.get("notes").await.unwrap().unwrap(), b"other");
    assert_eq!(store.keys().await.unwrap(), vec!["notes", "notes.tmp"]);
}

#[tokio::test]
async fn remove_reports_whether_blob_existed() {
    let (_dir, store) = open_store().await;

    store.put("state.json", b"x").await.unwrap();

    assert!(store.remove("state.json").await.unwrap());
    assert!(!store.remove("state.json").await.unwrap());
    assert!(!store.path_for("state.json").unwrap().exists());
}

#[rstest]
#[case::traversal("../outside")]
#[case::absolute("/etc/passwd")]
#[case::hidden(".config")]
#[tokio::test]
async fn invalid_keys_never_touch_the_filesystem(#[case] key: &str) {
    let (_dir, store) = open_store().await;

    let result = store.put(key, b"x").await;

    assert!(matches!(result, Err(Error::InvalidKey { .. })));
    assert!(store.keys().await.unwrap().is_empty());
}
