use spore_storage::*;
use std::time::Duration;
use tempfile::TempDir;

#[tokio::test]
async fn test_missing_blob_reads_as_none() {
    let temp = TempDir::new().unwrap();
    let store = BlobStore::builder().path(temp.path().join("model.bin")).open().await.unwrap();

    assert!(!store.exists());
    assert!(store.read().await.unwrap().is_none());
}

#[tokio::test]
async fn test_write_read_uncompressed() {
    let temp = TempDir::new().unwrap();
    let store = BlobStore::builder().path(temp.path().join("model.bin")).open().await.unwrap();

    store.write(b"hello forest").await.unwrap();
    assert!(store.exists());
    assert_eq!(store.read().await.unwrap().as_deref(), Some(&b"hello forest"[..]));
}

#[tokio::test]
async fn test_write_read_compressed() {
    let temp = TempDir::new().unwrap();
    let store = BlobStore::builder()
        .path(temp.path().join("model.bin"))
        .compression(Compression::Lz4)
        .open()
        .await
        .unwrap();

    let payload = vec![3u8; 8192];
    store.write(&payload).await.unwrap();

    let on_disk = std::fs::metadata(store.path()).unwrap().len();
    assert!(on_disk < payload.len() as u64, "lz4 should shrink a constant payload");
    assert_eq!(store.read().await.unwrap(), Some(payload));
}

#[tokio::test]
async fn test_blob_survives_compression_change() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("model.bin");

    let packed =
        BlobStore::builder().path(&path).compression(Compression::Lz4).open().await.unwrap();
    packed.write(b"first").await.unwrap();

    let plain = BlobStore::builder().path(&path).open().await.unwrap();
    assert_eq!(plain.read().await.unwrap().as_deref(), Some(&b"first"[..]));
}

#[tokio::test]
async fn test_overwrite_replaces_content() {
    let temp = TempDir::new().unwrap();
    let store = BlobStore::builder().path(temp.path().join("model.bin")).open().await.unwrap();

    store.write(b"old").await.unwrap();
    store.write(b"new").await.unwrap();

    assert_eq!(store.read().await.unwrap().as_deref(), Some(&b"new"[..]));
    let leftovers = std::fs::read_dir(temp.path()).unwrap().count();
    assert_eq!(leftovers, 1, "no temp files should remain after a successful write");
}

#[tokio::test]
async fn test_parent_directory_is_created() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("nested/models/model.bin");
    let store = BlobStore::builder().path(&path).open().await.unwrap();

    store.write(b"x").await.unwrap();
    assert!(path.exists());
}

#[tokio::test]
async fn test_missing_parent_without_create_fails() {
    let temp = TempDir::new().unwrap();
    let result = BlobStore::builder()
        .path(temp.path().join("absent/model.bin"))
        .create(false)
        .open()
        .await;

    assert!(matches!(result, Err(StorageError::Io { .. })));
}

#[tokio::test]
async fn test_corrupted_blob_is_an_error() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("model.bin");
    std::fs::write(&path, [42u8, 1, 2, 3]).unwrap();

    let store = BlobStore::builder().path(&path).open().await.unwrap();
    assert!(matches!(store.read().await, Err(StorageError::Corrupted { .. })));
}

#[tokio::test]
async fn test_fresh_temp_files_survive_open() {
    let temp = TempDir::new().unwrap();
    let fresh = temp.path().join("model.bin.sporetmp.1.1");
    std::fs::write(&fresh, b"in-flight").unwrap();

    tokio::time::sleep(Duration::from_millis(5)).await;
    let _store = BlobStore::builder().path(temp.path().join("model.bin")).open().await.unwrap();

    assert!(fresh.exists(), "temp files younger than the threshold are kept");
}
