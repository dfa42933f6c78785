use blog_server::uploads::UploadManager;
use blog_server::Error;
use std::path::Path;
use tempfile::TempDir;
use uuid::Uuid;

#[tokio::test]
async fn test_store_uses_generated_name() {
    let dir = TempDir::new().unwrap();
    let uploads = UploadManager::new(dir.path());

    let name = uploads.store(b"image-bytes", Some("photo.png")).await.unwrap();

    let path = Path::new(&name);
    assert_eq!(path.extension().and_then(|e| e.to_str()), Some("png"));
    let stem = path.file_stem().and_then(|s| s.to_str()).unwrap();
    assert!(Uuid::parse_str(stem).is_ok());
    assert!(!name.contains("photo"));

    let written = std::fs::read(dir.path().join(&name)).unwrap();
    assert_eq!(written, b"image-bytes");
}

#[tokio::test]
async fn test_store_names_are_unique() {
    let dir = TempDir::new().unwrap();
    let uploads = UploadManager::new(dir.path());

    let a = uploads.store(b"a", Some("cover.jpg")).await.unwrap();
    let b = uploads.store(b"b", Some("cover.jpg")).await.unwrap();
    assert_ne!(a, b);
}

#[tokio::test]
async fn test_traversal_name_is_neutralized() {
    let dir = TempDir::new().unwrap();
    let uploads = UploadManager::new(dir.path().join("inner"));
    std::fs::create_dir(uploads.dir()).unwrap();

    let name = uploads
        .store(b"data", Some("../../outside.png"))
        .await
        .unwrap();
    assert!(uploads.dir().join(&name).is_file());
    assert!(!dir.path().join("outside.png").exists());

    let bare = uploads.store(b"data", Some("README")).await.unwrap();
    assert!(Uuid::parse_str(&bare).is_ok());
}

#[tokio::test]
async fn test_store_requires_file_name() {
    let dir = TempDir::new().unwrap();
    let uploads = UploadManager::new(dir.path());

    assert!(matches!(
        uploads.store(b"data", None).await,
        Err(Error::InvalidInput(_))
    ));
    assert!(matches!(
        uploads.store(b"data", Some("  ")).await,
        Err(Error::InvalidInput(_))
    ));
}

#[tokio::test]
async fn test_missing_directory_is_storage_error() {
    let dir = TempDir::new().unwrap();
    let uploads = UploadManager::new(dir.path().join("does-not-exist"));

    assert!(matches!(
        uploads.store(b"data", Some("photo.png")).await,
        Err(Error::StorageUnavailable(_))
    ));
}
