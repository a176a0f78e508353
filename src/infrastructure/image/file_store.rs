//! File-backed blob store backing `file://` handles.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use tokio::fs;
use tokio::io::{AsyncWrite, AsyncWriteExt};
use tracing::{debug, warn};

use crate::domain::entities::{ImageId, ImagePayload, ObjectUrl, extension_for_mime};
use crate::domain::errors::{CacheError, CacheResult};
use crate::domain::ports::ObjectUrlPort;

/// Writes each fetched image to its own file.
#[derive(Debug)]
pub struct FileObjectStore {
    dir: PathBuf,
    live: AtomicUsize,
}

impl FileObjectStore {
    /// Creates a store writing into `dir`, resolved to an absolute path.
    ///
    /// # Errors
    /// Returns error if the directory cannot be created or its path is not UTF-8.
    pub async fn new(dir: PathBuf) -> CacheResult<Self> {
        fs::create_dir_all(&dir)
            .await
            .map_err(|e| CacheError::storage(format!("failed to create store dir: {e}")))?;
        let dir = fs::canonicalize(&dir)
            .await
            .map_err(|e| CacheError::storage(format!("failed to resolve store dir: {e}")))?;
        if dir.to_str().is_none() {
            return Err(CacheError::storage(format!(
                "store dir is not valid UTF-8: {}",
                dir.display()
            )));
        }

        Ok(Self {
            dir,
            live: AtomicUsize::new(0),
        })
    }

    /// Returns the directory files are written to.
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Writes `payload` through `writer`, deleting `path` if the write fails.
    async fn write_or_remove<W>(
        path: &Path,
        mut writer: W,
        payload: &ImagePayload,
    ) -> CacheResult<()>
    where
        W: AsyncWrite + Unpin,
    {
        let written = Self::write_payload(&mut writer, payload).await;
        drop(writer);

        if written.is_err() {
            match fs::remove_file(path).await {
                Ok(()) => debug!(path = %path.display(), "Removed partial image file"),
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "Failed to remove partial image file");
                }
            }
        }
        written
    }

    async fn write_payload<W>(writer: &mut W, payload: &ImagePayload) -> CacheResult<()>
    where
        W: AsyncWrite + Unpin,
    {
        writer
            .write_all(&payload.bytes)
            .await
            .map_err(|e| CacheError::storage(format!("failed to write image file: {e}")))?;
        writer
            .flush()
            .await
            .map_err(|e| CacheError::storage(format!("failed to flush image file: {e}")))
    }

    fn file_name(payload: &ImagePayload) -> String {
        let id = ImageId::from_url(&payload.source);
        let unique = uuid::Uuid::new_v4().simple().to_string();
        let ext = extension_for_mime(&payload.mime_type());
        format!("{id}.{}.{ext}", &unique[..8])
    }
}

#[async_trait]
impl ObjectUrlPort for FileObjectStore {
    async fn create_object_url(&self, payload: &ImagePayload) -> CacheResult<ObjectUrl> {
        let path = self.dir.join(Self::file_name(payload));

        let file = fs::File::create(&path)
            .await
            .map_err(|e| CacheError::storage(format!("failed to create image file: {e}")))?;
        Self::write_or_remove(&path, file, payload).await?;

        self.live.fetch_add(1, Ordering::Relaxed);
        debug!(path = %path.display(), size = payload.len(), "Stored image file");

        Ok(ObjectUrl::new(format!("file://{}", path.display())))
    }

    async fn revoke_object_url(&self, handle: &ObjectUrl) {
        let Some(path) = handle.to_file_path() else {
            warn!(handle = %handle, "Not a file handle, ignoring");
            return;
        };
        if !path.starts_with(&self.dir) {
            warn!(path = %path.display(), "Handle outside store dir, ignoring");
            return;
        }

        match fs::remove_file(&path).await {
            Ok(()) => {
                // Files left by an earlier process were never counted.
                let _ = self
                    .live
                    .fetch_update(Ordering::Relaxed, Ordering::Relaxed, |n| n.checked_sub(1));
                debug!(path = %path.display(), "Removed image file");
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => warn!(path = %path.display(), error = %e, "Failed to remove image file"),
        }
    }

    fn len(&self) -> usize {
        self.live.load(Ordering::Relaxed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ports::mocks::PNG_BYTES;
    use tempfile::TempDir;

    async fn create_test_store() -> (FileObjectStore, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let store = FileObjectStore::new(temp_dir.path().join("images"))
            .await
            .unwrap();
        (store, temp_dir)
    }

    #[tokio::test]
    async fn test_create_writes_file() {
        let (store, _temp) = create_test_store().await;
        let payload = ImagePayload::new("https://cdn.example/logo", PNG_BYTES.to_vec());

        let handle = store.create_object_url(&payload).await.unwrap();

        let path = handle.to_file_path().unwrap();
        assert!(path.starts_with(store.dir()));
        assert_eq!(path.extension().unwrap(), "png");
        assert_eq!(fs::read(&path).await.unwrap(), PNG_BYTES);
        assert_eq!(store.len(), 1);
    }

    #[tokio::test]
    async fn test_same_source_gets_distinct_files() {
        let (store, _temp) = create_test_store().await;
        let payload = ImagePayload::new("https://cdn.example/a.jpg", b"jpeg".to_vec())
            .with_content_type("image/jpeg");

        let a = store.create_object_url(&payload).await.unwrap();
        let b = store.create_object_url(&payload).await.unwrap();

        assert_ne!(a, b);
        assert!(a.as_str().ends_with(".jpg"));
    }

    #[tokio::test]
    async fn test_revoke_removes_file() {
        let (store, _temp) = create_test_store().await;
        let handle = store
            .create_object_url(&ImagePayload::new("u", PNG_BYTES.to_vec()))
            .await
            .unwrap();
        let path = handle.to_file_path().unwrap();

        store.revoke_object_url(&handle).await;
        store.revoke_object_url(&handle).await;

        assert!(!fs::try_exists(&path).await.unwrap());
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn test_failed_write_removes_partial_file() {
        let (store, _temp) = create_test_store().await;
        let path = store.dir().join("partial.png");
        fs::write(&path, b"").await.unwrap();
        let read_only = fs::File::open(&path).await.unwrap();
        let payload = ImagePayload::new("https://cdn.example/logo", PNG_BYTES.to_vec());

        let err = FileObjectStore::write_or_remove(&path, read_only, &payload)
            .await
            .unwrap_err();

        assert!(matches!(err, CacheError::Storage { .. }));
        assert!(!fs::try_exists(&path).await.unwrap());
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn test_relative_dir_yields_absolute_handles() {
        let cwd = std::env::current_dir().unwrap();
        let temp = TempDir::new_in(&cwd).unwrap();
        let relative = temp.path().strip_prefix(&cwd).unwrap().join("images");
        assert!(relative.is_relative());
        let store = FileObjectStore::new(relative).await.unwrap();

        let handle = store
            .create_object_url(&ImagePayload::new("u", PNG_BYTES.to_vec()))
            .await
            .unwrap();
        let path = handle.to_file_path().unwrap();

        assert!(store.dir().is_absolute());
        assert!(path.is_absolute());
        assert!(handle.as_str().starts_with("file:///"));

        store.revoke_object_url(&handle).await;
        assert!(!fs::try_exists(&path).await.unwrap());
    }

    #[tokio::test]
    async fn test_revoke_ignores_foreign_paths() {
        let (store, temp) = create_test_store().await;
        let outside = temp.path().join("keep.png");
        fs::write(&outside, b"x").await.unwrap();

        store
            .revoke_object_url(&ObjectUrl::new(format!("file://{}", outside.display())))
            .await;

        assert!(fs::try_exists(&outside).await.unwrap());
    }
}
