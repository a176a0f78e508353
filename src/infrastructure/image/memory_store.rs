//! In-memory blob store backing `blob:` handles.

use std::collections::HashMap;

use async_trait::async_trait;
use bytes::Bytes;
use parking_lot::RwLock;
use tracing::{debug, trace};

use crate::domain::entities::{ImagePayload, ObjectUrl};
use crate::domain::errors::CacheResult;
use crate::domain::ports::ObjectUrlPort;

const BLOB_PREFIX: &str = "blob:baltek/";

/// Bytes held behind a handle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Blob {
    /// Image bytes.
    pub bytes: Bytes,
    /// Resolved MIME type.
    pub content_type: String,
}

/// Keeps fetched images in process memory.
#[derive(Debug, Default)]
pub struct MemoryObjectStore {
    blobs: RwLock<HashMap<ObjectUrl, Blob>>,
}

impl MemoryObjectStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the blob behind `handle` if it has not been revoked.
    #[must_use]
    pub fn resolve(&self, handle: &ObjectUrl) -> Option<Blob> {
        self.blobs.read().get(handle).cloned()
    }

    /// Returns the total number of bytes held.
    #[must_use]
    pub fn total_bytes(&self) -> usize {
        self.blobs.read().values().map(|b| b.bytes.len()).sum()
    }
}

#[async_trait]
impl ObjectUrlPort for MemoryObjectStore {
    async fn create_object_url(&self, payload: &ImagePayload) -> CacheResult<ObjectUrl> {
        let handle = ObjectUrl::new(format!("{BLOB_PREFIX}{}", uuid::Uuid::new_v4()));
        let blob = Blob {
            bytes: payload.bytes.clone(),
            content_type: payload.mime_type(),
        };

        trace!(handle = %handle, source = %payload.source, size = payload.len(), "Created blob");
        self.blobs.write().insert(handle.clone(), blob);
        Ok(handle)
    }

    async fn revoke_object_url(&self, handle: &ObjectUrl) {
        if self.blobs.write().remove(handle).is_some() {
            debug!(handle = %handle, "Revoked blob");
        }
    }

    fn len(&self) -> usize {
        self.blobs.read().len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ports::mocks::PNG_BYTES;

    #[tokio::test]
    async fn test_create_and_resolve() {
        let store = MemoryObjectStore::new();
        let payload = ImagePayload::new("https://cdn.example/a.png", PNG_BYTES.to_vec());

        let handle = store.create_object_url(&payload).await.unwrap();

        assert!(handle.as_str().starts_with(BLOB_PREFIX));
        let blob = store.resolve(&handle).unwrap();
        assert_eq!(blob.bytes.as_ref(), PNG_BYTES);
        assert_eq!(blob.content_type, "image/png");
        assert_eq!(store.total_bytes(), PNG_BYTES.len());
    }

    #[tokio::test]
    async fn test_each_create_gets_a_fresh_handle() {
        let store = MemoryObjectStore::new();
        let payload = ImagePayload::new("u", PNG_BYTES.to_vec());

        let a = store.create_object_url(&payload).await.unwrap();
        let b = store.create_object_url(&payload).await.unwrap();

        assert_ne!(a, b);
        assert_eq!(store.len(), 2);
    }

    #[tokio::test]
    async fn test_revoke_releases_blob() {
        let store = MemoryObjectStore::new();
        let handle = store
            .create_object_url(&ImagePayload::new("u", PNG_BYTES.to_vec()))
            .await
            .unwrap();

        store.revoke_object_url(&handle).await;
        store.revoke_object_url(&handle).await;

        assert!(store.resolve(&handle).is_none());
        assert!(store.is_empty());
    }
}
