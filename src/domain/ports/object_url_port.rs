//! Port definition for turning fetched bytes into local image handles.

use async_trait::async_trait;

use crate::domain::entities::{ImagePayload, ObjectUrl};
use crate::domain::errors::CacheResult;

/// Port for creating and releasing locally addressable image handles.
/// Implementations must be thread-safe.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ObjectUrlPort: Send + Sync {
    /// Stores the payload and returns a fresh handle for it.
    async fn create_object_url(&self, payload: &ImagePayload) -> CacheResult<ObjectUrl>;

    /// Releases the resource behind `handle`.
    /// Unknown or already released handles are ignored.
    async fn revoke_object_url(&self, handle: &ObjectUrl);

    /// Returns the number of live handles.
    fn len(&self) -> usize;

    /// Returns true if no handles are live.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
pub mod mock {
    use super::*;
    use std::collections::HashSet;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use parking_lot::Mutex;

    /// Store that hands out numbered handles and records revocations.
    #[derive(Default)]
    pub struct MockObjectStore {
        next: AtomicUsize,
        live: Mutex<HashSet<ObjectUrl>>,
        revoked: Mutex<Vec<ObjectUrl>>,
    }

    impl MockObjectStore {
        /// Creates an empty store.
        pub fn new() -> Self {
            Self::default()
        }

        /// Handles revoked so far, in order.
        pub fn revoked(&self) -> Vec<ObjectUrl> {
            self.revoked.lock().clone()
        }

        /// Returns true if `handle` was created and not yet revoked.
        pub fn is_live(&self, handle: &ObjectUrl) -> bool {
            self.live.lock().contains(handle)
        }
    }

    #[async_trait]
    impl ObjectUrlPort for MockObjectStore {
        async fn create_object_url(&self, _payload: &ImagePayload) -> CacheResult<ObjectUrl> {
            let n = self.next.fetch_add(1, Ordering::SeqCst);
            let handle = ObjectUrl::new(format!("blob:mock/{n}"));
            self.live.lock().insert(handle.clone());
            Ok(handle)
        }

        async fn revoke_object_url(&self, handle: &ObjectUrl) {
            if self.live.lock().remove(handle) {
                self.revoked.lock().push(handle.clone());
            }
        }

        fn len(&self) -> usize {
            self.live.lock().len()
        }
    }
}
