//! Port definition for fetching remote images.

use async_trait::async_trait;

use crate::domain::entities::ImagePayload;
use crate::domain::errors::CacheResult;

/// Port for downloading an image body.
/// Implementations must be thread-safe.
#[async_trait]
pub trait ImageFetchPort: Send + Sync {
    /// Fetches `url`, failing on transport errors and non-success statuses.
    async fn fetch(&self, url: &str) -> CacheResult<ImagePayload>;
}
