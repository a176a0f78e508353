//! HTTP image fetcher.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, header};
use tracing::{debug, trace};

use crate::domain::entities::ImagePayload;
use crate::domain::errors::{CacheError, CacheResult};
use crate::domain::ports::ImageFetchPort;

use super::config::ImageCacheConfig;

/// Downloads image bodies with `reqwest`.
#[derive(Debug, Clone)]
pub struct HttpImageFetcher {
    client: Client,
}

impl HttpImageFetcher {
    /// Creates a fetcher using the configured timeout and user agent.
    ///
    /// # Errors
    /// Returns error if HTTP client creation fails.
    pub fn new(config: &ImageCacheConfig) -> CacheResult<Self> {
        let client = Client::builder()
            .user_agent(&config.user_agent)
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .map_err(|e| CacheError::internal(format!("failed to create HTTP client: {e}")))?;

        Ok(Self { client })
    }

    /// Wraps an existing client.
    #[must_use]
    pub const fn with_client(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl ImageFetchPort for HttpImageFetcher {
    async fn fetch(&self, url: &str) -> CacheResult<ImagePayload> {
        trace!(url, "Requesting image");

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| CacheError::network(format!("request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(CacheError::http(
                status.as_u16(),
                status.canonical_reason().unwrap_or("Unknown"),
            ));
        }

        let content_type = response
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(String::from);

        let bytes = response
            .bytes()
            .await
            .map_err(|e| CacheError::network(format!("failed to read body: {e}")))?;

        debug!(url, size = bytes.len(), content_type = ?content_type, "Image downloaded");

        let payload = ImagePayload::new(url, bytes);
        Ok(match content_type {
            Some(ct) => payload.with_content_type(ct),
            None => payload,
        })
    }
}
