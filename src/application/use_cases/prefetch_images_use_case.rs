//! Batch image loading use case.

use futures_util::future::join_all;
use tracing::{debug, info, warn};

use crate::application::dto::{BatchSummary, ImageLoadReport};
use crate::infrastructure::image::ImageCache;

/// Loads a screen's worth of images through the shared cache.
#[derive(Debug, Clone)]
pub struct PrefetchImagesUseCase {
    cache: ImageCache,
}

impl PrefetchImagesUseCase {
    /// Creates new prefetch use case.
    #[must_use]
    pub const fn new(cache: ImageCache) -> Self {
        Self { cache }
    }

    /// Loads every URL concurrently.
    ///
    /// Returns one report per requested URL, in request order. Repeated URLs
    /// share a single fetch.
    pub async fn execute<S: AsRef<str>>(&self, urls: &[S]) -> Vec<ImageLoadReport> {
        debug!(count = urls.len(), "Loading image batch");

        let reports: Vec<ImageLoadReport> = join_all(urls.iter().map(|url| async move {
            let url = url.as_ref();
            let outcome = self.cache.load(url).await;
            if let Err(e) = &outcome {
                warn!(url, error = %e, "Image load failed");
            }
            ImageLoadReport::new(url, outcome)
        }))
        .await;

        let summary = BatchSummary::from_reports(&reports);
        info!(
            cached = summary.cached,
            joined = summary.joined,
            fetched = summary.fetched,
            failed = summary.failed,
            "Image batch loaded"
        );

        reports
    }

    /// Returns the cache this use case loads through.
    #[must_use]
    pub const fn cache(&self) -> &ImageCache {
        &self.cache
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::time::Duration;

    use crate::domain::entities::ImageSource;
    use crate::domain::ports::mocks::{MockImageFetcher, MockObjectStore};

    const AVATAR: &str = "https://cdn.example/avatar1.png";
    const LOGO: &str = "https://cdn.example/logo.png";
    const BROKEN: &str = "https://cdn.example/missing.png";

    fn use_case(fetcher: Arc<MockImageFetcher>) -> PrefetchImagesUseCase {
        let cache = ImageCache::new(fetcher, Arc::new(MockObjectStore::new()), None);
        PrefetchImagesUseCase::new(cache)
    }

    #[tokio::test]
    async fn test_reports_follow_request_order() {
        let fetcher = Arc::new(MockImageFetcher::with_delay(Duration::from_millis(10)));
        fetcher.fail_url(BROKEN);
        let use_case = use_case(fetcher.clone());

        let urls = [AVATAR, BROKEN, LOGO, AVATAR];
        let reports = use_case.execute(&urls).await;

        let requested: Vec<&str> = reports.iter().map(|r| r.url.as_str()).collect();
        assert_eq!(requested, urls);
        assert!(reports[0].is_ok());
        assert!(reports[1].error().is_some());
        assert_eq!(reports[0].handle(), reports[3].handle());
        assert_eq!(fetcher.calls_for(AVATAR), 1);
    }

    #[tokio::test]
    async fn test_summary_counts_sources() {
        let fetcher = Arc::new(MockImageFetcher::with_delay(Duration::from_millis(10)));
        fetcher.fail_url(BROKEN);
        let use_case = use_case(fetcher);

        use_case.execute(&[LOGO]).await;
        let reports = use_case.execute(&[AVATAR, AVATAR, LOGO, BROKEN]).await;

        assert_eq!(reports[1].source(), Some(ImageSource::InFlight));
        assert_eq!(
            BatchSummary::from_reports(&reports),
            BatchSummary {
                cached: 1,
                joined: 1,
                fetched: 1,
                failed: 1,
            }
        );
    }
}
