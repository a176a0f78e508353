//! Fetch-once image cache.
//!
//! Each source URL is fetched at most once at a time. Callers that arrive
//! while a fetch is running await the same shared result, and a successful
//! result stays cached until [`ImageCache::cleanup`] runs.

use std::collections::HashMap;
use std::num::NonZeroUsize;
use std::panic::AssertUnwindSafe;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, OnceLock};

use futures_util::future::{BoxFuture, FutureExt, Shared};
use lru::LruCache;
use parking_lot::Mutex;
use tracing::{debug, info, trace, warn};

use crate::domain::entities::{ImageSource, LoadedImage, ObjectUrl};
use crate::domain::errors::{CacheError, CacheResult};
use crate::domain::ports::{ImageFetchPort, ObjectUrlPort};

use super::config::{ImageCacheConfig, ObjectStoreKind};
use super::file_store::FileObjectStore;
use super::http_fetcher::HttpImageFetcher;
use super::memory_store::MemoryObjectStore;

type PendingLoad = Shared<BoxFuture<'static, CacheResult<ObjectUrl>>>;

static GLOBAL: OnceLock<ImageCache> = OnceLock::new();

/// Installs the process-wide cache instance.
///
/// # Errors
/// Returns [`CacheError::AlreadyInitialized`] if an instance is already installed.
pub fn init_global(cache: ImageCache) -> CacheResult<&'static ImageCache> {
    GLOBAL
        .set(cache)
        .map_err(|_| CacheError::AlreadyInitialized)?;
    GLOBAL
        .get()
        .ok_or_else(|| CacheError::internal("global image cache missing after init"))
}

/// Returns the process-wide cache, if one was installed.
#[must_use]
pub fn global() -> Option<&'static ImageCache> {
    GLOBAL.get()
}

struct CacheState {
    entries: LruCache<String, ObjectUrl>,
    in_flight: HashMap<String, PendingLoad>,
}

#[derive(Default)]
struct Counters {
    hits: AtomicU64,
    misses: AtomicU64,
    joins: AtomicU64,
    failures: AtomicU64,
}

/// Image cache keyed by source URL.
///
/// Clones share the same entries, so a clone can be handed to every
/// component that renders remote images.
#[derive(Clone)]
pub struct ImageCache {
    fetcher: Arc<dyn ImageFetchPort>,
    store: Arc<dyn ObjectUrlPort>,
    state: Arc<Mutex<CacheState>>,
    counters: Arc<Counters>,
}

impl std::fmt::Debug for ImageCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ImageCache")
            .field("stats", &self.stats())
            .finish_non_exhaustive()
    }
}

impl ImageCache {
    /// Creates a cache over the given ports.
    ///
    /// `max_entries` of `None` (or zero) keeps every entry until cleanup;
    /// otherwise the least recently used handle is evicted and revoked.
    #[must_use]
    pub fn new(
        fetcher: Arc<dyn ImageFetchPort>,
        store: Arc<dyn ObjectUrlPort>,
        max_entries: Option<usize>,
    ) -> Self {
        let entries = max_entries
            .and_then(NonZeroUsize::new)
            .map_or_else(LruCache::unbounded, LruCache::new);

        Self {
            fetcher,
            store,
            state: Arc::new(Mutex::new(CacheState {
                entries,
                in_flight: HashMap::new(),
            })),
            counters: Arc::new(Counters::default()),
        }
    }

    /// Builds the HTTP fetcher and configured object store, then the cache.
    ///
    /// # Errors
    /// Returns error if the HTTP client or the store directory cannot be created.
    pub async fn from_config(config: &ImageCacheConfig) -> CacheResult<Self> {
        let fetcher = Arc::new(HttpImageFetcher::new(config)?);
        let store: Arc<dyn ObjectUrlPort> = match config.store {
            ObjectStoreKind::Memory => Arc::new(MemoryObjectStore::new()),
            ObjectStoreKind::File => {
                Arc::new(FileObjectStore::new(config.effective_store_dir()).await?)
            }
        };

        debug!(store = %config.store, max_entries = ?config.max_entries, "Image cache created");
        Ok(Self::new(fetcher, store, config.max_entries))
    }

    /// Returns the cached handle for `url` without fetching.
    /// Does not affect eviction order or statistics.
    #[must_use]
    pub fn get_cached(&self, url: &str) -> Option<ObjectUrl> {
        self.state.lock().entries.peek(url).cloned()
    }

    /// Returns true if a fetch for `url` is currently running.
    #[must_use]
    pub fn is_loading(&self, url: &str) -> bool {
        self.state.lock().in_flight.contains_key(url)
    }

    /// Returns a handle for `url`, fetching it if nobody has yet.
    ///
    /// # Errors
    /// Returns the fetch or storage failure shared by every caller of this attempt.
    pub async fn load_and_cache(&self, url: &str) -> CacheResult<ObjectUrl> {
        self.load(url).await.map(|loaded| loaded.handle)
    }

    /// Like [`Self::load_and_cache`], also reporting where the handle came from.
    ///
    /// # Errors
    /// Returns the fetch or storage failure shared by every caller of this attempt.
    pub async fn load(&self, url: &str) -> CacheResult<LoadedImage> {
        let (pending, source) = {
            let mut state = self.state.lock();

            if let Some(handle) = state.entries.get(url).cloned() {
                self.counters.hits.fetch_add(1, Ordering::Relaxed);
                trace!(url, "Image cache hit");
                return Ok(LoadedImage {
                    url: url.to_string(),
                    handle,
                    source: ImageSource::Cache,
                });
            }

            if let Some(pending) = state.in_flight.get(url) {
                self.counters.joins.fetch_add(1, Ordering::Relaxed);
                trace!(url, "Joining in-flight image fetch");
                (pending.clone(), ImageSource::InFlight)
            } else {
                self.counters.misses.fetch_add(1, Ordering::Relaxed);
                let pending = self.spawn_fetch(url.to_string());
                state.in_flight.insert(url.to_string(), pending.clone());
                (pending, ImageSource::Network)
            }
        };

        let handle = pending.await?;
        Ok(LoadedImage {
            url: url.to_string(),
            handle,
            source,
        })
    }

    /// Starts loading every URL in the background.
    /// Failures are logged and otherwise dropped.
    pub fn prefetch<I, S>(&self, urls: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for url in urls {
            let url = url.into();
            let cache = self.clone();
            tokio::spawn(async move {
                if let Err(e) = cache.load_and_cache(&url).await {
                    debug!(url = %url, error = %e, "Image prefetch failed");
                }
            });
        }
    }

    /// Revokes every cached handle and empties the cache.
    ///
    /// Fetches already running are left alone and will repopulate the cache
    /// when they finish. Handles returned earlier are invalid afterwards.
    pub async fn cleanup(&self) {
        let released: Vec<ObjectUrl> = {
            let mut state = self.state.lock();
            let mut handles = Vec::with_capacity(state.entries.len());
            while let Some((_, handle)) = state.entries.pop_lru() {
                handles.push(handle);
            }
            handles
        };

        for handle in &released {
            self.store.revoke_object_url(handle).await;
        }

        info!(count = released.len(), "Released cached image handles");
    }

    /// Returns the number of cached images.
    #[must_use]
    pub fn len(&self) -> usize {
        self.state.lock().entries.len()
    }

    /// Returns true if nothing is cached.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns the number of fetches currently running.
    #[must_use]
    pub fn pending_count(&self) -> usize {
        self.state.lock().in_flight.len()
    }

    /// Returns cache statistics.
    #[must_use]
    pub fn stats(&self) -> CacheStats {
        let (entries, in_flight) = {
            let state = self.state.lock();
            (state.entries.len(), state.in_flight.len())
        };
        CacheStats {
            hits: self.counters.hits.load(Ordering::Relaxed),
            misses: self.counters.misses.load(Ordering::Relaxed),
            joins: self.counters.joins.load(Ordering::Relaxed),
            failures: self.counters.failures.load(Ordering::Relaxed),
            entries,
            in_flight,
        }
    }

    /// Spawns the fetch so it runs to completion even if every caller goes away.
    fn spawn_fetch(&self, url: String) -> PendingLoad {
        let task = {
            let cache = self.clone();
            let url = url.clone();
            tokio::spawn(async move {
                let attempt = AssertUnwindSafe(cache.clone().fetch_and_store(url.clone()))
                    .catch_unwind()
                    .await;
                attempt.unwrap_or_else(|_| {
                    cache.abandon(&url, "image fetch panicked");
                    Err(CacheError::internal("image fetch panicked"))
                })
            })
        };

        let cache = self.clone();
        async move {
            task.await.unwrap_or_else(|e| {
                cache.abandon(&url, "image fetch task did not complete");
                Err(CacheError::internal(format!("image fetch task failed: {e}")))
            })
        }
        .boxed()
        .shared()
    }

    /// Clears the in-flight marker of a fetch that ended without a result.
    fn abandon(&self, url: &str, reason: &str) {
        self.state.lock().in_flight.remove(url);
        self.counters.failures.fetch_add(1, Ordering::Relaxed);
        warn!(url, reason, "Image fetch abandoned");
    }

    async fn fetch_and_store(self, url: String) -> CacheResult<ObjectUrl> {
        debug!(url = %url, "Fetching image");

        let result = match self.fetcher.fetch(&url).await {
            Ok(payload) => self.store.create_object_url(&payload).await,
            Err(e) => Err(e),
        };

        // Marker removal and entry insertion must share one critical section.
        let displaced = {
            let mut state = self.state.lock();
            state.in_flight.remove(&url);
            match &result {
                Ok(handle) => state.entries.push(url.clone(), handle.clone()),
                Err(_) => None,
            }
        };

        match &result {
            Ok(handle) => debug!(url = %url, handle = %handle, "Image cached"),
            Err(e) => {
                self.counters.failures.fetch_add(1, Ordering::Relaxed);
                warn!(url = %url, error = %e, "Image fetch failed");
            }
        }

        if let Some((evicted_url, evicted)) = displaced
            && result.as_ref().ok() != Some(&evicted)
        {
            debug!(url = %evicted_url, handle = %evicted, "Evicting image handle");
            self.store.revoke_object_url(&evicted).await;
        }

        result
    }
}

/// Statistics about cache behaviour.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheStats {
    /// Loads answered from the cache.
    pub hits: u64,
    /// Loads that started a network fetch.
    pub misses: u64,
    /// Loads that joined a fetch already running.
    pub joins: u64,
    /// Fetch attempts that failed.
    pub failures: u64,
    /// Current number of cached images.
    pub entries: usize,
    /// Current number of running fetches.
    pub in_flight: usize,
}

impl std::fmt::Display for CacheStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Cache: {} images, {} hits, {} fetches, {} joined, {} failed, {} loading",
            self.entries, self.hits, self.misses, self.joins, self.failures, self.in_flight
        )
    }
}
