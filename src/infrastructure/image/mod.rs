//! Image handling infrastructure.
//!
//! This module provides:
//! - The fetch-once image cache with in-flight de-duplication
//! - HTTP fetching of image bodies
//! - Memory and file backends for local image handles

pub mod cache;
pub mod config;
pub mod file_store;
pub mod http_fetcher;
pub mod memory_store;

pub use cache::{CacheStats, ImageCache, global, init_global};
pub use config::{ImageCacheConfig, ObjectStoreKind};
pub use file_store::FileObjectStore;
pub use http_fetcher::HttpImageFetcher;
pub use memory_store::{Blob, MemoryObjectStore};
