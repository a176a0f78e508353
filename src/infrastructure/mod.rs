//! Infrastructure layer with external service adapters.

/// Application configuration.
pub mod config;
/// Image fetching, caching, and local handles.
pub mod image;

pub use config::{AppConfig, CliArgs, ConfigError, LogLevel, StorageManager};
pub use image::{
    Blob, CacheStats, FileObjectStore, HttpImageFetcher, ImageCache, ImageCacheConfig,
    MemoryObjectStore, ObjectStoreKind, global, init_global,
};
