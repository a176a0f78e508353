//! Image cache configuration.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

const DEFAULT_USER_AGENT: &str = concat!("baltek-jobs/", env!("CARGO_PKG_VERSION"));

/// Backend that turns fetched bytes into local handles.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ObjectStoreKind {
    /// Keep blobs in process memory.
    #[default]
    Memory,
    /// Write blobs to files under the store directory.
    File,
}

impl std::fmt::Display for ObjectStoreKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Memory => write!(f, "memory"),
            Self::File => write!(f, "file"),
        }
    }
}

/// Configuration for the image cache.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImageCacheConfig {
    /// Maximum cached images; unbounded when unset.
    #[serde(default)]
    pub max_entries: Option<usize>,

    /// Request timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub request_timeout_secs: u64,

    /// User agent sent with image requests.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Handle backend.
    #[serde(default)]
    pub store: ObjectStoreKind,

    /// Directory for the file backend.
    #[serde(default)]
    pub store_dir: Option<PathBuf>,
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_user_agent() -> String {
    DEFAULT_USER_AGENT.to_string()
}

impl Default for ImageCacheConfig {
    fn default() -> Self {
        Self {
            max_entries: None,
            request_timeout_secs: default_timeout_secs(),
            user_agent: default_user_agent(),
            store: ObjectStoreKind::default(),
            store_dir: None,
        }
    }
}

impl ImageCacheConfig {
    /// Returns the file backend directory, falling back to the platform cache dir.
    #[must_use]
    pub fn effective_store_dir(&self) -> PathBuf {
        self.store_dir.clone().unwrap_or_else(default_store_dir)
    }
}

fn default_store_dir() -> PathBuf {
    directories::ProjectDirs::from("net", "baltek", "baltek-jobs").map_or_else(
        || std::env::temp_dir().join("baltek-jobs").join("images"),
        |dirs| dirs.cache_dir().join("images"),
    )
}
