use super::app_config::LogLevel;
use crate::infrastructure::image::ObjectStoreKind;
use clap::Parser;
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(
    name = "baltek-images",
    version,
    about = "Fetch job board images once and hand out local handles",
    long_about = None
)]
pub struct CliArgs {
    /// Image URLs to load.
    #[arg(required = true, value_name = "URL")]
    pub urls: Vec<String>,

    /// Configuration file path.
    #[arg(short, long, value_name = "PATH", env = "BALTEK_CONFIG")]
    pub config: Option<PathBuf>,

    /// Log file path.
    #[arg(long, value_name = "PATH", env = "BALTEK_LOG_PATH")]
    pub log_path: Option<PathBuf>,

    /// Log verbosity level.
    #[arg(long, value_enum, env = "BALTEK_LOG_LEVEL")]
    pub log_level: Option<LogLevel>,

    /// Maximum number of cached images.
    #[arg(long, env = "BALTEK_MAX_CACHED_IMAGES")]
    pub max_entries: Option<usize>,

    /// Request timeout in seconds.
    #[arg(long, value_name = "SECS", env = "BALTEK_IMAGE_TIMEOUT")]
    pub timeout: Option<u64>,

    /// Handle backend.
    #[arg(long, value_enum, env = "BALTEK_IMAGE_STORE")]
    pub store: Option<ObjectStoreKind>,

    /// Directory for the file backend.
    #[arg(long, value_name = "PATH", env = "BALTEK_IMAGE_STORE_DIR")]
    pub store_dir: Option<PathBuf>,

    /// Keep cached handles instead of releasing them on exit.
    #[arg(long)]
    pub keep: bool,
}
