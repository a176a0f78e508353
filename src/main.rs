use std::process::ExitCode;

use clap::Parser;
use color_eyre::eyre::{Result, WrapErr};
use tracing::{debug, info};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use baltek_jobs::application::{ImageLoadReport, PrefetchImagesUseCase};
use baltek_jobs::infrastructure::{AppConfig, CliArgs, ImageCache, StorageManager, init_global};

fn init_logging(config: &AppConfig) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.log_level.to_string()));

    if let Some(log_path) = &config.log_path {
        if let Some(parent) = log_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(log_path)?;

        let file_layer = fmt::layer()
            .with_writer(file)
            .with_ansi(false)
            .with_target(true)
            .with_thread_ids(false);

        tracing_subscriber::registry()
            .with(filter)
            .with(file_layer)
            .init();

        info!(path = %log_path.display(), "Logging initialized");
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().with_writer(std::io::stderr))
            .init();
    }

    Ok(())
}

fn load_config(args: &CliArgs) -> Result<AppConfig> {
    let storage = StorageManager::new().wrap_err("failed to locate config directory")?;
    let mut config = storage
        .load_config(args.config.as_deref())
        .wrap_err("failed to load configuration")?;
    config.merge_with_args(args);
    Ok(config)
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    color_eyre::install()?;
    dotenvy::dotenv().ok();

    let args = CliArgs::parse();
    let config = load_config(&args)?;
    init_logging(&config)?;

    info!(version = baltek_jobs::VERSION, "Starting {}", baltek_jobs::NAME);
    debug!(path = ?config.effective_config_path(), ?config, "Effective configuration");

    let cache = ImageCache::from_config(&config.images)
        .await
        .wrap_err("failed to build image cache")?;
    let cache = init_global(cache)?;

    let reports = PrefetchImagesUseCase::new(cache.clone())
        .execute(&args.urls)
        .await;

    for report in &reports {
        match &report.outcome {
            Ok(loaded) => println!("{}\t{}\t{}", report.url, loaded.source, loaded.handle),
            Err(e) => println!("{}\terror\t{e}", report.url),
        }
    }
    println!("{}", cache.stats());

    if args.keep {
        info!(count = cache.len(), "Keeping cached image handles");
    } else {
        cache.cleanup().await;
    }

    Ok(if reports.iter().all(ImageLoadReport::is_ok) {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}
