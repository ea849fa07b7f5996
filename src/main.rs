// src/main.rs

use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use watchbot::{Config, Database};
use watchbot::platforms::telegram::TelegramPlatform;
use watchbot::repositories::sqlite::{SqliteAccountRepository, SqliteObservationRepository};
use watchbot::services::{RateLimiter, StatusFetcher, Tracker};

/// Command-line arguments
#[derive(Parser, Debug)]
#[command(name = "watchbot")]
#[command(author, version, about = "WatchBot - periodic presence tracker for Telegram accounts")]
struct Args {
    /// Path to the JSON configuration file
    #[arg(long, default_value = "config.json")]
    config: PathBuf,
}

fn init_tracing(level: &str) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level.to_string()));
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .expect("Failed to set global default subscriber");
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();

    let args = Args::parse();
    let config = Config::load(&args.config)?;

    init_tracing(&config.logging.level);
    info!("WatchBot starting; config = {}", args.config.display());

    let db = Database::new(&config.database.path).await?;
    let accounts = SqliteAccountRepository::new(db.pool().clone());
    let observations = SqliteObservationRepository::new(db.pool().clone());

    let mut platform = TelegramPlatform::new(&config.telegram)?;
    platform.connect().await?;

    let limiter = RateLimiter::new(config.rate_limiting.max_requests_per_second)?;
    let fetcher = StatusFetcher::new(platform, limiter);

    let tracker = Tracker::new(
        db,
        fetcher,
        accounts,
        observations,
        config.tracking.account_ids.clone(),
        Duration::from_secs(config.tracking.check_interval_secs),
    );

    // Ctrl-C drives the orderly shutdown; the in-flight cycle finishes first.
    {
        let tracker = tracker.clone();
        tokio::spawn(async move {
            if let Err(e) = tokio::signal::ctrl_c().await {
                error!("Failed to listen for Ctrl-C: {:?}", e);
                return;
            }
            info!("Ctrl-C detected, stopping tracker...");
            tracker.stop();
        });
    }

    tracker.start().await?;
    info!("WatchBot has finished. Goodbye!");

    Ok(())
}
