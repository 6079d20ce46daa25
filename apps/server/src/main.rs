//! Wallet Watch - Headless Server
//!
//! Polls exchange wallet status for one asset and tells Telegram subscribers
//! when it changes.

mod config;

use clap::Parser;
use config::{AppConfig, ConfigError, BOT_TOKEN_ENV};
use std::sync::Arc;
use std::time::Duration;
use teloxide::Bot;
use thiserror::Error;
use tracing::{error, info, warn, Level};
use tracing_subscriber::FmtSubscriber;

use wallet_watch_alerts::{
    CommandRouter, Database, DbError, Notifier, TelegramBot, TelegramTransport,
};
use wallet_watch_engine::{Poller, StateTracker};
use wallet_watch_feeds::{FetchError, HttpStatusClient, StatusSource};

/// Wallet Watch CLI
#[derive(Parser, Debug)]
#[command(name = "wallet-watch")]
#[command(about = "Exchange wallet status watcher with Telegram alerts", long_about = None)]
struct Args {
    /// Configuration file path
    #[arg(short, long, default_value = "config.json")]
    config: String,

    /// Subscriber database file
    #[arg(short, long, default_value = "bot.db")]
    database: String,

    /// Log level: trace, debug, info, warn, error
    #[arg(short, long, default_value = "info")]
    log_level: String,
}

#[derive(Error, Debug)]
enum StartupError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("Failed to open subscriber database: {0}")]
    Database(#[from] DbError),
    #[error("Failed to build HTTP client: {0}")]
    Client(#[from] FetchError),
}

fn parse_level(level: &str) -> Level {
    match level {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    }
}

fn init_logging(level: &str) {
    let subscriber = FmtSubscriber::builder()
        .with_max_level(parse_level(level))
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .compact()
        .finish();

    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {e}");
    }
}

/// Turn a plain file path into a SQLite connection URL.
fn database_url(path: &str) -> String {
    if path.starts_with("sqlite:") {
        path.to_string()
    } else {
        format!("sqlite:{path}")
    }
}

async fn run(args: Args) -> Result<(), StartupError> {
    let config = AppConfig::load(&args.config)?;
    let token = config.resolve_token(std::env::var(BOT_TOKEN_ENV).ok())?;

    info!("  Tracked asset: {}", config.asset.ticker);
    info!("  Poll interval: {}s", config.poll_interval().as_secs());
    info!("  Database: {}", args.database);

    let db = Database::connect(&database_url(&args.database)).await?;
    info!("  Subscribers: {}", db.count().await?);

    let bot = Bot::new(token);
    let transport = Arc::new(TelegramTransport::new(bot.clone()));
    let notifier = Arc::new(Notifier::new(db, transport));
    let tracker = Arc::new(StateTracker::new(config.asset.clone(), notifier.clone()));

    let source: Arc<dyn StatusSource> = Arc::new(HttpStatusClient::new(
        config.asset.clone(),
        &config.client_config(),
    )?);
    let poller = Poller::start(source, tracker.clone(), config.poll_interval());

    let router = Arc::new(CommandRouter::new(notifier, tracker));
    let telegram = Arc::new(TelegramBot::new(bot, router));
    let bot_handle = tokio::spawn(telegram.run());

    info!("Press Ctrl+C to stop...");

    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for Ctrl+C: {}", e);
    }

    warn!("Shutdown signal received");
    poller.shutdown().await;

    // The dispatcher has its own Ctrl+C handler
    if tokio::time::timeout(Duration::from_secs(2), bot_handle)
        .await
        .is_err()
    {
        warn!("Telegram dispatcher did not stop in time");
    }

    Ok(())
}

#[tokio::main]
async fn main() {
    // Load .env file if present
    let _ = dotenvy::dotenv();

    let args = Args::parse();

    init_logging(&args.log_level);

    info!("Wallet Watch starting...");

    if let Err(e) = run(args).await {
        error!("{}", e);
        std::process::exit(1);
    }

    info!("Wallet Watch stopped");
}
