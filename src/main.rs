//! # Banner Watch
//!
//! Checks the top of one or more web pages for promotional offers and
//! countdown timers, and reports what it found to Telegram and email.
//!
//! ## Features
//!
//! - Cheap HTTP fetch of the banner regions of each page
//! - Headless Chromium fallback for pages that draw their banners with JavaScript
//! - Fixed English/Spanish offer and countdown patterns with surrounding context
//! - One report per target, delivered to every configured channel
//!
//! ## Usage
//!
//! ```sh
//! WATCH_URLS=https://shop.example/ TELEGRAM_TOKEN=... TELEGRAM_CHAT_ID=... banner_watch
//! banner_watch -u https://shop.example/ -u https://other.example/ --no-render
//! ```
//!
//! ## Architecture
//!
//! Each run is a single cycle:
//! 1. **Basic tier**: fetch HTML and read header, hero, and promo regions
//! 2. **Rendered tier**: only when the basic text matched nothing
//! 3. **Matching**: offer patterns, then countdown patterns
//! 4. **Notify**: compose a report and fan it out to the configured channels
//!
//! Scheduling is left to cron or a systemd timer.

use clap::Parser;
use std::error::Error;
use tracing::{debug, error, info, instrument, warn};
use tracing_subscriber::{EnvFilter, fmt as tfmt};

mod checker;
mod cli;
mod config;
mod error;
mod models;
mod notify;
mod patterns;
mod scrapers;
#[cfg(test)]
mod test_support;
mod utils;

use checker::{Checker, CycleOptions};
use cli::Cli;
use config::Config;
use notify::Dispatcher;
use scrapers::{BasicExtractor, RenderedExtractor};

#[tokio::main]
#[instrument]
async fn main() -> Result<(), Box<dyn Error>> {
    // Credentials usually live in a local .env; real env vars win.
    dotenvy::dotenv().ok();

    // --- Tracing init ---
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tfmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .init();

    let start_time = std::time::Instant::now();
    info!("banner_watch starting up");

    let args = Cli::parse();
    debug!(urls = ?args.urls, config = ?args.config, "Parsed CLI arguments");

    let config = Config::from_cli(&args)?;
    info!(
        targets = config.targets.len(),
        render = config.render.enabled,
        notify_when_empty = config.notify_when_empty,
        "Configuration loaded"
    );

    if config.render.enabled && !RenderedExtractor::available() {
        warn!("Rendered fallback requested but this build has no browser support");
    }

    let checker = Checker::new(
        BasicExtractor::new(&config.fetch)?,
        RenderedExtractor::new(config.render.clone()),
    );
    let dispatcher = Dispatcher::from_config(&config)?;
    let options = CycleOptions {
        notify_when_empty: config.notify_when_empty,
        subject_prefix: config.subject_prefix.clone(),
    };

    let report = checker
        .run_cycle(&config.targets, &dispatcher, &options)
        .await;

    if !report.any_completed() {
        error!(
            failed = report.failed,
            "No target could be checked this cycle"
        );
    }

    let elapsed = start_time.elapsed();
    info!(
        ?elapsed,
        secs = elapsed.as_secs(),
        millis = elapsed.subsec_millis(),
        completed = report.completed,
        failed = report.failed,
        with_offers = report.offers_found(),
        "Execution complete"
    );

    Ok(())
}
