//! # Weather Postcards
//!
//! Collects daily weather forecasts for a date range, classifies each one
//! into a small set of postcard categories and keeps them in a date-keyed
//! SQLite store, then reports the stored range.
//!
//! ## Usage
//!
//! ```sh
//! weather_postcards -f 2021-11-07 -l 2021-11-09 -c
//! ```
//!
//! ## Architecture
//!
//! 1. **Fetching**: one concurrent task per date downloads the forecast page
//! 2. **Extraction**: temperature and summary are pulled from the page's scripts
//! 3. **Classification**: the summary picks an icon and a color
//! 4. **Storage**: every date is upserted once all tasks have joined
//! 5. **Output**: the stored range is printed and/or exported as JSON

use chrono::Local;
use clap::Parser;
use std::error::Error;
use std::sync::Arc;
use tracing::{debug, error, info, instrument};
use tracing_subscriber::{EnvFilter, fmt as tfmt};

mod aggregate;
mod classify;
mod cli;
mod config;
mod dates;
mod error;
mod icons;
mod models;
mod outputs;
mod pipeline;
mod scrapers;
mod store;
mod utils;
mod worker;

use cli::Cli;
use config::Settings;
use dates::BatchRequest;
use icons::IconSet;
use outputs::{console, json};
use scrapers::darksky::DarkSkySource;
use scrapers::extract::ScriptPayloadExtractor;
use store::ForecastStore;
use utils::ensure_writable_dir;
use worker::ForecastWorker;

#[tokio::main]
#[instrument]
async fn main() -> Result<(), Box<dyn Error>> {
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
    info!("weather_postcards starting up");

    let args = Cli::parse();
    debug!(?args, "Parsed CLI arguments");

    let mut settings = Settings::load(args.config.as_deref())?;
    if let Some(database) = args.database.clone() {
        settings.database_path = database;
    }

    let today = Local::now().date_naive();
    let request = BatchRequest::from_bounds(args.first_date, args.last_date, today)?;
    info!(start = %request.start(), end = %request.end(), days = request.len(), "Batch requested");

    if args.postcards {
        if let Err(e) = ensure_writable_dir(&args.json_output_dir).await {
            error!(
                path = %args.json_output_dir.display(),
                error = %e,
                "JSON output directory is not writable (fix perms or choose a different path)"
            );
            return Err(e);
        }
    }

    let icons = Arc::new(IconSet::open(&settings.icons_dir)?);
    let worker = ForecastWorker::new(
        Arc::new(DarkSkySource::from_settings(&settings)?),
        Arc::new(ScriptPayloadExtractor::new(settings.reference_hour)),
        icons,
        today,
        settings.horizon_days,
    );

    let store = ForecastStore::open(&settings.database_path).await?;
    let outcome = run(&worker, &store, &request, &args).await;
    store.close().await;
    outcome?;

    let elapsed = start_time.elapsed();
    info!(
        ?elapsed,
        secs = elapsed.as_secs(),
        millis = elapsed.subsec_millis(),
        "Execution complete"
    );
    Ok(())
}

/// Everything that needs the open store, so it is closed on every path.
async fn run(
    worker: &ForecastWorker,
    store: &ForecastStore,
    request: &BatchRequest,
    args: &Cli,
) -> Result<(), Box<dyn Error>> {
    pipeline::run_batch(worker, store, request.start(), request.end()).await?;
    info!(rows = store.count().await?, "Forecast store updated");

    let stored = store.query_range(request.start(), request.end()).await?;
    let postcards = outputs::prepare_postcards(stored).await;

    if args.console {
        console::print_forecasts(&postcards);
    }

    if args.postcards {
        let written = json::write_postcards(&postcards, &args.json_output_dir).await?;
        info!(count = written.len(), "Postcards exported");
    }

    Ok(())
}
