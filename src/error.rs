//! Error types for every stage of a forecast batch.
//!
//! Fetch and extraction errors never leave a [`crate::worker::ForecastWorker`];
//! they are logged and folded into a "no data" record. Batch, store and
//! configuration errors propagate to `main`.

use chrono::NaiveDate;
use std::path::PathBuf;
use thiserror::Error;

/// A single forecast page could not be downloaded.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("network request failed for {0}")]
    Transport(String, #[source] reqwest::Error),

    #[error("request to {url} returned status {status}")]
    Status {
        url: String,
        status: reqwest::StatusCode,
    },

    #[error("could not build forecast url")]
    InvalidUrl(#[from] url::ParseError),
}

/// The downloaded page did not contain usable fields for the requested date.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ExtractError {
    #[error("no payload entry anchored at timestamp {timestamp} for {date}")]
    AnchorNotFound { date: NaiveDate, timestamp: i64 },

    #[error("payload entry for {date} has no temperature field")]
    MissingTemperature { date: NaiveDate },

    #[error("{date} has no unambiguous local reference time")]
    InvalidDate { date: NaiveDate },
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Sqlx(#[from] sqlx::Error),

    #[error("stored color '{0}' is not a comma separated RGB triple")]
    InvalidColor(String),
}

#[derive(Debug, Error)]
pub enum BatchError {
    #[error("batch end {end} must be strictly after start {start}")]
    InvalidRange { start: NaiveDate, end: NaiveDate },

    #[error(transparent)]
    Store(#[from] StoreError),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file '{0}'")]
    Read(PathBuf, #[source] std::io::Error),

    #[error("failed to parse config file '{0}'")]
    Parse(PathBuf, #[source] serde_yaml::Error),

    #[error("weather icon '{0}' does not exist")]
    MissingIcon(PathBuf),

    #[error("invalid forecast base url '{0}'")]
    InvalidBaseUrl(String, #[source] url::ParseError),

    #[error("failed to build http client")]
    HttpClient(#[source] reqwest::Error),
}
