//! Dark Sky forecast page source.
//!
//! # URL Pattern
//!
//! One page per date and location:
//! `https://darksky.net/details/59.9343,30.3351/2021-11-07/ca24/en`

use crate::config::{Coordinates, Settings};
use crate::dates::DATE_FORMAT;
use crate::error::{ConfigError, FetchError};
use async_trait::async_trait;
use chrono::NaiveDate;
use std::time::Duration;
use tracing::{debug, instrument};
use url::Url;

/// Where raw forecast pages come from.
#[async_trait]
pub trait ForecastSource: Send + Sync {
    /// Download the forecast page for `date`. No retries.
    async fn fetch(&self, date: NaiveDate) -> Result<String, FetchError>;
}

#[derive(Debug, Clone)]
pub struct DarkSkySource {
    http: reqwest::Client,
    /// Always ends with `/` so relative joins append instead of replace.
    base: Url,
    coordinates: Coordinates,
    suffix: String,
}

impl DarkSkySource {
    pub fn from_settings(settings: &Settings) -> Result<Self, ConfigError> {
        let base_text = format!("{}/", settings.base_url.trim_end_matches('/'));
        let base = Url::parse(&base_text)
            .map_err(|e| ConfigError::InvalidBaseUrl(settings.base_url.clone(), e))?;

        let mut builder = reqwest::Client::builder();
        if let Some(secs) = settings.request_timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        let http = builder.build().map_err(ConfigError::HttpClient)?;

        Ok(Self {
            http,
            base,
            coordinates: settings.coordinates,
            suffix: settings.url_suffix.trim_matches('/').to_string(),
        })
    }

    pub fn url_for(&self, date: NaiveDate) -> Result<Url, url::ParseError> {
        self.base.join(&format!(
            "{}/{}/{}",
            self.coordinates,
            date.format(DATE_FORMAT),
            self.suffix
        ))
    }
}

#[async_trait]
impl ForecastSource for DarkSkySource {
    #[instrument(level = "debug", skip_all, fields(%date))]
    async fn fetch(&self, date: NaiveDate) -> Result<String, FetchError> {
        let url = self.url_for(date)?;
        let response = self
            .http
            .get(url.clone())
            .send()
            .await
            .map_err(|e| FetchError::Transport(url.to_string(), e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status,
            });
        }

        let body = response
            .text()
            .await
            .map_err(|e| FetchError::Transport(url.to_string(), e))?;
        debug!(bytes = body.len(), %url, "Fetched forecast page");
        Ok(body)
    }
}
