//! Runtime settings.
//!
//! Every field has a default, so the YAML file is optional and may set
//! only the keys it cares about:
//!
//! ```yaml
//! base_url: https://darksky.net/details
//! coordinates:
//!   lat: 59.9343
//!   lon: 30.3351
//! database_path: weather.db
//! icons_dir: external_data/weather_img
//! ```

use crate::error::ConfigError;
use serde::Deserialize;
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::{info, instrument};

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct Coordinates {
    pub lat: f64,
    pub lon: f64,
}

impl fmt::Display for Coordinates {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.lat, self.lon)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Forecast page endpoint; the request path is
    /// `{base_url}/{coordinates}/{date}/{url_suffix}`.
    pub base_url: String,
    pub coordinates: Coordinates,
    pub url_suffix: String,
    pub database_path: PathBuf,
    pub icons_dir: PathBuf,
    /// Days ahead of today for which the source still has a summary.
    pub horizon_days: i64,
    /// Local hour whose hourly entry represents the whole day.
    pub reference_hour: u32,
    pub request_timeout_secs: Option<u64>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            base_url: "https://darksky.net/details".to_string(),
            coordinates: Coordinates {
                lat: 59.9343,
                lon: 30.3351,
            },
            url_suffix: "ca24/en".to_string(),
            database_path: PathBuf::from("weather.db"),
            icons_dir: PathBuf::from("external_data/weather_img"),
            horizon_days: 10,
            reference_hour: 16,
            request_timeout_secs: None,
        }
    }
}

impl Settings {
    #[instrument(level = "info", skip_all, fields(path = %path.as_ref().display()))]
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text =
            std::fs::read_to_string(path).map_err(|e| ConfigError::Read(path.to_path_buf(), e))?;
        let settings = Self::from_yaml(&text).map_err(|e| ConfigError::Parse(path.to_path_buf(), e))?;
        info!(base_url = %settings.base_url, coordinates = %settings.coordinates, "Loaded configuration");
        Ok(settings)
    }

    pub fn from_yaml(text: &str) -> Result<Self, serde_yaml::Error> {
        serde_yaml::from_str(text)
    }

    /// Defaults when no file is given.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(path) => Self::from_file(path),
            None => Ok(Self::default()),
        }
    }
}
