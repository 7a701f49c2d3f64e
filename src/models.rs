//! Data models shared by the forecast pipeline, the store and the outputs.
//!
//! - [`ForecastRecord`]: one normalized forecast per calendar date
//! - [`Rgb`]: display color bound to a weather category
//! - [`PostcardData`]: a stored record prepared for rendering

use chrono::NaiveDate;
use serde::Serialize;
use std::fmt;

/// Temperature used when no value could be scraped for a date.
pub const PLACEHOLDER_TEMPERATURE: &str = "--";

/// Weather type written for dates without a usable summary.
pub const NO_DATA_LABEL: &str = "No data";

/// A display color as three 0-255 channels.
///
/// Stored as `"r,g,b"` text in the database; everywhere else it stays
/// structured.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    pub const WHITE: Rgb = Rgb(255, 255, 255);

    /// Parse `"32,165,218"` (whitespace around channels is tolerated).
    pub fn parse(text: &str) -> Option<Rgb> {
        let mut channels = text.split(',').map(|c| c.trim().parse::<u8>());
        let rgb = match (channels.next(), channels.next(), channels.next()) {
            (Some(Ok(r)), Some(Ok(g)), Some(Ok(b))) => Rgb(r, g, b),
            _ => return None,
        };
        if channels.next().is_some() {
            return None;
        }
        Some(rgb)
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{},{}", self.0, self.1, self.2)
    }
}

/// The forecast for one calendar date, as produced by a worker and as
/// persisted by the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForecastRecord {
    pub date: NaiveDate,
    /// Raw numeric text, e.g. `"5.3"` or `"-2"`.
    pub temperature: String,
    pub weather_type: String,
    /// Path to the category icon, empty when no category applies.
    pub icon_ref: String,
    pub color: Rgb,
}

impl ForecastRecord {
    /// The fallback record every failure path converges to.
    pub fn no_data(date: NaiveDate, temperature: Option<String>) -> Self {
        Self {
            date,
            temperature: temperature.unwrap_or_else(|| PLACEHOLDER_TEMPERATURE.to_string()),
            weather_type: NO_DATA_LABEL.to_string(),
            icon_ref: String::new(),
            color: Rgb::WHITE,
        }
    }

    pub fn is_no_data(&self) -> bool {
        self.weather_type == NO_DATA_LABEL && self.icon_ref.is_empty()
    }
}

/// A stored forecast prepared for the postcard renderer.
#[derive(Debug, Clone, Serialize)]
pub struct PostcardData {
    pub weather_type: String,
    /// Human readable date, e.g. `"Sun, 7 Nov"`.
    pub date_text: String,
    pub temperature: String,
    /// Raw icon file contents; `None` when the record has no icon.
    #[serde(skip)]
    pub icon: Option<Vec<u8>>,
    pub color: Rgb,
}
