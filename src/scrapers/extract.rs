//! Field extraction from forecast pages.
//!
//! The forecast page does not expose an API response; its hourly data is
//! embedded in `<script>` payloads as a run of objects such as
//!
//! ```text
//! {"time":1636290000,"summary":"Clear","icon":"clear-day","temperature":5.3, ...},{"time":...
//! ```
//!
//! The entry for a date is the one whose `time` is the Unix timestamp of
//! that date at the reference hour (16:00 local). The search window starts
//! at that timestamp and ends at the next `"time"` key.

use crate::error::ExtractError;
use chrono::{Local, NaiveDate, TimeZone};
use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{Html, Selector};
use tracing::{debug, instrument};

static SCRIPT_SELECTOR: Lazy<Selector> = Lazy::new(|| Selector::parse("script").unwrap());
static TEMPERATURE_FIELD: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#""temperature":\s*(-?\d+(?:\.\d+)?)"#).unwrap());
static SUMMARY_FIELD: Lazy<Regex> = Lazy::new(|| Regex::new(r#""summary":\s*"([^"]*)""#).unwrap());

/// Fields scraped for a single date.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedFields {
    /// Numeric text exactly as found, e.g. `"5.3"`.
    pub temperature: String,
    /// `None` when the entry has no summary or it is blank.
    pub summary: Option<String>,
}

pub trait FieldExtractor: Send + Sync {
    fn extract(&self, content: &str, date: NaiveDate) -> Result<ExtractedFields, ExtractError>;
}

/// Timestamp-anchored search over the page's script payloads.
#[derive(Debug, Clone, Copy)]
pub struct ScriptPayloadExtractor {
    reference_hour: u32,
}

impl Default for ScriptPayloadExtractor {
    fn default() -> Self {
        Self { reference_hour: 16 }
    }
}

impl ScriptPayloadExtractor {
    pub fn new(reference_hour: u32) -> Self {
        Self { reference_hour }
    }

    /// Unix timestamp of `date` at the reference hour in local time.
    pub fn anchor_timestamp(&self, date: NaiveDate) -> Option<i64> {
        let naive = date.and_hms_opt(self.reference_hour, 0, 0)?;
        Local
            .from_local_datetime(&naive)
            .earliest()
            .map(|dt| dt.timestamp())
    }
}

/// Concatenated text of every `<script>` element in the page.
fn script_payload(content: &str) -> String {
    let document = Html::parse_document(content);
    document
        .select(&SCRIPT_SELECTOR)
        .map(|script| script.text().collect::<String>())
        .collect::<Vec<_>>()
        .join("\n")
}

/// The slice between the anchor timestamp and the next `"time"` key.
fn anchored_segment(payload: &str, timestamp: i64) -> Option<&str> {
    let anchor = Regex::new(&format!(
        r#"(?s)\b{}\b(.*?)(?:"time"|$)"#,
        regex::escape(&timestamp.to_string())
    ))
    .ok()?;
    anchor
        .captures(payload)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}

impl FieldExtractor for ScriptPayloadExtractor {
    #[instrument(level = "debug", skip_all, fields(%date, bytes = content.len()))]
    fn extract(&self, content: &str, date: NaiveDate) -> Result<ExtractedFields, ExtractError> {
        let timestamp = self
            .anchor_timestamp(date)
            .ok_or(ExtractError::InvalidDate { date })?;

        let payload = script_payload(content);
        let segment = anchored_segment(&payload, timestamp)
            .ok_or(ExtractError::AnchorNotFound { date, timestamp })?;

        let temperature = TEMPERATURE_FIELD
            .captures(segment)
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str().to_string())
            .ok_or(ExtractError::MissingTemperature { date })?;

        let summary = SUMMARY_FIELD
            .captures(segment)
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str().trim().to_string())
            .filter(|s| !s.is_empty());

        debug!(%temperature, ?summary, "Extracted forecast fields");
        Ok(ExtractedFields {
            temperature,
            summary,
        })
    }
}

/// A minimal forecast page with one hourly entry per `(date, summary, temperature)`.
#[cfg(test)]
pub(crate) fn forecast_page(
    extractor: &ScriptPayloadExtractor,
    entries: &[(NaiveDate, Option<&str>, &str)],
) -> String {
    let hours: Vec<String> = entries
        .iter()
        .map(|(date, summary, temperature)| {
            let ts = extractor.anchor_timestamp(*date).unwrap();
            match summary {
                Some(summary) => format!(
                    r#"{{"time":{ts},"summary":"{summary}","icon":"x","temperature":{temperature},"humidity":0.8}}"#
                ),
                None => format!(r#"{{"time":{ts},"icon":"x","temperature":{temperature}}}"#),
            }
        })
        .collect();
    format!(
        "<html><head><script>var unrelated = 1;</script></head><body>\
         <script>var hours = [{}];</script></body></html>",
        hours.join(",")
    )
}
