//! Output generation for stored forecasts.
//!
//! Stored records are first turned into [`PostcardData`] (formatted date,
//! icon bytes loaded), then handed to one of the writers:
//!
//! - [`console`]: one human readable line per date
//! - [`json`]: one postcard description file per date, plus a copy of its
//!   icon when it has one
//!
//! ```text
//! json_output_dir/
//! ├── 7_nov.json
//! ├── 7_nov.png
//! └── 8_nov.json
//! ```

pub mod console;
pub mod json;

use crate::dates::format_postcard_date;
use crate::models::{ForecastRecord, PostcardData};
use tokio::fs;
use tracing::{instrument, warn};

/// Prepare a stored record for rendering.
///
/// An icon that can no longer be read is logged and rendered without.
pub async fn postcard_data(record: ForecastRecord) -> PostcardData {
    let icon = if record.icon_ref.is_empty() {
        None
    } else {
        match fs::read(&record.icon_ref).await {
            Ok(bytes) => Some(bytes),
            Err(e) => {
                warn!(path = %record.icon_ref, error = %e, "Failed to read weather icon");
                None
            }
        }
    };

    PostcardData {
        weather_type: record.weather_type,
        date_text: format_postcard_date(record.date),
        temperature: record.temperature,
        icon,
        color: record.color,
    }
}

#[instrument(level = "info", skip_all, fields(count = records.len()))]
pub async fn prepare_postcards(records: Vec<ForecastRecord>) -> Vec<PostcardData> {
    let mut postcards = Vec::with_capacity(records.len());
    for record in records {
        postcards.push(postcard_data(record).await);
    }
    postcards
}
