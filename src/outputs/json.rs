//! JSON postcard export.
//!
//! Each postcard is written to `{json_output_dir}/{d_mon}.json`, named
//! after the day and month of its date text (`"Sun, 7 Nov"` -> `7_nov.json`).
//! Postcards with an icon also get its bytes as `{d_mon}.png` alongside. A
//! later export for the same day replaces both files.

use crate::models::PostcardData;
use crate::utils::postcard_file_stem;
use std::error::Error;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, error, info, instrument};

/// Write every postcard as pretty JSON plus its icon, if any.
///
/// # Arguments
///
/// * `postcards` - Prepared postcards, one per date
/// * `json_output_dir` - Target directory, created when missing
///
/// # Returns
///
/// The paths of the JSON files written, in input order.
#[instrument(level = "info", skip_all, fields(json_output_dir = %json_output_dir.display()))]
pub async fn write_postcards(
    postcards: &[PostcardData],
    json_output_dir: &Path,
) -> Result<Vec<PathBuf>, Box<dyn Error>> {
    if let Err(e) = fs::create_dir_all(json_output_dir).await {
        error!(error = %e, "Failed to create JSON dir");
        return Err(e.into());
    }

    let mut written = Vec::with_capacity(postcards.len());
    for postcard in postcards {
        let stem = postcard_file_stem(&postcard.date_text);
        let json = serde_json::to_string_pretty(postcard)?;
        let path = json_output_dir.join(format!("{stem}.json"));
        fs::write(&path, json).await?;
        if let Some(icon) = &postcard.icon {
            let icon_path = json_output_dir.join(format!("{stem}.png"));
            fs::write(&icon_path, icon).await?;
            debug!(path = %icon_path.display(), bytes = icon.len(), "Wrote postcard icon");
        }
        info!(path = %path.display(), "Wrote postcard JSON");
        written.push(path);
    }

    Ok(written)
}
