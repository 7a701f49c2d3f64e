//! Date-keyed forecast storage on SQLite.
//!
//! One row per date, enforced by a `UNIQUE` constraint and written with
//! `INSERT .. ON CONFLICT(date) DO UPDATE`, so re-running a batch over the
//! same dates overwrites rather than duplicates.
//!
//! # Schema
//!
//! | Column | Type | Notes |
//! |--------|------|-------|
//! | `date` | TEXT | `YYYY-MM-DD`, unique |
//! | `temperature` | TEXT | raw scraped value, e.g. `5.3` |
//! | `weather_type` | TEXT | |
//! | `icon_path` | TEXT | empty for no data |
//! | `colors` | TEXT | `r,g,b` |

use crate::error::StoreError;
use crate::models::{ForecastRecord, Rgb};
use chrono::{Duration, NaiveDate};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use std::path::Path;
use std::time::Instant;
use tracing::{debug, info, instrument};

const CREATE_TABLE: &str = "CREATE TABLE IF NOT EXISTS forecast (\
     id INTEGER PRIMARY KEY AUTOINCREMENT, \
     date TEXT NOT NULL UNIQUE, \
     temperature TEXT NOT NULL, \
     weather_type TEXT NOT NULL, \
     icon_path TEXT NOT NULL, \
     colors TEXT NOT NULL)";

const UPSERT: &str = "INSERT INTO forecast (date, temperature, weather_type, icon_path, colors) \
     VALUES (?, ?, ?, ?, ?) \
     ON CONFLICT (date) DO UPDATE \
     SET temperature = excluded.temperature, weather_type = excluded.weather_type, \
         icon_path = excluded.icon_path, colors = excluded.colors";

const SELECT_BETWEEN: &str = "SELECT date, temperature, weather_type, icon_path, colors \
     FROM forecast WHERE date BETWEEN ? AND ? ORDER BY date";

#[derive(sqlx::FromRow)]
struct ForecastRow {
    date: NaiveDate,
    temperature: String,
    weather_type: String,
    icon_path: String,
    colors: String,
}

impl ForecastRow {
    fn into_record(self) -> Result<ForecastRecord, StoreError> {
        let color = Rgb::parse(&self.colors).ok_or(StoreError::InvalidColor(self.colors))?;
        Ok(ForecastRecord {
            date: self.date,
            temperature: truncate_temperature(&self.temperature).to_string(),
            weather_type: self.weather_type,
            icon_ref: self.icon_path,
            color,
        })
    }
}

/// Drop the fractional part: `"5.3"` -> `"5"`, `"-0.4"` -> `"-0"`.
pub fn truncate_temperature(raw: &str) -> &str {
    raw.split_once('.').map_or(raw, |(whole, _)| whole)
}

/// Inclusive date bounds actually looked up for a `[start, end)` query.
///
/// Both bounds move one day back. Older databases stored dates shifted by
/// a day-boundary offset and callers still rely on this window, so a
/// query for `[start, end)` reads `[start - 1, end - 1]`.
pub fn lookup_window(start: NaiveDate, end: NaiveDate) -> (NaiveDate, NaiveDate) {
    (start - Duration::days(1), end - Duration::days(1))
}

/// Owned handle to the forecast database.
///
/// Dropping the store releases its connections; [`ForecastStore::close`]
/// does the same but waits for them to shut down.
#[derive(Debug, Clone)]
pub struct ForecastStore {
    pool: SqlitePool,
}

impl ForecastStore {
    /// Open (creating if needed) the database file at `path`.
    #[instrument(level = "info", skip_all, fields(path = %path.as_ref().display()))]
    pub async fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let options = SqliteConnectOptions::new()
            .filename(path.as_ref())
            .create_if_missing(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(options)
            .await?;
        sqlx::query(CREATE_TABLE).execute(&pool).await?;
        info!("Forecast store ready");
        Ok(Self { pool })
    }

    /// Insert or fully overwrite one row per record.
    ///
    /// Each record is a single statement, so no partially updated row is
    /// ever visible; the batch as a whole is not transactional.
    ///
    /// # Arguments
    ///
    /// * `records` - Records to write, keyed by their date
    ///
    /// # Returns
    ///
    /// The number of rows SQLite reports as affected.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Sqlx`] on the first failed write; earlier rows
    /// of the same call stay written.
    #[instrument(level = "info", skip_all, fields(count = records.len()))]
    pub async fn upsert(&self, records: &[ForecastRecord]) -> Result<u64, StoreError> {
        let t0 = Instant::now();
        let mut affected = 0;
        for record in records {
            let res = sqlx::query(UPSERT)
                .bind(record.date)
                .bind(&record.temperature)
                .bind(&record.weather_type)
                .bind(&record.icon_ref)
                .bind(record.color.to_string())
                .execute(&self.pool)
                .await?;
            affected += res.rows_affected();
            debug!(date = %record.date, weather_type = %record.weather_type, "Upserted forecast");
        }
        info!(affected, elapsed_ms = t0.elapsed().as_millis() as u64, "Stored forecasts");
        Ok(affected)
    }

    /// Records for the `[start, end)` query, ordered by date.
    ///
    /// See [`lookup_window`] for the bounds actually applied.
    ///
    /// # Arguments
    ///
    /// * `start` - First requested date
    /// * `end` - Exclusive last requested date
    ///
    /// # Returns
    ///
    /// Stored records with temperatures truncated to their integer part.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The query fails
    /// - A stored color is not a valid `r,g,b` triple
    #[instrument(level = "info", skip_all, fields(%start, %end))]
    pub async fn query_range(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<ForecastRecord>, StoreError> {
        let (from, to) = lookup_window(start, end);
        let rows: Vec<ForecastRow> = sqlx::query_as(SELECT_BETWEEN)
            .bind(from)
            .bind(to)
            .fetch_all(&self.pool)
            .await?;
        debug!(%from, %to, count = rows.len(), "Queried forecasts");
        rows.into_iter().map(ForecastRow::into_record).collect()
    }

    pub async fn count(&self) -> Result<i64, StoreError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM forecast")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    pub async fn close(self) {
        self.pool.close().await;
    }
}
