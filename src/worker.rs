//! Per-date forecast worker.

use crate::classify::{Category, classify};
use crate::icons::IconSet;
use crate::models::ForecastRecord;
use crate::scrapers::darksky::ForecastSource;
use crate::scrapers::extract::FieldExtractor;
use crate::utils::truncate_for_log;
use chrono::NaiveDate;
use std::sync::Arc;
use tracing::{debug, instrument, warn};

/// Fetches, extracts and classifies the forecast for one date.
///
/// Cheap to clone; every batch task gets its own copy.
#[derive(Clone)]
pub struct ForecastWorker {
    source: Arc<dyn ForecastSource>,
    extractor: Arc<dyn FieldExtractor>,
    icons: Arc<IconSet>,
    /// The day the batch runs; the horizon is measured from here.
    today: NaiveDate,
    horizon_days: i64,
}

impl ForecastWorker {
    pub fn new(
        source: Arc<dyn ForecastSource>,
        extractor: Arc<dyn FieldExtractor>,
        icons: Arc<IconSet>,
        today: NaiveDate,
        horizon_days: i64,
    ) -> Self {
        Self {
            source,
            extractor,
            icons,
            today,
            horizon_days,
        }
    }

    /// Whether the source is expected to have a usable summary for `date`.
    pub fn within_horizon(&self, date: NaiveDate) -> bool {
        (date - self.today).num_days() < self.horizon_days
    }

    /// Produce the record for `date`.
    ///
    /// # Arguments
    ///
    /// * `date` - The calendar date to fetch and classify
    ///
    /// # Returns
    ///
    /// A classified record, or a "no data" record when the page cannot be
    /// fetched or parsed, the date is past the horizon, or the summary is
    /// missing or unmatched. Failures are logged at `warn`.
    #[instrument(level = "info", skip_all, fields(%date))]
    pub async fn process(&self, date: NaiveDate) -> ForecastRecord {
        let content = match self.source.fetch(date).await {
            Ok(content) => content,
            Err(e) => {
                warn!(error = %e, "Forecast fetch failed; recording no data");
                return ForecastRecord::no_data(date, None);
            }
        };

        let fields = match self.extractor.extract(&content, date) {
            Ok(fields) => fields,
            Err(e) => {
                warn!(
                    error = %e,
                    page_preview = %truncate_for_log(&content, 200),
                    "Forecast extraction failed; recording no data"
                );
                return ForecastRecord::no_data(date, None);
            }
        };

        if !self.within_horizon(date) {
            debug!(horizon_days = self.horizon_days, "Date beyond forecast horizon");
            return ForecastRecord::no_data(date, Some(fields.temperature));
        }

        let Some(summary) = fields.summary else {
            debug!("Forecast entry has no summary");
            return ForecastRecord::no_data(date, Some(fields.temperature));
        };

        match classify(&summary) {
            Category::NoData => {
                debug!(%summary, "Summary matched no weather category");
                ForecastRecord::no_data(date, Some(fields.temperature))
            }
            category => {
                debug!(%summary, category = category.label(), "Classified forecast");
                ForecastRecord {
                    date,
                    temperature: fields.temperature,
                    weather_type: summary,
                    icon_ref: self.icons.icon_ref(category),
                    color: category.color(),
                }
            }
        }
    }
}


#[cfg(test)]
mod tests {
    use super::testing::{StubSource, worker};
    use super::*;
    use crate::icons::icon_dir_fixture;
    use crate::models::Rgb;
    use chrono::Duration;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[tokio::test]
    async fn test_classified_record_keeps_scraped_summary() {
        let dir = icon_dir_fixture();
        let icons = IconSet::open(dir.path()).unwrap();
        let date = ymd(2021, 11, 7);
        let source = Arc::new(StubSource::with_entries(&[(date, Some("Partly Cloudy"), "9.4")]));

        let record = worker(source, &icons, date).process(date).await;
        assert_eq!(record.weather_type, "Partly Cloudy");
        assert_eq!(record.temperature, "9.4");
        assert_eq!(record.color, Rgb(105, 105, 105));
        assert_eq!(record.icon_ref, icons.icon_ref(Category::Cloudy));
        assert!(std::path::Path::new(&record.icon_ref).is_file());
    }

    #[tokio::test]
    async fn test_fetch_failure_becomes_no_data() {
        let dir = icon_dir_fixture();
        let icons = IconSet::open(dir.path()).unwrap();
        let date = ymd(2021, 11, 7);
        let source = Arc::new(StubSource::default());

        let record = worker(source.clone(), &icons, date).process(date).await;
        assert_eq!(record, ForecastRecord::no_data(date, None));
        assert_eq!(source.calls(), 1);
    }

    #[tokio::test]
    async fn test_extraction_failure_becomes_no_data() {
        let dir = icon_dir_fixture();
        let icons = IconSet::open(dir.path()).unwrap();
        let date = ymd(2021, 11, 7);
        let source = Arc::new(StubSource::with_page(date, "<html>maintenance</html>".into()));

        let record = worker(source, &icons, date).process(date).await;
        assert!(record.is_no_data());
        assert_eq!(record.color, Rgb::WHITE);
    }

    #[tokio::test]
    async fn test_beyond_horizon_is_no_data_regardless_of_content() {
        let dir = icon_dir_fixture();
        let icons = IconSet::open(dir.path()).unwrap();
        let today = ymd(2021, 11, 7);
        let date = today + Duration::days(15);
        let source = Arc::new(StubSource::with_entries(&[(date, Some("Clear"), "3.1")]));

        let record = worker(source, &icons, today).process(date).await;
        assert_eq!(record.weather_type, "No data");
        assert_eq!(record.icon_ref, "");
        assert_eq!(record.color, Rgb(255, 255, 255));
        assert_eq!(record.temperature, "3.1");
    }

    #[tokio::test]
    async fn test_horizon_boundary() {
        let dir = icon_dir_fixture();
        let icons = IconSet::open(dir.path()).unwrap();
        let today = ymd(2021, 11, 7);
        let w = worker(Arc::new(StubSource::default()), &icons, today);
        assert!(w.within_horizon(today + Duration::days(9)));
        assert!(!w.within_horizon(today + Duration::days(10)));
        assert!(w.within_horizon(today - Duration::days(7)));
    }

    #[tokio::test]
    async fn test_unmatched_summary_is_no_data() {
        let dir = icon_dir_fixture();
        let icons = IconSet::open(dir.path()).unwrap();
        let date = ymd(2021, 11, 7);
        let source = Arc::new(StubSource::with_entries(&[(date, Some("Humid"), "21")]));

        let record = worker(source, &icons, date).process(date).await;
        assert_eq!(record, ForecastRecord::no_data(date, Some("21".into())));
    }
}
