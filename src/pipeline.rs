//! Batch orchestration.
//!
//! A batch runs in four steps:
//!
//! 1. **Validate**: reject `end <= start` before any request is made
//! 2. **Fan out**: spawn one task per date; there is no concurrency cap
//! 3. **Join**: wait for every task, then drain the aggregator
//! 4. **Store**: upsert the collected records

use crate::aggregate::ResultAggregator;
use crate::dates::BatchRequest;
use crate::error::BatchError;
use crate::models::ForecastRecord;
use crate::store::ForecastStore;
use crate::worker::ForecastWorker;
use chrono::NaiveDate;
use futures::future::join_all;
use itertools::Itertools;
use std::time::Instant;
use tracing::{debug, error, info, instrument};

/// Run every date of `request` through its own worker task and return the
/// records once all of them have finished, in no particular order.
///
/// Exactly one record comes back per date: a task that aborts is replaced
/// by a "no data" record for its date.
#[instrument(level = "info", skip_all, fields(start = %request.start(), end = %request.end()))]
pub async fn collect(worker: &ForecastWorker, request: &BatchRequest) -> Vec<ForecastRecord> {
    let t0 = Instant::now();
    let aggregator = ResultAggregator::new();
    let dates: Vec<NaiveDate> = request.dates().collect();
    info!(tasks = dates.len(), "Launching forecast workers");

    let handles: Vec<_> = dates
        .iter()
        .map(|&date| {
            let worker = worker.clone();
            let sink = aggregator.sink();
            tokio::spawn(async move {
                let record = worker.process(date).await;
                sink.append(record);
            })
        })
        .collect();

    let outcomes = join_all(handles).await;
    let mut records = aggregator.finish();

    for (date, outcome) in dates.iter().zip(outcomes) {
        if let Err(e) = outcome {
            error!(%date, error = %e, "Forecast worker aborted; recording no data");
            records.push(ForecastRecord::no_data(*date, None));
        }
    }

    let no_data = records.iter().filter(|r| r.is_no_data()).count();
    debug!(
        weather_types = ?records.iter().map(|r| r.weather_type.as_str()).counts(),
        "Batch weather breakdown"
    );
    info!(
        total = records.len(),
        no_data,
        elapsed_ms = t0.elapsed().as_millis() as u64,
        "Collected forecasts"
    );
    records
}

/// Fetch, classify and store the forecasts for `[start, end)`.
///
/// # Arguments
///
/// * `worker` - Per-date worker, cloned into every task
/// * `store` - Open forecast store receiving the upserts
/// * `start` - First date of the batch
/// * `end` - Exclusive last date; must be after `start`
///
/// # Returns
///
/// One record per requested date, in no particular order. Fetch and
/// extraction failures are already folded into "no data" records.
///
/// # Errors
///
/// Returns an error if:
/// - `end <= start`, before any fetch is made
/// - The store rejects a write after collection
#[instrument(level = "info", skip(worker, store))]
pub async fn run_batch(
    worker: &ForecastWorker,
    store: &ForecastStore,
    start: NaiveDate,
    end: NaiveDate,
) -> Result<Vec<ForecastRecord>, BatchError> {
    let request = BatchRequest::new(start, end)?;
    run(worker, store, &request).await
}

pub async fn run(
    worker: &ForecastWorker,
    store: &ForecastStore,
    request: &BatchRequest,
) -> Result<Vec<ForecastRecord>, BatchError> {
    let records = collect(worker, request).await;
    store.upsert(&records).await?;
    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classify::Category;
    use crate::error::{FetchError, StoreError};
    use crate::icons::{IconSet, icon_dir_fixture};
    use crate::models::Rgb;
    use crate::scrapers::darksky::ForecastSource;
    use crate::scrapers::extract::ScriptPayloadExtractor;
    use crate::worker::testing::{StubSource, worker};
    use async_trait::async_trait;
    use chrono::Duration;
    use std::sync::Arc;
    use tokio::sync::Barrier;

    /// Holds every fetch until `n` of them are in flight at once.
    struct GatedSource {
        gate: Barrier,
    }

    #[async_trait]
    impl ForecastSource for GatedSource {
        async fn fetch(&self, date: NaiveDate) -> Result<String, FetchError> {
            self.gate.wait().await;
            Ok(format!("<script>{date}</script>"))
        }
    }

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    async fn temp_store() -> (tempfile::TempDir, ForecastStore) {
        let dir = tempfile::tempdir().unwrap();
        let store = ForecastStore::open(dir.path().join("weather.db")).await.unwrap();
        (dir, store)
    }

    #[tokio::test]
    async fn test_two_day_batch_stores_and_reads_back_both_days() {
        let icon_dir = icon_dir_fixture();
        let icons = IconSet::open(icon_dir.path()).unwrap();
        let (_db_dir, store) = temp_store().await;
        let (start, end) = (ymd(2021, 11, 7), ymd(2021, 11, 9));
        let source = Arc::new(StubSource::with_entries(&[
            (ymd(2021, 11, 7), Some("Clear"), "5.3"),
            (ymd(2021, 11, 8), Some("Light rain"), "4.9"),
        ]));

        let records = run_batch(&worker(source.clone(), &icons, start), &store, start, end)
            .await
            .unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(source.calls(), 2);
        assert_eq!(store.count().await.unwrap(), 2);

        let stored = store.query_range(start, end).await.unwrap();
        assert_eq!(stored.len(), 2);
        assert_eq!(stored[0].date, ymd(2021, 11, 7));
        assert_eq!(stored[0].weather_type, "Clear");
        assert_eq!(stored[0].color, Category::Sunny.color());
        assert_eq!(stored[0].icon_ref, icons.icon_ref(Category::Sunny));
        assert_eq!(stored[0].temperature, "5");
        assert_eq!(stored[1].weather_type, "Light rain");
        assert_eq!(stored[1].color, Category::Rainy.color());
        assert_eq!(stored[1].icon_ref, icons.icon_ref(Category::Rainy));
    }

    #[tokio::test]
    async fn test_empty_range_is_rejected_before_fetching() {
        let icon_dir = icon_dir_fixture();
        let icons = IconSet::open(icon_dir.path()).unwrap();
        let (_db_dir, store) = temp_store().await;
        let day = ymd(2021, 11, 7);
        let source = Arc::new(StubSource::default());

        let result = run_batch(&worker(source.clone(), &icons, day), &store, day, day).await;
        assert!(matches!(result, Err(BatchError::InvalidRange { .. })));
        assert_eq!(source.calls(), 0);
        assert_eq!(store.count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_far_future_date_is_stored_as_no_data() {
        let icon_dir = icon_dir_fixture();
        let icons = IconSet::open(icon_dir.path()).unwrap();
        let (_db_dir, store) = temp_store().await;
        let today = ymd(2021, 11, 7);
        let date = today + Duration::days(15);
        let source = Arc::new(StubSource::with_entries(&[(date, Some("Clear"), "2")]));

        let records = run_batch(
            &worker(source, &icons, today),
            &store,
            date,
            date + Duration::days(1),
        )
        .await
        .unwrap();

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].weather_type, "No data");
        assert_eq!(records[0].icon_ref, "");
        assert_eq!(records[0].color, Rgb(255, 255, 255));
    }

    #[tokio::test]
    async fn test_every_date_yields_exactly_one_record_even_when_fetches_fail() {
        let icon_dir = icon_dir_fixture();
        let icons = IconSet::open(icon_dir.path()).unwrap();
        let start = ymd(2021, 11, 1);
        // Only every third date has a page.
        let entries: Vec<_> = start
            .iter_days()
            .take(20)
            .step_by(3)
            .map(|d| (d, Some("Overcast"), "7.0"))
            .collect();
        let source = Arc::new(StubSource::with_entries(&entries));
        let request = BatchRequest::new(start, start + Duration::days(20)).unwrap();

        let today = start + Duration::days(10);
        let mut records = collect(&worker(source.clone(), &icons, today), &request).await;
        records.sort_by_key(|r| r.date);

        assert_eq!(source.calls(), 20);
        assert_eq!(
            records.iter().map(|r| r.date).collect::<Vec<_>>(),
            request.dates().collect::<Vec<_>>()
        );
        assert_eq!(records.iter().filter(|r| !r.is_no_data()).count(), entries.len());
    }

    #[tokio::test]
    async fn test_rerunning_a_batch_does_not_duplicate_rows() {
        let icon_dir = icon_dir_fixture();
        let icons = IconSet::open(icon_dir.path()).unwrap();
        let (_db_dir, store) = temp_store().await;
        let (start, end) = (ymd(2021, 11, 7), ymd(2021, 11, 10));
        let source = Arc::new(StubSource::with_entries(&[(start, Some("Snow"), "-1.5")]));
        let w = worker(source, &icons, start);

        run_batch(&w, &store, start, end).await.unwrap();
        run_batch(&w, &store, start, end).await.unwrap();
        assert_eq!(store.count().await.unwrap(), 3);
    }

    #[tokio::test]
    async fn test_store_failure_reaches_the_caller() {
        let icon_dir = icon_dir_fixture();
        let icons = IconSet::open(icon_dir.path()).unwrap();
        let (_db_dir, store) = temp_store().await;
        let (start, end) = (ymd(2021, 11, 7), ymd(2021, 11, 9));
        let source = Arc::new(StubSource::with_entries(&[(start, Some("Clear"), "5")]));

        store.clone().close().await;
        let result = run_batch(&worker(source.clone(), &icons, start), &store, start, end).await;

        assert!(matches!(result, Err(BatchError::Store(StoreError::Sqlx(_)))));
        assert_eq!(source.calls(), 2);
    }

    #[tokio::test]
    async fn test_every_date_is_fetched_concurrently() {
        let icon_dir = icon_dir_fixture();
        let icons = Arc::new(IconSet::open(icon_dir.path()).unwrap());
        let start = ymd(2021, 11, 1);
        let request = BatchRequest::new(start, start + Duration::days(12)).unwrap();
        let tasks = request.len() as usize;
        let worker = ForecastWorker::new(
            Arc::new(GatedSource {
                gate: Barrier::new(tasks),
            }),
            Arc::new(ScriptPayloadExtractor::default()),
            icons,
            start,
            10,
        );

        // Sequential fetches would never get past the barrier.
        let records = tokio::time::timeout(
            std::time::Duration::from_secs(10),
            collect(&worker, &request),
        )
        .await
        .expect("fetches did not all run at once");
        assert_eq!(records.len(), tasks);
        assert!(records.iter().all(|r| r.is_no_data()));
    }
}
