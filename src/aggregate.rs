//! Fan-in of worker results for one batch.
//!
//! Workers push through a cloned [`RecordSink`]; nothing is shared but the
//! channel, so no lock is needed. The collected records are only reachable
//! through [`ResultAggregator::finish`], which consumes the aggregator and is
//! called by the orchestrator after every worker has been joined.

use crate::models::ForecastRecord;
use tokio::sync::mpsc;
use tracing::{debug, error};

#[derive(Debug, Clone)]
pub struct RecordSink {
    tx: mpsc::UnboundedSender<ForecastRecord>,
}

impl RecordSink {
    pub fn append(&self, record: ForecastRecord) {
        let date = record.date;
        if self.tx.send(record).is_err() {
            // Only possible if the aggregator was finished before this worker.
            error!(%date, "Result aggregator closed; record dropped");
        }
    }
}

#[derive(Debug)]
pub struct ResultAggregator {
    tx: mpsc::UnboundedSender<ForecastRecord>,
    rx: mpsc::UnboundedReceiver<ForecastRecord>,
}

impl Default for ResultAggregator {
    fn default() -> Self {
        Self::new()
    }
}

impl ResultAggregator {
    pub fn new() -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self { tx, rx }
    }

    pub fn sink(&self) -> RecordSink {
        RecordSink {
            tx: self.tx.clone(),
        }
    }

    /// Drain everything appended so far, in arrival order.
    pub fn finish(self) -> Vec<ForecastRecord> {
        let Self { tx, mut rx } = self;
        drop(tx);
        let mut records = Vec::new();
        while let Ok(record) = rx.try_recv() {
            records.push(record);
        }
        debug!(count = records.len(), "Aggregated batch results");
        records
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[tokio::test]
    async fn test_collects_one_record_per_concurrent_append() {
        let aggregator = ResultAggregator::new();
        let start = NaiveDate::from_ymd_opt(2021, 11, 1).unwrap();

        let handles: Vec<_> = start
            .iter_days()
            .take(32)
            .map(|date| {
                let sink = aggregator.sink();
                tokio::spawn(async move {
                    tokio::task::yield_now().await;
                    sink.append(ForecastRecord::no_data(date, None));
                })
            })
            .collect();
        for handle in futures::future::join_all(handles).await {
            handle.unwrap();
        }

        let mut dates: Vec<_> = aggregator.finish().into_iter().map(|r| r.date).collect();
        dates.sort();
        assert_eq!(dates, start.iter_days().take(32).collect::<Vec<_>>());
    }

    #[test]
    fn test_finish_on_empty_aggregator() {
        assert!(ResultAggregator::new().finish().is_empty());
    }
}
