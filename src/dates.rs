//! Date ranges and batch bounds.

use crate::error::BatchError;
use chrono::{Duration, NaiveDate};

/// `2021-10-15`
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// `Sun, 7 Nov`
pub const POSTCARD_DATE_FORMAT: &str = "%a, %-d %b";

/// Days covered after today when no end date is given.
pub const DEFAULT_DAYS_AHEAD: i64 = 10;

/// Days covered before today when no start date is given.
pub const DEFAULT_DAYS_BEHIND: i64 = 7;

/// `count` consecutive dates starting at `start`.
///
/// The returned iterator is lazy and `Clone`, so it can be replayed; a
/// non-positive `count` yields nothing.
pub fn generate(start: NaiveDate, count: i64) -> impl Iterator<Item = NaiveDate> + Clone {
    start.iter_days().take(count.max(0) as usize)
}

pub fn format_postcard_date(date: NaiveDate) -> String {
    date.format(POSTCARD_DATE_FORMAT).to_string()
}

/// The half-open interval `[start, end)` a batch fetches and stores.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatchRequest {
    start: NaiveDate,
    end: NaiveDate,
}

impl BatchRequest {
    /// Rejects `end <= start`; an empty or inverted batch is a caller bug.
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self, BatchError> {
        if end <= start {
            return Err(BatchError::InvalidRange { start, end });
        }
        Ok(Self { start, end })
    }

    /// Fills missing bounds with the default window: one week back from
    /// `today`, spanning `DEFAULT_DAYS_BEHIND + DEFAULT_DAYS_AHEAD` days.
    pub fn from_bounds(
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
        today: NaiveDate,
    ) -> Result<Self, BatchError> {
        let start = start.unwrap_or(today - Duration::days(DEFAULT_DAYS_BEHIND));
        let end =
            end.unwrap_or(start + Duration::days(DEFAULT_DAYS_BEHIND + DEFAULT_DAYS_AHEAD));
        Self::new(start, end)
    }

    pub fn start(&self) -> NaiveDate {
        self.start
    }

    pub fn end(&self) -> NaiveDate {
        self.end
    }

    pub fn len(&self) -> i64 {
        (self.end - self.start).num_days()
    }

    pub fn dates(&self) -> impl Iterator<Item = NaiveDate> + Clone {
        generate(self.start, self.len())
    }
}
