//! Forecast acquisition.
//!
//! Acquisition is split in two so the parsing strategy can change without
//! touching the network side:
//!
//! 1. **Fetching** ([`darksky`]): one HTTP request per date, returning the raw
//!    forecast page.
//! 2. **Extraction** ([`extract`]): locate the hourly entry for the date inside
//!    the page's embedded script payloads and pull out the temperature and
//!    the weather summary.
//!
//! Both halves sit behind traits ([`darksky::ForecastSource`] and
//! [`extract::FieldExtractor`]) that the worker holds as trait objects.

pub mod darksky;
pub mod extract;
