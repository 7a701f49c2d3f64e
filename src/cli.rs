//! Command-line interface definitions.
//!
//! Dates are written as `yyyy-mm-dd`. Without `-f` the batch starts a week
//! before today; without `-l` it covers 17 days.

use chrono::NaiveDate;
use clap::Parser;
use std::path::PathBuf;

/// Fetch daily forecasts for a date range, store them and report them.
///
/// # Examples
///
/// ```sh
/// # Fetch and print three days
/// weather_postcards -f 2021-11-11 -l 2021-11-14 -c
///
/// # Also export postcard descriptions
/// weather_postcards -f 2021-11-11 -l 2021-11-14 -p -j ./postcards
/// ```
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// First date of the range (inclusive)
    #[arg(short = 'f', long = "first")]
    pub first_date: Option<NaiveDate>,

    /// Last date of the range (exclusive)
    #[arg(short = 'l', long = "last")]
    pub last_date: Option<NaiveDate>,

    /// Export a postcard description per date
    #[arg(short = 'p', long)]
    pub postcards: bool,

    /// Print forecasts to the console
    #[arg(short = 'c', long)]
    pub console: bool,

    /// Optional path to a YAML settings file
    #[arg(long, env = "WEATHER_CONFIG")]
    pub config: Option<PathBuf>,

    /// SQLite database file, overrides the settings file
    #[arg(long, env = "WEATHER_DATABASE")]
    pub database: Option<PathBuf>,

    /// Output directory for postcard JSON files
    #[arg(short, long, default_value = "external_data/weather_postcards")]
    pub json_output_dir: PathBuf,
}
