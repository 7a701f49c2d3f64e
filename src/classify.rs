//! Weather summary classification.
//!
//! Summaries are matched case-insensitively against four pattern families
//! in a fixed priority order; the first family with any match wins.
//!
//! | Category | Patterns | Label | Icon | Color |
//! |----------|----------|-------|------|-------|
//! | Sunny | `clear`, `sun` | Clear | `sun.png` | 32,165,218 |
//! | Rainy | `drizzle`, `rain` | Possible light rain | `rain.png` | 225,105,65 |
//! | Snowy | `snow` | Light snow | `snow.png` | 235,206,135 |
//! | Cloudy | `overcast`, `cloud`, `foggy` | Foggy | `cloud.png` | 105,105,105 |
//! | NoData | anything else | No data | none | 255,255,255 |

use crate::models::{NO_DATA_LABEL, Rgb};
use once_cell::sync::Lazy;
use regex::Regex;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    Sunny,
    Rainy,
    Snowy,
    Cloudy,
    NoData,
}

static SUNNY_PATTERN: Lazy<Regex> = Lazy::new(|| Regex::new(r"clear|sun").unwrap());
static RAINY_PATTERN: Lazy<Regex> = Lazy::new(|| Regex::new(r"drizzle|rain").unwrap());
static SNOWY_PATTERN: Lazy<Regex> = Lazy::new(|| Regex::new(r"snow").unwrap());
static CLOUDY_PATTERN: Lazy<Regex> = Lazy::new(|| Regex::new(r"overcast|cloud|foggy").unwrap());

impl Category {
    /// Every category, in classification priority order.
    pub const ALL: [Category; 5] = [
        Category::Sunny,
        Category::Rainy,
        Category::Snowy,
        Category::Cloudy,
        Category::NoData,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Category::Sunny => "Clear",
            Category::Rainy => "Possible light rain",
            Category::Snowy => "Light snow",
            Category::Cloudy => "Foggy",
            Category::NoData => NO_DATA_LABEL,
        }
    }

    /// Icon file name inside the icons directory; `None` for [`Category::NoData`].
    pub fn icon_file(self) -> Option<&'static str> {
        match self {
            Category::Sunny => Some("sun.png"),
            Category::Rainy => Some("rain.png"),
            Category::Snowy => Some("snow.png"),
            Category::Cloudy => Some("cloud.png"),
            Category::NoData => None,
        }
    }

    pub fn color(self) -> Rgb {
        match self {
            Category::Sunny => Rgb(32, 165, 218),
            Category::Rainy => Rgb(225, 105, 65),
            Category::Snowy => Rgb(235, 206, 135),
            Category::Cloudy => Rgb(105, 105, 105),
            Category::NoData => Rgb::WHITE,
        }
    }

    fn pattern(self) -> Option<&'static Regex> {
        match self {
            Category::Sunny => Some(&*SUNNY_PATTERN),
            Category::Rainy => Some(&*RAINY_PATTERN),
            Category::Snowy => Some(&*SNOWY_PATTERN),
            Category::Cloudy => Some(&*CLOUDY_PATTERN),
            Category::NoData => None,
        }
    }
}

/// Classify a free-text weather summary.
///
/// Empty or unmatched text is [`Category::NoData`].
pub fn classify(summary: &str) -> Category {
    let lowered = summary.to_lowercase();
    Category::ALL
        .into_iter()
        .find(|category| category.pattern().is_some_and(|p| p.is_match(&lowered)))
        .unwrap_or(Category::NoData)
}
