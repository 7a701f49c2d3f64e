//! Plain text forecast report.

use crate::models::PostcardData;

pub fn forecast_line(postcard: &PostcardData) -> String {
    format!(
        "On {} weather is {}, {} degrees",
        postcard.date_text,
        postcard.weather_type.to_lowercase(),
        postcard.temperature
    )
}

pub fn print_forecasts(postcards: &[PostcardData]) {
    for postcard in postcards {
        println!("{}", forecast_line(postcard));
    }
}
