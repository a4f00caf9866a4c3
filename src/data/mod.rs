//! Core data models for Sunrank
//!
//! This module contains the data types that flow through the pipeline:
//! configured locations, raw forecasts as delivered by the forecast source,
//! and the per-location summaries produced from them.

pub mod cities;
pub mod yandex;

pub use cities::{all_locations, get_city_by_key, CITIES};
pub use yandex::{FetchError, ForecastSource, YandexClient};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A location whose forecast takes part in the ranking
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Location {
    /// Configuration key of the location (e.g. "MOSCOW")
    pub name: String,
    /// URL the forecast for this location is fetched from
    pub url: String,
}

impl Location {
    pub fn new(name: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            url: url.into(),
        }
    }
}

/// One location's full forecast response
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawForecast {
    /// Locality name reported by the forecast source
    pub city: String,
    /// Per-day forecasts in chronological order
    pub forecasts: Vec<ForecastDay>,
}

/// Forecast for a single day
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastDay {
    /// Date of the forecast (YYYY-MM-DD)
    pub date: String,
    /// Hourly records; may be empty or partial for days at the forecast horizon
    #[serde(default)]
    pub hours: Vec<HourRecord>,
}

/// A single hourly record within a day
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HourRecord {
    /// Hour of day as delivered by the source ("0" through "23")
    pub hour: String,
    /// Temperature in Celsius
    pub temp: f64,
    /// Sky condition code (e.g. "clear", "light-rain")
    pub condition: String,
}

/// A raw forecast tagged with the configured location it was fetched for
#[derive(Debug, Clone, PartialEq)]
pub struct FetchedForecast {
    /// Configuration key of the location
    pub location: String,
    pub forecast: RawForecast,
}

/// Statistics for one qualifying day
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DaySummary {
    pub date: NaiveDate,
    /// Number of daytime hours without precipitation
    pub no_rain_hours: u32,
    /// Average daytime temperature, rounded to one decimal place
    pub avg_temp_per_day: f64,
}

/// Per-location statistical digest used for ranking
///
/// Field names match the persisted result artifact verbatim.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocationSummary {
    pub city: String,
    /// One entry per qualifying day, chronological
    pub stats: Vec<DaySummary>,
    pub avg_temp_all_days: f64,
    pub avg_no_rain_hours: f64,
}
