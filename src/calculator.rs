//! Per-location forecast statistics
//!
//! Turns one location's raw forecast into a `LocationSummary`. Only daytime
//! hours (09:00 through 19:00) are considered, and a day only counts when all
//! eleven of them are present.

use chrono::NaiveDate;
use thiserror::Error;

use crate::data::{DaySummary, ForecastDay, LocationSummary, RawForecast};

/// First daytime hour (inclusive)
pub const DAYTIME_START: u8 = 9;

/// Last daytime hour (inclusive)
pub const DAYTIME_END: u8 = 19;

/// Number of in-range records a day needs to qualify
pub const REQUIRED_HOURS: u32 = 11;

/// Daily temperature sums are always divided by the full daytime length,
/// not by the number of records that were summed.
const DAYTIME_DIVISOR: f64 = 11.0;

/// Sky conditions that count as a no-rain hour
pub const NO_RAIN_CONDITIONS: [&str; 4] = ["clear", "partly-cloudy", "cloudy", "overcast"];

/// Errors that can occur while summarizing a forecast
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CalcError {
    /// A field of the raw forecast holds a value that cannot be interpreted
    #[error("Invalid value in field {field}: {value:?}")]
    Validation { field: String, value: String },

    /// Not a single day had enough daytime records
    #[error("No qualifying days in forecast for {city}")]
    NoQualifyingDays { city: String },
}

/// Running totals for the daytime hours of one day
#[derive(Debug, Default)]
struct DayTally {
    hours: u32,
    no_rain_hours: u32,
    temp_sum: f64,
}

/// Rounds to one decimal place, halves away from zero
pub fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// Whether a sky condition code counts as dry
pub fn is_no_rain(condition: &str) -> bool {
    NO_RAIN_CONDITIONS.contains(&condition)
}

/// Parses an hour-of-day string, accepting only 0 through 23
fn parse_hour(raw: &str) -> Option<u8> {
    raw.trim().parse::<u8>().ok().filter(|hour| *hour <= 23)
}

fn tally_day(day_index: usize, day: &ForecastDay) -> Result<DayTally, CalcError> {
    let mut tally = DayTally::default();

    for (hour_index, record) in day.hours.iter().enumerate() {
        let hour = parse_hour(&record.hour).ok_or_else(|| CalcError::Validation {
            field: format!("forecasts[{}].hours[{}].hour", day_index, hour_index),
            value: record.hour.clone(),
        })?;

        if (DAYTIME_START..=DAYTIME_END).contains(&hour) {
            tally.hours += 1;
            tally.temp_sum += record.temp;
            if is_no_rain(&record.condition) {
                tally.no_rain_hours += 1;
            }
        }
    }

    Ok(tally)
}

/// Summarizes one location's forecast
///
/// # Returns
/// * `Ok(LocationSummary)` with one `DaySummary` per qualifying day
/// * `Err(CalcError::Validation)` if an hour or date field is malformed
/// * `Err(CalcError::NoQualifyingDays)` if no day has enough daytime records
pub fn summarize(raw: &RawForecast) -> Result<LocationSummary, CalcError> {
    let mut stats = Vec::new();

    for (day_index, day) in raw.forecasts.iter().enumerate() {
        let date = NaiveDate::parse_from_str(&day.date, "%Y-%m-%d").map_err(|_| {
            CalcError::Validation {
                field: format!("forecasts[{}].date", day_index),
                value: day.date.clone(),
            }
        })?;

        let tally = tally_day(day_index, day)?;
        if tally.hours < REQUIRED_HOURS {
            continue;
        }

        stats.push(DaySummary {
            date,
            no_rain_hours: tally.no_rain_hours,
            avg_temp_per_day: round1(tally.temp_sum / DAYTIME_DIVISOR),
        });
    }

    if stats.is_empty() {
        return Err(CalcError::NoQualifyingDays {
            city: raw.city.clone(),
        });
    }

    let days = stats.len() as f64;
    let temp_total: f64 = stats.iter().map(|day| day.avg_temp_per_day).sum();
    let no_rain_total: u32 = stats.iter().map(|day| day.no_rain_hours).sum();

    Ok(LocationSummary {
        city: raw.city.clone(),
        stats,
        avg_temp_all_days: round1(temp_total / days),
        avg_no_rain_hours: round1(f64::from(no_rain_total) / days),
    })
}
