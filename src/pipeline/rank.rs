//! Rank stage - picks the city with the most favorable weather.

use std::cmp::Ordering;

use tracing::{debug, info};

use super::queue::QueueConsumer;
use super::PipelineError;
use crate::data::LocationSummary;

/// Orders summaries best-first
///
/// More no-rain hours wins; equal no-rain hours fall back to the warmer
/// average. Summaries tied on both keep their relative input order.
pub fn rank(summaries: &[LocationSummary]) -> Vec<&LocationSummary> {
    let mut ordered: Vec<&LocationSummary> = summaries.iter().collect();
    ordered.sort_by(|a, b| compare(b, a));
    ordered
}

/// Ascending comparison by (avg_no_rain_hours, avg_temp_all_days)
fn compare(a: &LocationSummary, b: &LocationSummary) -> Ordering {
    a.avg_no_rain_hours
        .total_cmp(&b.avg_no_rain_hours)
        .then_with(|| a.avg_temp_all_days.total_cmp(&b.avg_temp_all_days))
}

/// Collects every published summary and reduces them to a winner
#[derive(Debug, Default)]
pub struct RankStage;

impl RankStage {
    pub fn new() -> Self {
        Self
    }

    /// Drains `input` until end-of-stream and returns the winning city
    pub async fn run(
        &self,
        mut input: QueueConsumer<LocationSummary>,
    ) -> Result<String, PipelineError> {
        info!("Ranking locations");
        let summaries = input.drain().await?;

        let ordered = rank(&summaries);
        for (place, summary) in ordered.iter().enumerate() {
            debug!(
                place = place + 1,
                city = %summary.city,
                avg_no_rain_hours = summary.avg_no_rain_hours,
                avg_temp_all_days = summary.avg_temp_all_days,
                "Leaderboard"
            );
        }

        let winner = ordered.first().ok_or(PipelineError::EmptyResult)?;
        info!(winner = %winner.city, candidates = summaries.len(), "Finished ranking");
        Ok(winner.city.clone())
    }
}
