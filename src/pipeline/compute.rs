//! Compute stage - summarizes fetched forecasts on a worker pool.
//!
//! Each forecast is handed to a blocking worker, since the calculation is pure
//! CPU work. Results are collected in completion order into a set owned by the
//! running stage, the whole set is persisted once, and then every summary is
//! republished for the rank stage, followed by end-of-stream.

use std::sync::Arc;

use tokio::sync::Semaphore;
use tokio::task::{spawn_blocking, JoinSet};
use tracing::{debug, error, info, warn};

use super::queue::{QueueConsumer, QueueProducer};
use super::PipelineError;
use crate::calculator::{summarize, CalcError};
use crate::data::{FetchedForecast, LocationSummary, RawForecast};
use crate::storage::ResultStore;

/// Default pool size: one core is left to the coordinating runtime
pub fn default_workers() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1)
        .saturating_sub(1)
        .max(1)
}

/// Outcome counts of one compute run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ComputeReport {
    pub summarized: usize,
    pub failed: usize,
}

type WorkerOutput = (String, Result<LocationSummary, CalcError>);

/// Function a worker runs on each forecast
type Summarizer = fn(&RawForecast) -> Result<LocationSummary, CalcError>;

/// Summarizes forecasts in parallel and persists the results
pub struct ComputeStage {
    workers: usize,
    store: ResultStore,
    summarizer: Summarizer,
}

impl ComputeStage {
    /// Creates a stage with the default pool size
    pub fn new(store: ResultStore) -> Self {
        Self {
            workers: default_workers(),
            store,
            summarizer: summarize,
        }
    }

    #[cfg(test)]
    fn with_summarizer(mut self, summarizer: Summarizer) -> Self {
        self.summarizer = summarizer;
        self
    }

    /// Overrides the number of concurrent workers
    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers.max(1);
        self
    }

    pub fn workers(&self) -> usize {
        self.workers
    }

    /// Drains `input` until end-of-stream, then persists and republishes
    ///
    /// A location whose calculation fails, or whose worker panics, is logged
    /// and left out. The run only fails on queue or storage errors.
    pub async fn run(
        &self,
        mut input: QueueConsumer<FetchedForecast>,
        output: QueueProducer<LocationSummary>,
    ) -> Result<ComputeReport, PipelineError> {
        info!(workers = self.workers, "Computing location summaries");

        let permits = Arc::new(Semaphore::new(self.workers));
        let mut pool: JoinSet<WorkerOutput> = JoinSet::new();

        while let Some(fetched) = input.next().await? {
            // Closed only if the semaphore is dropped, which cannot happen here
            let permit = Arc::clone(&permits).acquire_owned().await.ok();
            debug!(location = %fetched.location, "Dispatching forecast to worker");
            let summarizer = self.summarizer;
            pool.spawn_blocking(move || {
                let _permit = permit;
                let result = summarizer(&fetched.forecast);
                (fetched.location, result)
            });
        }

        let mut summaries = Vec::new();
        let mut report = ComputeReport::default();
        while let Some(joined) = pool.join_next().await {
            match joined {
                Ok((location, Ok(summary))) => {
                    info!(location = %location, city = %summary.city, "Calculated");
                    summaries.push(summary);
                    report.summarized += 1;
                }
                Ok((location, Err(e @ CalcError::NoQualifyingDays { .. }))) => {
                    warn!(location = %location, error = %e, "Excluding location from ranking");
                    report.failed += 1;
                }
                Ok((location, Err(e))) => {
                    error!(location = %location, error = %e, "Calculation failed");
                    report.failed += 1;
                }
                Err(e) => {
                    error!(error = %e, "Calculation worker panicked");
                    report.failed += 1;
                }
            }
        }

        let store = self.store.clone();
        let summaries =
            spawn_blocking(move || store.save(&summaries).map(|()| summaries)).await??;
        info!(
            path = %self.store.path().display(),
            count = summaries.len(),
            "Results saved"
        );

        for summary in summaries {
            output.put(summary)?;
        }
        output.finish()?;

        info!(
            summarized = report.summarized,
            failed = report.failed,
            "Finished computing summaries"
        );
        Ok(report)
    }
}
