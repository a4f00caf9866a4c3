//! Three-stage ranking pipeline
//!
//! ```text
//! ForecastSource -> FetchStage -> queue -> ComputeStage -> queue -> RankStage -> city
//! ```
//!
//! Each stage transition has its own queue, and every producer ends its queue
//! with a single end-of-stream marker. The stages are driven concurrently; a
//! stage stops consuming only when it sees the marker of the stage before it.

pub mod compute;
pub mod fetch;
pub mod queue;
pub mod rank;

pub use compute::{default_workers, ComputeReport, ComputeStage};
pub use fetch::{FetchReport, FetchStage};
pub use queue::{queue, Message, QueueConsumer, QueueError, QueueProducer};
pub use rank::{rank, RankStage};

use thiserror::Error;
use tokio::task::JoinError;
use tracing::info;

use crate::data::ForecastSource;
use crate::storage::StoreError;

/// Errors that end a pipeline run
///
/// Per-location fetch and calculation failures are not in here: those are
/// logged and the location is dropped.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// No location made it through to ranking
    #[error("No location produced a usable forecast summary")]
    EmptyResult,

    /// A stage queue broke down
    #[error("Pipeline queue failure: {0}")]
    Queue(#[from] QueueError),

    /// The result artifact could not be written
    #[error("Failed to persist results: {0}")]
    Storage(#[from] StoreError),

    /// The blocking task writing the result artifact did not complete
    #[error("Result persistence task failed: {0}")]
    Persist(#[from] JoinError),
}

/// Everything a finished run reports
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunOutcome {
    /// City judged to have the most favorable weather
    pub winner: String,
    pub fetch: FetchReport,
    pub compute: ComputeReport,
}

/// The fetch, compute and rank stages wired together
pub struct Pipeline<S: ?Sized> {
    fetch: FetchStage<S>,
    compute: ComputeStage,
    rank: RankStage,
}

impl<S: ForecastSource + ?Sized> Pipeline<S> {
    pub fn new(fetch: FetchStage<S>, compute: ComputeStage) -> Self {
        Self {
            fetch,
            compute,
            rank: RankStage::new(),
        }
    }

    /// Runs one batch: fetch everything, summarize it, pick the winner
    pub async fn run(&self) -> Result<RunOutcome, PipelineError> {
        let (fetched_tx, fetched_rx) = queue();
        let (summary_tx, summary_rx) = queue();

        let (fetch, compute, winner) = tokio::try_join!(
            async { self.fetch.run(fetched_tx).await.map_err(PipelineError::from) },
            self.compute.run(fetched_rx, summary_tx),
            self.rank.run(summary_rx),
        )?;

        info!(
            winner = %winner,
            fetched = fetch.fetched,
            summarized = compute.summarized,
            "Pipeline finished"
        );

        Ok(RunOutcome {
            winner,
            fetch,
            compute,
        })
    }
}
