//! Sunrank - find the city with the most favorable daytime weather
//!
//! Fetches the forecast of every configured city, summarizes daytime
//! temperature and dry hours per city, and prints the best one.

use std::process;
use std::sync::Arc;

use clap::Parser;

use sunrank::cli::{Cli, RunConfig};
use sunrank::data::YandexClient;
use sunrank::logging;
use sunrank::pipeline::{ComputeStage, FetchStage, Pipeline};
use sunrank::storage::ResultStore;

/// Builds the pipeline from the run configuration and executes it
async fn run(config: RunConfig) -> Result<String, Box<dyn std::error::Error>> {
    let client = Arc::new(YandexClient::with_timeout(config.timeout)?);

    let mut fetch = FetchStage::new(client, config.locations);
    if let Some(concurrency) = config.fetch_concurrency {
        fetch = fetch.with_concurrency(concurrency);
    }

    let mut compute = ComputeStage::new(ResultStore::new(config.output));
    if let Some(workers) = config.workers {
        compute = compute.with_workers(workers);
    }

    let outcome = Pipeline::new(fetch, compute).run().await?;
    Ok(outcome.winner)
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let config = match RunConfig::from_cli(&cli) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("error: {}", e);
            process::exit(2);
        }
    };

    logging::init_logging(config.verbose);

    match run(config).await {
        Ok(winner) => println!("{}", winner),
        Err(e) => {
            eprintln!("error: {}", e);
            process::exit(1);
        }
    }
}
