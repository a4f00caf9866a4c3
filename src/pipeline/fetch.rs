//! Fetch stage - downloads raw forecasts for every configured location.
//!
//! All locations are requested concurrently (bounded by a semaphore) and each
//! successful forecast is enqueued as soon as it arrives, so the order on the
//! queue follows completion, not configuration. A location that fails is
//! logged and left out; the stage itself only fails if the queue does.

use std::sync::Arc;

use futures::stream::{FuturesUnordered, StreamExt};
use tokio::sync::Semaphore;
use tracing::{debug, info, warn};

use super::queue::{QueueError, QueueProducer};
use crate::data::{FetchedForecast, ForecastSource, Location};

/// Outcome counts of one fetch run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FetchReport {
    pub fetched: usize,
    pub failed: usize,
}

/// Concurrently fetches forecasts for a fixed set of locations
pub struct FetchStage<S: ?Sized> {
    source: Arc<S>,
    locations: Vec<Location>,
    concurrency: usize,
}

impl<S: ForecastSource + ?Sized> FetchStage<S> {
    /// Creates a stage that fetches every location at once
    pub fn new(source: Arc<S>, locations: Vec<Location>) -> Self {
        let concurrency = locations.len().max(1);
        Self {
            source,
            locations,
            concurrency,
        }
    }

    /// Limits how many requests are in flight at the same time
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    /// Fetches every location, enqueues the successes, then ends the stream
    ///
    /// End-of-stream is sent exactly once, after all fetches have settled,
    /// including when every single fetch failed.
    pub async fn run(
        &self,
        output: QueueProducer<FetchedForecast>,
    ) -> Result<FetchReport, QueueError> {
        info!(
            locations = self.locations.len(),
            concurrency = self.concurrency,
            "Fetching forecasts"
        );

        let semaphore = Semaphore::new(self.concurrency);
        let mut in_flight: FuturesUnordered<_> = self
            .locations
            .iter()
            .map(|location| {
                let semaphore = &semaphore;
                let source = &self.source;
                async move {
                    let _permit = semaphore.acquire().await.ok();
                    debug!(location = %location.name, url = %location.url, "Requesting forecast");
                    (location, source.fetch(location).await)
                }
            })
            .collect();

        let mut report = FetchReport::default();
        while let Some((location, result)) = in_flight.next().await {
            match result {
                Ok(forecast) => {
                    info!(location = %location.name, city = %forecast.city, "Forecast fetched");
                    output.put(FetchedForecast {
                        location: location.name.clone(),
                        forecast,
                    })?;
                    report.fetched += 1;
                }
                Err(e) => {
                    warn!(location = %location.name, error = %e, "Failed to fetch forecast, skipping");
                    report.failed += 1;
                }
            }
        }

        output.finish()?;
        info!(
            fetched = report.fetched,
            failed = report.failed,
            "Finished fetching forecasts"
        );
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{FetchError, RawForecast};
    use crate::pipeline::queue::queue;
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    /// Mock source serving canned forecasts by URL
    struct MockSource {
        cities: HashMap<String, String>,
        in_flight: AtomicUsize,
        peak: AtomicUsize,
    }

    impl MockSource {
        fn new(entries: &[(&str, &str)]) -> Self {
            Self {
                cities: entries
                    .iter()
                    .map(|(url, city)| (url.to_string(), city.to_string()))
                    .collect(),
                in_flight: AtomicUsize::new(0),
                peak: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl ForecastSource for MockSource {
        async fn fetch(&self, location: &Location) -> Result<RawForecast, FetchError> {
            let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.peak.fetch_max(now, Ordering::SeqCst);
            tokio::time::sleep(Duration::from_millis(5)).await;
            self.in_flight.fetch_sub(1, Ordering::SeqCst);

            match self.cities.get(&location.url) {
                Some(city) => Ok(RawForecast {
                    city: city.clone(),
                    forecasts: vec![],
                }),
                None => Err(FetchError::Status {
                    url: location.url.clone(),
                    status: 404,
                }),
            }
        }
    }

    fn locations(keys: &[&str]) -> Vec<Location> {
        keys.iter()
            .map(|key| Location::new(*key, format!("mock://{}", key)))
            .collect()
    }

    #[tokio::test]
    async fn test_fetch_enqueues_every_success_then_end_of_stream() {
        let source = Arc::new(MockSource::new(&[
            ("mock://MOSCOW", "Moscow"),
            ("mock://PARIS", "Paris"),
        ]));
        let stage = FetchStage::new(source, locations(&["MOSCOW", "PARIS"]));
        let (producer, mut consumer) = queue();

        let report = stage.run(producer).await.unwrap();

        assert_eq!(report, FetchReport { fetched: 2, failed: 0 });
        let mut items = consumer.drain().await.unwrap();
        items.sort_by(|a, b| a.location.cmp(&b.location));
        assert_eq!(items[0].location, "MOSCOW");
        assert_eq!(items[0].forecast.city, "Moscow");
        assert_eq!(items[1].location, "PARIS");
        assert!(consumer.is_finished());
    }

    #[tokio::test]
    async fn test_failed_location_is_skipped() {
        let source = Arc::new(MockSource::new(&[("mock://MOSCOW", "Moscow")]));
        let stage = FetchStage::new(source, locations(&["MOSCOW", "ATLANTIS"]));
        let (producer, mut consumer) = queue();

        let report = stage.run(producer).await.unwrap();

        assert_eq!(report, FetchReport { fetched: 1, failed: 1 });
        let items = consumer.drain().await.unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].location, "MOSCOW");
    }

    #[tokio::test]
    async fn test_all_failures_still_end_the_stream() {
        let source = Arc::new(MockSource::new(&[]));
        let stage = FetchStage::new(source, locations(&["A", "B", "C"]));
        let (producer, mut consumer) = queue();

        let report = stage.run(producer).await.unwrap();

        assert_eq!(report.failed, 3);
        assert_eq!(consumer.next().await.unwrap(), None);
        assert!(consumer.is_finished());
    }

    #[tokio::test]
    async fn test_no_locations_only_ends_the_stream() {
        let source = Arc::new(MockSource::new(&[]));
        let stage = FetchStage::new(source, Vec::new());
        let (producer, mut consumer) = queue();

        let report = stage.run(producer).await.unwrap();

        assert_eq!(report, FetchReport::default());
        assert!(consumer.drain().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_concurrency_limit_is_respected() {
        let source = Arc::new(MockSource::new(&[
            ("mock://A", "A"),
            ("mock://B", "B"),
            ("mock://C", "C"),
            ("mock://D", "D"),
        ]));
        let stage =
            FetchStage::new(Arc::clone(&source), locations(&["A", "B", "C", "D"])).with_concurrency(2);
        let (producer, mut consumer) = queue();

        stage.run(producer).await.unwrap();

        assert_eq!(consumer.drain().await.unwrap().len(), 4);
        assert!(source.peak.load(Ordering::SeqCst) <= 2);
    }

    #[tokio::test]
    async fn test_requests_overlap_without_limit() {
        let source = Arc::new(MockSource::new(&[
            ("mock://A", "A"),
            ("mock://B", "B"),
            ("mock://C", "C"),
        ]));
        let stage = FetchStage::new(Arc::clone(&source), locations(&["A", "B", "C"]));
        let (producer, _consumer) = queue();

        stage.run(producer).await.unwrap();

        assert_eq!(source.peak.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_closed_queue_is_an_error() {
        let source = Arc::new(MockSource::new(&[("mock://A", "A")]));
        let stage = FetchStage::new(source, locations(&["A"]));
        let (producer, consumer) = queue();
        drop(consumer);

        assert_eq!(stage.run(producer).await, Err(QueueError::Closed));
    }
}
