//! Yandex-style forecast API client
//!
//! This module provides the `ForecastSource` seam the pipeline fetches through,
//! and the production implementation that downloads a forecast response over
//! HTTP and parses it into our `RawForecast` structure.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use thiserror::Error;

use super::{ForecastDay, Location, RawForecast};

/// Default per-request timeout
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Errors that can occur when fetching a forecast
#[derive(Debug, Error)]
pub enum FetchError {
    /// HTTP request failed
    #[error("HTTP request failed: {0}")]
    RequestFailed(#[from] reqwest::Error),

    /// Failed to parse JSON response
    #[error("Failed to parse JSON response: {0}")]
    ParseError(#[from] serde_json::Error),

    /// Server answered with a non-success status
    #[error("Unexpected status {status} from {url}")]
    Status { url: String, status: u16 },
}

/// Anything that can produce a raw forecast for a location
#[async_trait]
pub trait ForecastSource: Send + Sync {
    async fn fetch(&self, location: &Location) -> Result<RawForecast, FetchError>;
}

/// Client for fetching forecasts from the Yandex-style endpoint
#[derive(Debug, Clone)]
pub struct YandexClient {
    client: Client,
}

impl YandexClient {
    /// Create a new YandexClient whose requests give up after `timeout`
    pub fn with_timeout(timeout: Duration) -> Result<Self, FetchError> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self { client })
    }
}

#[async_trait]
impl ForecastSource for YandexClient {
    /// Fetch the forecast for the given location
    ///
    /// # Returns
    /// * `Ok(RawForecast)` - Forecast for the location
    /// * `Err(FetchError)` - If the request, status check or parsing fails
    async fn fetch(&self, location: &Location) -> Result<RawForecast, FetchError> {
        let response = self.client.get(&location.url).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: location.url.clone(),
                status: status.as_u16(),
            });
        }

        let text = response.text().await?;
        parse_forecast(&text)
    }
}

/// Parse a forecast response body into a RawForecast
///
/// Only the fields the ranking needs are read; everything else in the
/// response is ignored.
pub fn parse_forecast(body: &str) -> Result<RawForecast, FetchError> {
    let response: YandexResponse = serde_json::from_str(body)?;

    Ok(RawForecast {
        city: response.geo_object.locality.name,
        forecasts: response.forecasts,
    })
}

/// Forecast API response structure
#[derive(Debug, Deserialize)]
struct YandexResponse {
    geo_object: GeoObject,
    forecasts: Vec<ForecastDay>,
}

#[derive(Debug, Deserialize)]
struct GeoObject {
    locality: Locality,
}

#[derive(Debug, Deserialize)]
struct Locality {
    name: String,
}
