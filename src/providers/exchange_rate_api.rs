use anyhow::Result;
use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, instrument};

use crate::core::currency::{FetchError, RateSource, RateTable};

pub const DEFAULT_ENDPOINT: &str = "https://api.exchangerate-api.com/v4/latest/USD";

/// Per-request timeout for the rates endpoint.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

// ExchangeRateApiSource implementation for RateSource
pub struct ExchangeRateApiSource {
    endpoint: String,
    client: reqwest::Client,
}

impl ExchangeRateApiSource {
    pub fn new(endpoint: &str) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent("fxconv/1.0")
            .timeout(REQUEST_TIMEOUT)
            .build()?;

        Ok(ExchangeRateApiSource {
            endpoint: endpoint.to_string(),
            client,
        })
    }
}

// Other fields like `base` and `date` are ignored
#[derive(Debug, Deserialize)]
struct LatestRatesResponse {
    rates: RateTable,
}

#[async_trait]
impl RateSource for ExchangeRateApiSource {
    #[instrument(
        name = "ExchangeRateFetch",
        skip(self),
        fields(endpoint = %self.endpoint)
    )]
    async fn fetch_rates(&self) -> Result<RateTable, FetchError> {
        debug!("Requesting exchange rates from {}", self.endpoint);

        let response = self.client.get(&self.endpoint).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status(status));
        }

        let text = response.text().await?;
        let data: LatestRatesResponse = serde_json::from_str(&text)?;

        debug!(count = data.rates.len(), "Received exchange rates");
        Ok(data.rates)
    }
}
