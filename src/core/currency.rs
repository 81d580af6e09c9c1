//! Exchange rate abstractions

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;

/// Currency code to rate, in units of the target currency per one unit of
/// the base currency. Codes are kept exactly as the provider returned them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RateTable(BTreeMap<String, f64>);

impl RateTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, code: &str) -> Option<f64> {
        self.0.get(code).copied()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Iterates rates ordered by currency code.
    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.0.iter().map(|(code, rate)| (code.as_str(), *rate))
    }
}

impl<S: Into<String>> FromIterator<(S, f64)> for RateTable {
    fn from_iter<I: IntoIterator<Item = (S, f64)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(code, rate)| (code.into(), rate)).collect())
    }
}

/// A single failed attempt to fetch rates.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("HTTP error: {0}")]
    Status(reqwest::StatusCode),

    #[error("failed to parse rates response: {0}")]
    Parse(#[from] serde_json::Error),
}

impl FetchError {
    pub fn is_parse(&self) -> bool {
        matches!(self, FetchError::Parse(_))
    }
}

/// Remote service returning the latest rates for the base currency.
#[async_trait]
pub trait RateSource: Send + Sync {
    async fn fetch_rates(&self) -> Result<RateTable, FetchError>;
}
