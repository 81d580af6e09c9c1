//! Resolves a rate table once, from cache or network, and converts amounts
//! against it.

use crate::core::cache::{BlobStore, CacheRecord, now_epoch_secs};
use crate::core::currency::{FetchError, RateSource, RateTable};
use crate::core::log::{RateLogger, TracingLogger};
use crate::providers::exchange_rate_api::{DEFAULT_ENDPOINT, ExchangeRateApiSource};
use crate::providers::util::{Delay, RetryPolicy, TokioDelay, with_retry};
use crate::store::disk::DiskStore;
use anyhow::Result;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

pub const DEFAULT_CACHE_FILE: &str = "exchange_rates.json";
pub const DEFAULT_CACHE_EXPIRY: Duration = Duration::from_secs(3600);
pub const DEFAULT_MAX_RETRIES: u32 = 3;
pub const DEFAULT_RETRY_DELAY: Duration = Duration::from_secs(2);

#[derive(Debug, Clone)]
pub struct RateSettings {
    pub endpoint: String,
    pub cache_path: PathBuf,
    pub cache_expiry: Duration,
    pub max_retries: u32,
    pub retry_delay: Duration,
}

impl Default for RateSettings {
    fn default() -> Self {
        RateSettings {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            cache_path: PathBuf::from(DEFAULT_CACHE_FILE),
            cache_expiry: DEFAULT_CACHE_EXPIRY,
            max_retries: DEFAULT_MAX_RETRIES,
            retry_delay: DEFAULT_RETRY_DELAY,
        }
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConvertError {
    #[error("Exchange rates not available")]
    RatesUnavailable,

    #[error("Currency {0} not supported")]
    UnsupportedCurrency(String),
}

/// Where the held rate table came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RateOrigin {
    Cache,
    Network,
    /// Every fetch attempt failed and no usable cache existed.
    Unavailable,
}

impl fmt::Display for RateOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            RateOrigin::Cache => "cache",
            RateOrigin::Network => "network",
            RateOrigin::Unavailable => "unavailable",
        };
        f.write_str(label)
    }
}

/// Rounds to the nearest cent, ties to even, judged on the exact value of
/// `value` rather than on `value * 100`.
pub fn round_cents(value: f64) -> f64 {
    Decimal::from_f64_retain(value)
        .map(|exact| exact.round_dp_with_strategy(2, RoundingStrategy::MidpointNearestEven))
        .and_then(|rounded| rounded.to_f64())
        .unwrap_or(value)
}

#[derive(Debug)]
pub struct RateProvider {
    rates: RateTable,
    origin: RateOrigin,
}

impl RateProvider {
    /// Resolves rates with the HTTP source, a file cache at
    /// `settings.cache_path`, real sleeps and `tracing` logging.
    pub async fn new(settings: RateSettings) -> Result<Self> {
        Self::builder(settings).build().await
    }

    pub fn builder(settings: RateSettings) -> RateProviderBuilder {
        RateProviderBuilder {
            settings,
            source: None,
            store: None,
            delay: None,
            logger: None,
        }
    }

    pub fn rates(&self) -> &RateTable {
        &self.rates
    }

    pub fn origin(&self) -> RateOrigin {
        self.origin
    }

    pub fn convert(&self, target_currency: &str, amount: f64) -> Result<f64, ConvertError> {
        if self.rates.is_empty() {
            return Err(ConvertError::RatesUnavailable);
        }

        let rate = self
            .rates
            .get(target_currency)
            .ok_or_else(|| ConvertError::UnsupportedCurrency(target_currency.to_string()))?;

        Ok(round_cents(amount * rate))
    }

    #[cfg(test)]
    pub(crate) fn from_table(rates: RateTable) -> Self {
        let origin = if rates.is_empty() {
            RateOrigin::Unavailable
        } else {
            RateOrigin::Network
        };
        Self { rates, origin }
    }
}

/// Overrides the default collaborators used to resolve rates.
pub struct RateProviderBuilder {
    settings: RateSettings,
    source: Option<Arc<dyn RateSource>>,
    store: Option<Arc<dyn BlobStore>>,
    delay: Option<Arc<dyn Delay>>,
    logger: Option<Arc<dyn RateLogger>>,
}

impl RateProviderBuilder {
    pub fn source(mut self, source: Arc<dyn RateSource>) -> Self {
        self.source = Some(source);
        self
    }

    pub fn store(mut self, store: Arc<dyn BlobStore>) -> Self {
        self.store = Some(store);
        self
    }

    pub fn delay(mut self, delay: Arc<dyn Delay>) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn logger(mut self, logger: Arc<dyn RateLogger>) -> Self {
        self.logger = Some(logger);
        self
    }

    /// Fails only if the default HTTP client cannot be created. Cache and
    /// network failures degrade to an empty rate table instead.
    pub async fn build(self) -> Result<RateProvider> {
        let source: Arc<dyn RateSource> = match self.source {
            Some(source) => source,
            None => Arc::new(ExchangeRateApiSource::new(&self.settings.endpoint)?),
        };
        let store: Arc<dyn BlobStore> = self
            .store
            .unwrap_or_else(|| Arc::new(DiskStore::new(&self.settings.cache_path)));
        let delay: Arc<dyn Delay> = self.delay.unwrap_or_else(|| Arc::new(TokioDelay));
        let logger: Arc<dyn RateLogger> = self.logger.unwrap_or_else(|| Arc::new(TracingLogger));

        let resolver = Resolver {
            settings: &self.settings,
            source: source.as_ref(),
            store: store.as_ref(),
            delay: delay.as_ref(),
            logger: logger.as_ref(),
        };
        let (rates, origin) = resolver.resolve().await;
        debug!(%origin, count = rates.len(), "Rates resolved");

        Ok(RateProvider { rates, origin })
    }
}

struct Resolver<'a> {
    settings: &'a RateSettings,
    source: &'a dyn RateSource,
    store: &'a dyn BlobStore,
    delay: &'a dyn Delay,
    logger: &'a dyn RateLogger,
}

impl Resolver<'_> {
    async fn resolve(&self) -> (RateTable, RateOrigin) {
        if let Some(rates) = self.load_from_cache().await {
            self.logger.info("Rates loaded from cache");
            return (rates, RateOrigin::Cache);
        }

        self.logger.info("Fetching rates from API");
        match self.fetch_rates().await {
            Some(rates) => {
                self.save_to_cache(&rates).await;
                (rates, RateOrigin::Network)
            }
            None => {
                self.logger.error("Failed to fetch rates");
                (RateTable::new(), RateOrigin::Unavailable)
            }
        }
    }

    async fn load_from_cache(&self) -> Option<RateTable> {
        let blob = match self.store.load().await {
            Ok(Some(blob)) => blob,
            Ok(None) => {
                debug!("No cached rates");
                return None;
            }
            Err(e) => {
                self.logger.warn(&format!("Cache load failed: {e:#}"));
                return None;
            }
        };

        let record = match CacheRecord::from_slice(&blob) {
            Ok(record) => record,
            Err(e) => {
                self.logger.warn(&format!("Cache load failed: {e}"));
                return None;
            }
        };

        let now = now_epoch_secs();
        if !record.is_fresh(now, self.settings.cache_expiry) {
            debug!(age_secs = record.age_secs(now), "Cached rates are stale");
            return None;
        }
        if record.rates.is_empty() {
            debug!("Cached rate table is empty");
            return None;
        }

        Some(record.rates)
    }

    async fn fetch_rates(&self) -> Option<RateTable> {
        let policy = RetryPolicy::new(self.settings.max_retries, self.settings.retry_delay);

        let result = with_retry(
            || self.source.fetch_rates(),
            &policy,
            self.delay,
            |attempt, total, err: &FetchError| {
                if err.is_parse() {
                    self.logger
                        .error(&format!("JSON decode error (attempt {attempt}/{total}): {err}"));
                } else {
                    self.logger
                        .error(&format!("Request failed (attempt {attempt}/{total}): {err}"));
                }
            },
        )
        .await;

        match result {
            Ok(rates) if rates.is_empty() => {
                self.logger.warn("Rates response contained no rates");
                None
            }
            Ok(rates) => Some(rates),
            Err(_) => None,
        }
    }

    async fn save_to_cache(&self, rates: &RateTable) {
        let record = CacheRecord::new(rates.clone(), now_epoch_secs());
        let res = match record.to_vec() {
            Ok(blob) => self.store.save(&blob).await,
            Err(e) => Err(e.into()),
        };
        if let Err(e) = res {
            self.logger.error(&format!("Cache save failed: {e:#}"));
        }
    }
}
