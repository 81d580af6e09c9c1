//! Core abstractions shared by providers, stores and the CLI

pub mod cache;
pub mod config;
pub mod currency;
pub mod log;

// Re-export main types for cleaner imports
pub use cache::{BlobStore, CacheRecord};
pub use currency::{FetchError, RateSource, RateTable};
pub use log::{RateLogger, TracingLogger};
