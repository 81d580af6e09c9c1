pub mod convert;
pub mod rates;
pub mod setup;
pub mod ui;

use crate::rate_provider::{RateProvider, RateSettings};
use anyhow::Result;

/// Resolves rates behind a spinner.
pub async fn resolve_rates(settings: RateSettings) -> Result<RateProvider> {
    let pb = ui::new_spinner("Loading exchange rates...");
    let provider = RateProvider::new(settings).await;
    pb.finish_and_clear();
    provider
}
