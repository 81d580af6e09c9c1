pub mod cli;
pub mod core;
pub mod providers;
pub mod rate_provider;
pub mod store;

use anyhow::Result;
use tracing::{debug, info};

pub use rate_provider::{ConvertError, RateOrigin, RateProvider, RateSettings};

/// Commands that need resolved rates.
#[derive(Debug, Clone)]
pub enum AppCommand {
    /// Convert an amount, prompting for it when `None`. Empty `targets`
    /// means the configured targets.
    Convert {
        amount: Option<f64>,
        targets: Vec<String>,
    },
    /// List every known rate
    Rates,
}

pub async fn run_command(command: AppCommand, config_path: Option<&str>) -> Result<()> {
    info!("fxconv starting...");

    let config = crate::core::config::AppConfig::load_or_default(config_path)?;
    debug!("Loaded config: {config:#?}");

    let base_currency = config.base_currency();
    let provider = cli::resolve_rates(config.rate_settings()?).await?;

    match command {
        AppCommand::Convert { amount, targets } => {
            let targets = if targets.is_empty() {
                config.targets.clone()
            } else {
                targets
            };
            cli::convert::run(&provider, &base_currency, amount, &targets)
        }
        AppCommand::Rates => cli::rates::run(&provider, &base_currency),
    }
}
