use anyhow::Result;
use clap::{Parser, Subcommand};
use fxconv::core::log::init_logging;

#[derive(Parser)]
#[command(version, about)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to optional configuration file
    #[arg(short, long, global = true)]
    config_path: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Create default configuration
    Setup,
    /// Convert an amount of the base currency into the target currencies
    Convert {
        /// Amount in the base currency, prompted for when omitted
        amount: Option<f64>,

        /// Target currency codes, defaults to the configured targets
        #[arg(short, long = "to", value_name = "CODE", value_delimiter = ',')]
        to: Vec<String>,
    },
    /// List all available exchange rates
    Rates,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose);

    let config_path = cli.config_path.as_deref();
    let result = match cli.command {
        Some(Commands::Setup) => fxconv::cli::setup::setup(),
        Some(Commands::Convert { amount, to }) => {
            fxconv::run_command(
                fxconv::AppCommand::Convert {
                    amount,
                    targets: to,
                },
                config_path,
            )
            .await
        }
        Some(Commands::Rates) => fxconv::run_command(fxconv::AppCommand::Rates, config_path).await,
        None => {
            fxconv::run_command(
                fxconv::AppCommand::Convert {
                    amount: None,
                    targets: Vec::new(),
                },
                config_path,
            )
            .await
        }
    };

    if let Err(e) = &result {
        tracing::error!(error = %e, "Application failed");
    }
    result
}
