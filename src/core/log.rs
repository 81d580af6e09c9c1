// Define a new module for logging initialization
use tracing_subscriber::{
    EnvFilter, filter::Directive, fmt, prelude::__tracing_subscriber_SubscriberExt,
    util::SubscriberInitExt,
};

/// Warnings and errors from rate resolution are shown unless `RUST_LOG` says
/// otherwise.
const DEFAULT_DIRECTIVES: &str = "fxconv=warn";
const VERBOSE_DIRECTIVE: &str = "fxconv=debug";

pub fn init_logging(verbose: bool) {
    let rust_log = std::env::var(EnvFilter::DEFAULT_ENV).ok();

    tracing_subscriber::registry()
        .with(fmt::layer().pretty().without_time().with_writer(std::io::stderr))
        .with(app_filter(verbose, rust_log.as_deref()))
        .init();
}

/// `RUST_LOG` when set and valid, else the defaults; `verbose` raises the
/// app target to debug on top of either.
fn app_filter(verbose: bool, rust_log: Option<&str>) -> EnvFilter {
    let filter = rust_log
        .filter(|directives| !directives.trim().is_empty())
        .and_then(|directives| EnvFilter::try_new(directives).ok())
        .unwrap_or_else(|| EnvFilter::new(DEFAULT_DIRECTIVES));

    if !verbose {
        return filter;
    }
    match VERBOSE_DIRECTIVE.parse::<Directive>() {
        Ok(directive) => filter.add_directive(directive),
        Err(_) => filter,
    }
}

/// Operational messages emitted while rates are resolved.
pub trait RateLogger: Send + Sync {
    fn info(&self, message: &str);
    fn warn(&self, message: &str);
    fn error(&self, message: &str);
}

/// Forwards to the global `tracing` subscriber.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingLogger;

impl RateLogger for TracingLogger {
    fn info(&self, message: &str) {
        tracing::info!("{message}");
    }

    fn warn(&self, message: &str) {
        tracing::warn!("{message}");
    }

    fn error(&self, message: &str) {
        tracing::error!("{message}");
    }
}
