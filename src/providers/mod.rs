pub mod exchange_rate_api;
pub mod util;

pub use exchange_rate_api::ExchangeRateApiSource;
pub use util::{Delay, NoDelay, RetryPolicy, TokioDelay, with_retry};
