//! Structured logging setup.
//!
//! Logs go to stderr; plugin hosts speak their handshake over stdout.

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

use crate::error::{ProviderError, ProviderResult};

/// Environment variable holding the filter directives, e.g. `adaptive_provider=debug`.
pub const LOG_ENV: &str = "ADAPTIVE_PROVIDER_LOG";

const DEFAULT_DIRECTIVE: &str = "info";

fn filter() -> EnvFilter {
    EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(DEFAULT_DIRECTIVE))
}

/// Install the global subscriber. Fails if one is already installed.
pub fn try_init_logging() -> ProviderResult<()> {
    tracing_subscriber::registry()
        .with(filter())
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr).with_target(true))
        .try_init()
        .map_err(|error| ProviderError::Config(format!("failed to install logger: {}", error)))
}

/// Install the global subscriber, ignoring an already installed one.
pub fn init_logging() {
    let _ = try_init_logging();
}
