//! Logging setup for binaries

use puppet_core::{PuppetError, PuppetResult};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Install the global subscriber.
///
/// The filter comes from `RUST_LOG` and defaults to `info`. Fails if a
/// subscriber is already installed.
pub fn init_logging(json: bool) -> PuppetResult<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let registry = tracing_subscriber::registry().with(filter);

    let result = if json {
        registry
            .with(fmt::layer().json().with_current_span(false))
            .try_init()
    } else {
        registry.with(fmt::layer().with_target(true)).try_init()
    };

    result.map_err(|e| PuppetError::Config(format!("logging: {e}")))
}
