//! Tracing subscriber setup.

use tracing_subscriber::EnvFilter;
use tracing_subscriber::util::TryInitError;

/// Installs a global `fmt` subscriber.
///
/// `RUST_LOG` wins over `default_filter` when set. Fails when a global
/// subscriber is already installed, which callers that may initialise twice
/// (tests, embedded use) can ignore.
///
/// # Errors
///
/// Returns [`TryInitError`] when a global subscriber already exists.
pub fn init_tracing(default_filter: &str) -> Result<(), TryInitError> {
    use tracing_subscriber::layer::SubscriberExt;
    use tracing_subscriber::util::SubscriberInitExt;

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_target(true))
        .try_init()
}
