use tracing::Span;
use tracing_subscriber::fmt::time::UtcTime;
use tracing_subscriber::prelude::__tracing_subscriber_SubscriberExt;
use tracing_subscriber::util::{SubscriberInitExt, TryInitError};
use tracing_subscriber::EnvFilter;

/// Filter used when `RUST_LOG` is unset.
const DEFAULT_FILTER: &str = "info";

/// Installs a JSON formatter as the global subscriber.
///
/// Verbosity comes from `RUST_LOG`. Fails when a subscriber is already set.
pub fn try_init() -> Result<(), TryInitError> {
    let fmt_layer = tracing_subscriber::fmt::layer()
        .json()
        .with_ansi(false)
        .with_timer(UtcTime::rfc_3339())
        .with_level(true)
        .with_target(false);
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .try_init()
}

pub trait LogError {
    fn log_error(&self, error: anyhow::Error);
}

impl LogError for Span {
    /// Errors are logged at debug level, they are expected whenever a check is denied.
    fn log_error(&self, error: anyhow::Error) {
        self.in_scope(|| {
            tracing::debug!("{error:?}");
        });
    }
}
