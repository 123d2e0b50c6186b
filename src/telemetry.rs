//! Log subscriber installation.

use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::{LogFormat, LoggingConfig};

/// Installs the global tracing subscriber.
///
/// `RUST_LOG` takes precedence over `config.level`. Returns `false` if a
/// subscriber was already installed, in which case nothing changes.
///
/// # Example
///
/// ```
/// use payroll_engine::config::LoggingConfig;
/// use payroll_engine::telemetry::init_logging;
///
/// init_logging(&LoggingConfig::default());
/// // a second call is a no-op
/// assert!(!init_logging(&LoggingConfig::default()));
/// ```
pub fn init_logging(config: &LoggingConfig) -> bool {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let registry = tracing_subscriber::registry().with(filter);
    let installed = match config.format {
        LogFormat::Pretty => registry
            .with(tracing_subscriber::fmt::layer().with_target(true))
            .try_init(),
        LogFormat::Json => registry
            .with(tracing_subscriber::fmt::layer().json().with_current_span(true))
            .try_init(),
    };
    installed.is_ok()
}
