//! Logging setup for the `cj` binary.
//!
//! Diagnostics go to stderr so stdout stays clean for the report (and for
//! piping `cj config` into a file).

use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use crate::error::AppError;

/// Install the global subscriber.
///
/// `RUST_LOG` wins when set; otherwise `level` applies to this crate only.
pub fn init_logging(level: &str) -> Result<(), AppError> {
    let default_filter = format!("conjoint_pricing={level}");
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&default_filter));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(true)
                .with_thread_ids(false),
        )
        .try_init()
        .map_err(|e| AppError::new(2, format!("Failed to initialize logging: {e}")))?;

    tracing::debug!(level, "logging initialized");
    Ok(())
}
