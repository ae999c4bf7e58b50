//! Structured logging.
//!
//! # Design Decisions
//! - Uses the tracing crate for structured events
//! - Logs go to stderr so stdout carries only the human-readable report
//! - `RUST_LOG` overrides the configured level

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Build the filter: `RUST_LOG` if set, else `level` for this crate and
/// `warn` for dependencies.
pub fn env_filter(level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!("warn,maltcoin_scripts={level},maltcoin={level}"))
    })
}

/// Initialize the global tracing subscriber.
///
/// Calling it more than once is harmless; later calls are ignored.
pub fn init_logging(level: &str) {
    let _ = tracing_subscriber::registry()
        .with(env_filter(level))
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false),
        )
        .try_init();
}
