//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! blockchain/ and scripts/ emit tracing events
//!     → logging.rs (EnvFilter + fmt layer)
//!     → stderr
//! ```

pub mod logging;

pub use logging::init_logging;
