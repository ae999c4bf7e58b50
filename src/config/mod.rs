//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! optional config file (TOML)
//!     → loader.rs (parse & deserialize)
//!     → command-line overrides (main.rs)
//!     → validation.rs (semantic checks)
//!     → ScriptsConfig (validated, immutable)
//!     → NodeConfig handed to each RpcNodeClient explicitly
//! ```
//!
//! # Design Decisions
//! - No process-wide endpoint; every client receives its own NodeConfig
//! - All fields have defaults to allow running without a file
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{
    load_config, load_or_default, load_with_overrides, ConfigError, ConfigOverrides,
};
pub use schema::{NodeConfig, ObservabilityConfig, ReceiptConfig, RetryConfig, ScriptsConfig};
pub use validation::{validate_config, ValidationError};
