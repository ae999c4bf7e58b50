//! Resilience subsystem.
//!
//! # Data Flow
//! ```text
//! RPC call to node:
//!     → timeouts.rs (enforce per-call deadline)
//!     → On transport failure: retries.rs (idempotent reads only, backoff.rs delay)
//! ```
//!
//! # Design Decisions
//! - Timeouts are non-negotiable; every RPC call has a deadline
//! - Retries only for idempotent reads; raw transaction submission is never retried
//! - Node error responses (reverts, rejections) are final, never retried

pub mod backoff;
pub mod retries;
pub mod timeouts;
