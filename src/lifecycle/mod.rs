//! Lifecycle management subsystem.
//!
//! Each invocation runs exactly one command. Signals (signals.rs) let the
//! user cancel it between RPC calls; there is no partial state to unwind.

pub mod signals;

pub use signals::{interrupt_signal, run_cancellable, Interrupted, INTERRUPTED_EXIT_CODE};
