//! OS signal handling.
//!
//! SIGINT (Ctrl-C) cancels the running command. The command future is
//! dropped at its current await point, so no further RPC call is issued
//! after the signal arrives.

use std::future::Future;

/// Exit status conventionally used after SIGINT.
pub const INTERRUPTED_EXIT_CODE: u8 = 130;

/// The command was cancelled by the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("interrupted")]
pub struct Interrupted;

/// Resolve once SIGINT is received.
pub async fn interrupt_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for Ctrl-C");
        std::future::pending::<()>().await;
    }
}

/// Run `fut` until it completes or `cancel` resolves, whichever is first.
pub async fn run_cancellable<T, F, C>(fut: F, cancel: C) -> Result<T, Interrupted>
where
    F: Future<Output = T>,
    C: Future<Output = ()>,
{
    tokio::select! {
        out = fut => Ok(out),
        _ = cancel => {
            tracing::warn!("Interrupted, abandoning in-flight operation");
            Err(Interrupted)
        }
    }
}
