//! Timeout enforcement for RPC calls.

use std::future::IntoFuture;
use std::time::Duration;

use crate::blockchain::types::{BlockchainError, BlockchainResult};

/// Await `fut`, failing with `Timeout` once `limit` elapses.
///
/// The inner future is dropped on timeout, cancelling the request.
pub async fn with_timeout<F>(
    limit: Duration,
    op: &'static str,
    fut: F,
) -> BlockchainResult<F::Output>
where
    F: IntoFuture,
{
    tokio::time::timeout(limit, fut).await.map_err(|_| {
        tracing::warn!(op, timeout_secs = limit.as_secs(), "RPC timeout");
        BlockchainError::Timeout {
            op,
            secs: limit.as_secs(),
        }
    })
}
