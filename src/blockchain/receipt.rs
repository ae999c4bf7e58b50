//! Receipt lookup and inclusion polling.

use std::time::Duration;

use alloy::primitives::TxHash;
use tokio::time::{interval, timeout, MissedTickBehavior};

use crate::blockchain::client::NodeClient;
use crate::blockchain::types::{BlockchainError, BlockchainResult, Receipt};

/// Parse a 32-byte transaction hash from hex.
pub fn parse_tx_hash(input: &str) -> BlockchainResult<TxHash> {
    input.trim().parse().map_err(|e| BlockchainError::InvalidHash {
        input: input.to_string(),
        reason: format!("{}", e),
    })
}

/// Wait for a transaction to be included.
///
/// Polls the node every `poll_interval` until a receipt appears. A reverted
/// transaction still returns its receipt; inspect `Receipt::status`.
///
/// # Arguments
/// * `tx_hash` - Transaction hash to monitor
/// * `poll_interval` - Delay between lookups
/// * `max_wait` - Maximum time to wait for inclusion
pub async fn wait_for_receipt<C: NodeClient + ?Sized>(
    client: &C,
    tx_hash: TxHash,
    poll_interval: Duration,
    max_wait: Duration,
) -> BlockchainResult<Receipt> {
    let result = timeout(max_wait, async {
        let mut ticker = interval(poll_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            ticker.tick().await;

            match client.receipt(tx_hash).await {
                Ok(receipt) => return Ok(receipt),
                Err(BlockchainError::ReceiptNotFound(_)) => {
                    tracing::debug!(tx_hash = %tx_hash, "Transaction pending");
                }
                Err(e) => return Err(e),
            }
        }
    })
    .await;

    match result {
        Ok(receipt) => receipt,
        Err(_) => Err(BlockchainError::ConfirmationTimeout {
            tx_hash,
            secs: max_wait.as_secs(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::blockchain::types::{CallMessage, ChainId};
    use alloy::primitives::{Address, Bytes};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicU32, Ordering};

    /// Node double that answers every receipt lookup with a fixed outcome.
    struct ReceiptNode {
        outcome: fn(TxHash) -> BlockchainResult<Receipt>,
        lookups: AtomicU32,
    }

    impl ReceiptNode {
        fn new(outcome: fn(TxHash) -> BlockchainResult<Receipt>) -> Self {
            Self {
                outcome,
                lookups: AtomicU32::new(0),
            }
        }
    }

    #[async_trait]
    impl NodeClient for ReceiptNode {
        async fn chain_id(&self) -> BlockchainResult<ChainId> {
            Ok(ChainId(1337))
        }

        async fn suggest_gas_price(&self) -> BlockchainResult<u128> {
            Ok(1)
        }

        async fn pending_nonce(&self, _address: Address) -> BlockchainResult<u64> {
            Ok(0)
        }

        async fn estimate_gas(&self, _msg: &CallMessage) -> BlockchainResult<u64> {
            Ok(21_000)
        }

        async fn call(&self, _msg: &CallMessage) -> BlockchainResult<Bytes> {
            Ok(Bytes::new())
        }

        async fn submit_transaction(&self, _raw: &Bytes) -> BlockchainResult<TxHash> {
            Err(BlockchainError::Submission("read-only double".into()))
        }

        async fn receipt(&self, tx_hash: TxHash) -> BlockchainResult<Receipt> {
            self.lookups.fetch_add(1, Ordering::SeqCst);
            (self.outcome)(tx_hash)
        }

        async fn code_at(&self, _address: Address) -> BlockchainResult<Bytes> {
            Ok(Bytes::new())
        }
    }

    fn included(tx_hash: TxHash) -> BlockchainResult<Receipt> {
        Ok(Receipt {
            transaction_hash: tx_hash,
            block_number: 7,
            contract_address: Address::ZERO,
            status: false,
            gas_used: 21_000,
            logs: Vec::new(),
        })
    }

    #[tokio::test(start_paused = true)]
    async fn test_pending_transaction_times_out() {
        let node = ReceiptNode::new(|hash| Err(BlockchainError::ReceiptNotFound(hash)));
        let tx_hash = TxHash::repeat_byte(0xab);

        let err =
            wait_for_receipt(&node, tx_hash, Duration::from_secs(1), Duration::from_secs(5))
                .await
                .unwrap_err();

        assert!(matches!(
            err,
            BlockchainError::ConfirmationTimeout { tx_hash: hash, secs: 5 } if hash == tx_hash
        ));
        assert!(node.lookups.load(Ordering::SeqCst) >= 5);
    }

    #[tokio::test(start_paused = true)]
    async fn test_transport_error_is_not_polled() {
        let node = ReceiptNode::new(|_| {
            Err(BlockchainError::Connection {
                op: "eth_getTransactionReceipt",
                reason: "connection refused".into(),
            })
        });

        let err = wait_for_receipt(
            &node,
            TxHash::repeat_byte(1),
            Duration::from_secs(1),
            Duration::from_secs(60),
        )
        .await
        .unwrap_err();

        assert!(matches!(err, BlockchainError::Connection { .. }));
        assert_eq!(node.lookups.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_reverted_receipt_is_returned() {
        let node = ReceiptNode::new(included);
        let tx_hash = TxHash::repeat_byte(2);

        let receipt =
            wait_for_receipt(&node, tx_hash, Duration::from_secs(1), Duration::from_secs(5))
                .await
                .unwrap();

        assert!(!receipt.status);
        assert_eq!(receipt.transaction_hash, tx_hash);
        assert_eq!(node.lookups.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_parse_tx_hash() {
        let hash = "0x900c0aa59e57327bcf26221b77c6904466c54f0b08918d99a3c838c233d13126";
        assert_eq!(parse_tx_hash(hash).unwrap().to_string(), hash);
        assert!(parse_tx_hash(&hash[2..]).is_ok());
    }

    #[test]
    fn test_parse_tx_hash_rejects_garbage() {
        for input in ["", "0x1234", "not-a-hash"] {
            assert!(matches!(parse_tx_hash(input), Err(BlockchainError::InvalidHash { .. })));
        }
    }
}
