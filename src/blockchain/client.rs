//! Blockchain RPC client with timeout and error handling.
//!
//! # Responsibilities
//! - Connect to a JSON-RPC endpoint given by explicit configuration
//! - Query chain state (chain id, gas price, nonces, code, receipts)
//! - Estimate gas and execute read-only calls
//! - Submit signed raw transactions
//! - Bound every call with a timeout; retry idempotent reads on transport errors

use std::time::Duration;

use alloy::network::TransactionBuilder;
use alloy::primitives::{Address, Bytes, TxHash};
use alloy::providers::{Provider, ProviderBuilder};
use alloy::rpc::types::{TransactionReceipt, TransactionRequest as RpcTransactionRequest};
use alloy::transports::TransportError;
use async_trait::async_trait;
use std::sync::Arc;

use crate::blockchain::types::{
    BlockchainError, BlockchainResult, CallMessage, ChainId, LogRecord, NodeConfig, Receipt,
};
use crate::resilience::retries::{retry_idempotent, RetryPolicy};
use crate::resilience::timeouts::with_timeout;

/// The node operations the transaction workflow consumes.
#[async_trait]
pub trait NodeClient: Send + Sync {
    /// Chain id reported by the node.
    async fn chain_id(&self) -> BlockchainResult<ChainId>;

    /// Suggested gas price in wei.
    async fn suggest_gas_price(&self) -> BlockchainResult<u128>;

    /// Transaction count of `address` including pending transactions.
    async fn pending_nonce(&self, address: Address) -> BlockchainResult<u64>;

    /// Gas needed to execute `msg`.
    ///
    /// Fails with `GasEstimation` when the node reports the call would not
    /// succeed.
    async fn estimate_gas(&self, msg: &CallMessage) -> BlockchainResult<u64>;

    /// Execute `msg` read-only against the latest state.
    async fn call(&self, msg: &CallMessage) -> BlockchainResult<Bytes>;

    /// Broadcast a signed, encoded transaction.
    async fn submit_transaction(&self, raw: &Bytes) -> BlockchainResult<TxHash>;

    /// Receipt of an included transaction; `ReceiptNotFound` otherwise.
    async fn receipt(&self, tx_hash: TxHash) -> BlockchainResult<Receipt>;

    /// Code deployed at `address`.
    async fn code_at(&self, address: Address) -> BlockchainResult<Bytes>;
}

/// JSON-RPC node client backed by an alloy HTTP provider.
#[derive(Clone)]
pub struct RpcNodeClient {
    provider: Arc<dyn Provider + Send + Sync>,
    /// Configuration.
    config: NodeConfig,
    /// Per-call timeout duration.
    timeout_duration: Duration,
    retry: RetryPolicy,
}

impl RpcNodeClient {
    /// Create a new node client.
    ///
    /// No network traffic happens here; an unreachable endpoint surfaces on
    /// the first call.
    ///
    /// # Arguments
    /// * `config` - Node endpoint configuration
    /// * `retry` - Retry policy applied to read calls
    pub fn new(config: NodeConfig, retry: RetryPolicy) -> BlockchainResult<Self> {
        let url: url::Url = config.rpc_url.parse().map_err(|e| BlockchainError::Connection {
            op: "connect",
            reason: format!("Invalid RPC URL '{}': {}", config.rpc_url, e),
        })?;

        let provider = ProviderBuilder::new()
            .disable_recommended_fillers()
            .connect_http(url);

        tracing::debug!(rpc_url = %config.rpc_url, "Node client created");

        Ok(Self {
            provider: Arc::new(provider) as Arc<dyn Provider + Send + Sync>,
            timeout_duration: Duration::from_secs(config.rpc_timeout_secs),
            config,
            retry,
        })
    }

    /// Connect and verify the chain id if one is configured.
    pub async fn connect(config: NodeConfig, retry: RetryPolicy) -> BlockchainResult<Self> {
        let client = Self::new(config, retry)?;
        let chain_id = client.verify_chain_id().await?;
        tracing::info!(
            rpc_url = %client.config.rpc_url,
            chain_id = chain_id.0,
            "Connected to node"
        );
        Ok(client)
    }

    /// Check the node's chain id against `expected_chain_id`, if set.
    pub async fn verify_chain_id(&self) -> BlockchainResult<ChainId> {
        let chain_id = self.chain_id().await?;
        if let Some(expected) = self.config.expected_chain_id {
            if chain_id.0 != expected {
                return Err(BlockchainError::ChainMismatch {
                    expected,
                    actual: chain_id.0,
                });
            }
        }
        Ok(chain_id)
    }

    /// Run an idempotent read with timeout and retries.
    async fn read<T, F, Fut>(&self, op: &'static str, f: F) -> BlockchainResult<T>
    where
        F: Fn() -> Fut + Send + Sync,
        Fut: std::future::Future<Output = Result<T, TransportError>> + Send,
        T: Send,
    {
        let f = &f;
        retry_idempotent(&self.retry, op, || async move {
            tracing::debug!(op, "RPC call");
            let result = with_timeout(self.timeout_duration, op, f()).await?;
            result.map_err(|e| transport_error(op, e))
        })
        .await
    }
}

/// Map a transport-level failure to `Connection`, keeping node error
/// responses distinct so callers can classify them per operation.
fn transport_error(op: &'static str, e: TransportError) -> BlockchainError {
    BlockchainError::Connection {
        op,
        reason: e.to_string(),
    }
}

fn to_rpc_request(msg: &CallMessage) -> RpcTransactionRequest {
    let request = RpcTransactionRequest::default().with_from(msg.from);
    match msg.to {
        Some(to) => request.with_to(to).with_input(msg.data.clone()),
        None => request.with_deploy_code(msg.data.clone()),
    }
}

fn convert_receipt(receipt: TransactionReceipt) -> Receipt {
    let logs = receipt
        .inner
        .logs()
        .iter()
        .map(|log| LogRecord {
            address: log.inner.address,
            topics: log.inner.data.topics().to_vec(),
            data: log.inner.data.data.clone(),
        })
        .collect();

    Receipt {
        transaction_hash: receipt.transaction_hash,
        block_number: receipt.block_number.unwrap_or_default(),
        contract_address: receipt.contract_address.unwrap_or(Address::ZERO),
        status: receipt.status(),
        gas_used: receipt.gas_used,
        logs,
    }
}

#[async_trait]
impl NodeClient for RpcNodeClient {
    async fn chain_id(&self) -> BlockchainResult<ChainId> {
        self.read("eth_chainId", || async move { self.provider.get_chain_id().await })
            .await
            .map(ChainId)
    }

    async fn suggest_gas_price(&self) -> BlockchainResult<u128> {
        self.read("eth_gasPrice", || async move { self.provider.get_gas_price().await })
            .await
    }

    async fn pending_nonce(&self, address: Address) -> BlockchainResult<u64> {
        self.read("eth_getTransactionCount", || async move {
            self.provider.get_transaction_count(address).pending().await
        })
        .await
    }

    async fn estimate_gas(&self, msg: &CallMessage) -> BlockchainResult<u64> {
        let op = "eth_estimateGas";
        let request = &to_rpc_request(msg);
        retry_idempotent(&self.retry, op, || async move {
            tracing::debug!(op, "RPC call");
            let fut = async { self.provider.estimate_gas(request.clone()).await };
            match with_timeout(self.timeout_duration, op, fut).await? {
                Ok(gas) => Ok(gas),
                Err(e) => match e.as_error_resp() {
                    Some(payload) => {
                        Err(BlockchainError::GasEstimation(payload.message.to_string()))
                    }
                    None => Err(transport_error(op, e)),
                },
            }
        })
        .await
    }

    async fn call(&self, msg: &CallMessage) -> BlockchainResult<Bytes> {
        let op = "eth_call";
        let request = &to_rpc_request(msg);
        retry_idempotent(&self.retry, op, || async move {
            tracing::debug!(op, "RPC call");
            let fut = async { self.provider.call(request.clone()).await };
            match with_timeout(self.timeout_duration, op, fut).await? {
                Ok(output) => Ok(output),
                Err(e) => match e.as_error_resp() {
                    Some(payload) => {
                        Err(BlockchainError::CallReverted(payload.message.to_string()))
                    }
                    None => Err(transport_error(op, e)),
                },
            }
        })
        .await
    }

    async fn submit_transaction(&self, raw: &Bytes) -> BlockchainResult<TxHash> {
        // Never retried: a resend could reuse a stale nonce
        let op = "eth_sendRawTransaction";
        let fut = self.provider.send_raw_transaction(raw.as_ref());
        match with_timeout(self.timeout_duration, op, fut).await? {
            Ok(pending) => {
                let tx_hash = *pending.tx_hash();
                tracing::info!(tx_hash = %tx_hash, "Submitted transaction");
                Ok(tx_hash)
            }
            Err(e) => match e.as_error_resp() {
                Some(payload) => Err(BlockchainError::Submission(payload.message.to_string())),
                None => Err(transport_error(op, e)),
            },
        }
    }

    async fn receipt(&self, tx_hash: TxHash) -> BlockchainResult<Receipt> {
        self.read("eth_getTransactionReceipt", || async move {
            self.provider.get_transaction_receipt(tx_hash).await
        })
        .await?
        .map(convert_receipt)
        .ok_or(BlockchainError::ReceiptNotFound(tx_hash))
    }

    async fn code_at(&self, address: Address) -> BlockchainResult<Bytes> {
        self.read("eth_getCode", || async move {
            self.provider.get_code_at(address).await
        })
        .await
    }
}

impl std::fmt::Debug for RpcNodeClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RpcNodeClient")
            .field("rpc_url", &self.config.rpc_url)
            .field("expected_chain_id", &self.config.expected_chain_id)
            .field("timeout_secs", &self.config.rpc_timeout_secs)
            .finish()
    }
}
