//! Value types and error definitions shared by the blockchain subsystem.

use std::fmt;

use alloy::primitives::{Address, Bytes, TxHash, B256};
use thiserror::Error;

// Re-export NodeConfig from config module to avoid duplication
pub use crate::config::schema::NodeConfig;

/// Chain ID type for strong typing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ChainId(pub u64);

impl From<u64> for ChainId {
    fn from(id: u64) -> Self {
        Self(id)
    }
}

impl From<ChainId> for u64 {
    fn from(id: ChainId) -> Self {
        id.0
    }
}

impl fmt::Display for ChainId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Errors that can occur during blockchain operations.
#[derive(Debug, Error)]
pub enum BlockchainError {
    /// Private key string is not a valid secp256k1 scalar in hex.
    #[error("Invalid private key format: {0}")]
    InvalidKeyFormat(String),

    /// Address string could not be parsed.
    #[error("Invalid address '{input}': {reason}")]
    InvalidAddress { input: String, reason: String },

    /// Transaction hash string could not be parsed.
    #[error("Invalid transaction hash '{input}': {reason}")]
    InvalidHash { input: String, reason: String },

    /// Node unreachable or the RPC transport failed.
    #[error("RPC connection error during {op}: {reason}")]
    Connection { op: &'static str, reason: String },

    /// RPC request did not complete within the configured deadline.
    #[error("RPC {op} timed out after {secs} seconds")]
    Timeout { op: &'static str, secs: u64 },

    /// Gas estimation failed, usually because the call would revert.
    #[error("Gas estimation failed: {0}")]
    GasEstimation(String),

    /// A call argument does not fit its ABI type.
    #[error("Argument {index} out of range: {reason}")]
    ArgumentOutOfRange { index: usize, reason: String },

    /// Argument list does not match the method signature.
    #[error("Arguments do not match '{signature}': {reason}")]
    ArgumentMismatch { signature: String, reason: String },

    /// Method signature string is not of the form `name(type,...)`.
    #[error("Invalid method signature '{0}'")]
    InvalidSignature(String),

    /// Node rejected the signed transaction.
    #[error("Transaction rejected by node: {0}")]
    Submission(String),

    /// No receipt exists for the hash (not yet included, or never submitted).
    #[error("Receipt not found for transaction {0}")]
    ReceiptNotFound(TxHash),

    /// Receipt did not appear before the polling deadline.
    #[error("Transaction {tx_hash} not included after {secs} seconds")]
    ConfirmationTimeout { tx_hash: TxHash, secs: u64 },

    /// Transaction was included but execution failed.
    #[error("Transaction {0} was included but reverted")]
    TransactionFailed(TxHash),

    /// No code exists at an address expected to hold a contract.
    #[error("No contract code at {0}")]
    MissingCode(Address),

    /// Read-only contract call reverted.
    #[error("Contract call reverted: {0}")]
    CallReverted(String),

    /// Contract return data could not be decoded.
    #[error("Failed to decode return data: {0}")]
    Decode(String),

    /// Transaction request is missing a field required for signing.
    #[error("Transaction request incomplete: {0}")]
    IncompleteRequest(&'static str),

    /// Signing the transaction failed.
    #[error("Signing failed: {0}")]
    Signing(String),

    /// Chain configuration mismatch.
    #[error("Chain ID mismatch: expected {expected}, got {actual}")]
    ChainMismatch { expected: u64, actual: u64 },

    /// Deployment bytecode could not be loaded.
    #[error("Invalid contract bytecode: {0}")]
    InvalidBytecode(String),
}

impl BlockchainError {
    /// Whether the failed operation may be repeated safely.
    ///
    /// Only transport-level failures qualify. Callers must still restrict
    /// retries to idempotent reads.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Connection { .. } | Self::Timeout { .. })
    }
}

/// Result type for blockchain operations.
pub type BlockchainResult<T> = Result<T, BlockchainError>;

/// Network parameters fetched fresh for every transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChainParameters {
    pub chain_id: ChainId,
    /// Suggested gas price in wei.
    pub gas_price: u128,
    /// Pending transaction count of the sender.
    pub nonce: u64,
}

/// Call description used for gas estimation and read-only calls.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallMessage {
    pub from: Address,
    /// `None` means contract creation.
    pub to: Option<Address>,
    pub data: Bytes,
}

impl CallMessage {
    /// Message deploying `bytecode` from `from`.
    pub fn deployment(from: Address, bytecode: Bytes) -> Self {
        Self {
            from,
            to: None,
            data: bytecode,
        }
    }

    /// Message calling the contract at `to` with `data`.
    pub fn call(from: Address, to: Address, data: Bytes) -> Self {
        Self {
            from,
            to: Some(to),
            data,
        }
    }

    pub fn is_deployment(&self) -> bool {
        self.to.is_none()
    }
}

/// A single event record emitted during execution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogRecord {
    pub address: Address,
    pub topics: Vec<B256>,
    pub data: Bytes,
}

impl fmt::Display for LogRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{address: {}, topics: [", self.address)?;
        for (i, topic) in self.topics.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", topic)?;
        }
        write!(f, "], data: {}}}", self.data)
    }
}

/// The node's record of an included transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Receipt {
    pub transaction_hash: TxHash,
    pub block_number: u64,
    /// Zero address unless the transaction created a contract.
    pub contract_address: Address,
    pub status: bool,
    pub gas_used: u64,
    pub logs: Vec<LogRecord>,
}

impl Receipt {
    pub fn is_deployment(&self) -> bool {
        !self.contract_address.is_zero()
    }
}
