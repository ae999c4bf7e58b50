//! Blockchain integration subsystem.
//!
//! # Data Flow
//! ```text
//! hex private key
//!     → wallet.rs (SigningIdentity: key → address, signing)
//! method signature + args
//!     → encoding.rs (selector || 32-byte words)
//! identity + CallMessage
//!     → transaction.rs (chain params + gas estimate via client.rs → TransactionRequest)
//!     → wallet.rs (signed raw bytes)
//!     → client.rs (submit raw transaction)
//!     → receipt.rs (poll until included)
//! ```
//!
//! # Security Constraints
//! - Private keys are never logged or serialized
//! - All RPC calls have configurable timeouts
//! - Raw transaction submission is never retried

pub mod client;
pub mod contract;
pub mod encoding;
pub mod receipt;
pub mod transaction;
pub mod types;
pub mod wallet;

pub use client::{NodeClient, RpcNodeClient};
pub use contract::{TokenContract, TokenInfo};
pub use encoding::{encode_call, CallArg};
pub use transaction::{build_request, sign_request, TransactionRequest};
pub use types::{BlockchainError, BlockchainResult, CallMessage, ChainId, NodeConfig, Receipt};
pub use wallet::{SignedTransaction, SigningIdentity};

use alloy::primitives::Address;

/// Parse a 20-byte address from hex, accepting any checksum casing.
pub fn parse_address(input: &str) -> BlockchainResult<Address> {
    input.trim().parse().map_err(|e| BlockchainError::InvalidAddress {
        input: input.to_string(),
        reason: format!("{}", e),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_address() {
        let addr = parse_address("0xf39fd6e51aad88f6f4ce6ab8827279cfffb92266").unwrap();
        assert_eq!(addr.to_string(), "0xf39Fd6e51aad88F6F4ce6aB8827279cffFb92266");
    }

    #[test]
    fn test_parse_address_rejects_bad_input() {
        for input in ["", "0x1234", "0xzzf39fd6e51aad88f6f4ce6ab8827279cfffb922"] {
            assert!(matches!(parse_address(input), Err(BlockchainError::InvalidAddress { .. })));
        }
    }
}
