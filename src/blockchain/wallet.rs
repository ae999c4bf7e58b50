//! Signing identity derived from a raw private key.
//!
//! # Security
//! - Keys are accepted only as a hex string handed in by the caller
//! - Keys are never logged or serialized; `Debug` shows the address only

use alloy::eips::eip2718::Encodable2718;
use alloy::network::{EthereumWallet, TransactionBuilder};
use alloy::primitives::{Address, Bytes, TxHash};
use alloy::rpc::types::TransactionRequest as RpcTransactionRequest;
use alloy::signers::local::PrivateKeySigner;
use alloy::signers::Signer;

use crate::blockchain::types::{BlockchainError, BlockchainResult};

/// Length of a secp256k1 scalar in hex characters.
const PRIVATE_KEY_HEX_LEN: usize = 64;

/// A signed, EIP-2718 encoded transaction ready for `eth_sendRawTransaction`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedTransaction {
    pub raw: Bytes,
    pub hash: TxHash,
}

/// Private key plus the address it controls.
///
/// The address is always recomputed from the key by the signer and never
/// stored separately.
#[derive(Clone)]
pub struct SigningIdentity {
    signer: PrivateKeySigner,
}

impl SigningIdentity {
    /// Derive an identity from a hex-encoded private key.
    ///
    /// # Arguments
    /// * `private_key_hex` - 64 hex characters, with or without 0x prefix
    ///
    /// # Errors
    /// `InvalidKeyFormat` for a wrong length, non-hex characters, or a
    /// scalar that is zero or not below the curve order.
    pub fn from_hex(private_key_hex: &str) -> BlockchainResult<Self> {
        let key_hex = private_key_hex
            .trim()
            .strip_prefix("0x")
            .unwrap_or(private_key_hex.trim());

        if key_hex.len() != PRIVATE_KEY_HEX_LEN {
            return Err(BlockchainError::InvalidKeyFormat(format!(
                "expected {} hex characters, got {}",
                PRIVATE_KEY_HEX_LEN,
                key_hex.len()
            )));
        }
        if !key_hex.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(BlockchainError::InvalidKeyFormat(
                "key contains non-hex characters".to_string(),
            ));
        }

        let signer: PrivateKeySigner = key_hex
            .parse()
            .map_err(|e| BlockchainError::InvalidKeyFormat(format!("{}", e)))?;

        tracing::debug!(address = %signer.address(), "Signing identity derived");

        Ok(Self { signer })
    }

    /// Generate a fresh random identity.
    pub fn random() -> Self {
        Self {
            signer: PrivateKeySigner::random(),
        }
    }

    /// Get the identity's address.
    pub fn address(&self) -> Address {
        self.signer.address()
    }

    /// Sign a fully populated alloy transaction request.
    ///
    /// The request must carry nonce, gas price, gas limit and chain id; the
    /// wallet only attaches the signature.
    pub async fn sign_transaction(
        &self,
        request: RpcTransactionRequest,
        chain_id: u64,
    ) -> BlockchainResult<SignedTransaction> {
        let signer = self.signer.clone().with_chain_id(Some(chain_id));
        let wallet = EthereumWallet::from(signer);

        let envelope = request
            .build(&wallet)
            .await
            .map_err(|e| BlockchainError::Signing(e.to_string()))?;

        Ok(SignedTransaction {
            hash: *envelope.tx_hash(),
            raw: Bytes::from(envelope.encoded_2718()),
        })
    }
}

impl std::fmt::Debug for SigningIdentity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SigningIdentity")
            .field("address", &self.address())
            .finish_non_exhaustive()
    }
}
