//! Transaction request building and signing.
//!
//! # Responsibilities
//! - Fetch fresh chain parameters (chain id, gas price, pending nonce)
//! - Estimate gas for the target call
//! - Assemble a complete request and sign it with the caller's identity

use alloy::network::TransactionBuilder;
use alloy::primitives::{Address, Bytes, U256};
use alloy::rpc::types::TransactionRequest as RpcTransactionRequest;

use crate::blockchain::client::NodeClient;
use crate::blockchain::types::{
    BlockchainError, BlockchainResult, CallMessage, ChainId, ChainParameters,
};
use crate::blockchain::wallet::{SignedTransaction, SigningIdentity};

/// A fully parameterized transaction, ready to sign.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransactionRequest {
    pub from: Address,
    /// `None` deploys `data` as contract init code.
    pub to: Option<Address>,
    pub nonce: u64,
    /// Gas price in wei.
    pub gas_price: u128,
    pub gas_limit: u64,
    /// Native currency sent along; always zero for this workflow.
    pub value: U256,
    pub data: Bytes,
    pub chain_id: ChainId,
}

impl TransactionRequest {
    /// Check that every field needed for a valid signature is populated.
    pub fn ensure_complete(&self) -> BlockchainResult<()> {
        if self.chain_id.0 == 0 {
            return Err(BlockchainError::IncompleteRequest("chain id"));
        }
        if self.gas_limit == 0 {
            return Err(BlockchainError::IncompleteRequest("gas limit"));
        }
        if self.to.is_none() && self.data.is_empty() {
            return Err(BlockchainError::IncompleteRequest("deployment bytecode"));
        }
        Ok(())
    }

    /// Address the contract will get if this request deploys one.
    pub fn created_address(&self) -> Option<Address> {
        self.to.is_none().then(|| self.from.create(self.nonce))
    }

    /// Maximum fee this request can spend, in wei.
    pub fn max_fee(&self) -> U256 {
        U256::from(self.gas_price) * U256::from(self.gas_limit)
    }

    fn to_rpc(&self) -> RpcTransactionRequest {
        let request = RpcTransactionRequest::default()
            .with_from(self.from)
            .with_nonce(self.nonce)
            .with_gas_price(self.gas_price)
            .with_gas_limit(self.gas_limit)
            .with_value(self.value)
            .with_chain_id(self.chain_id.0);

        match self.to {
            Some(to) => request.with_to(to).with_input(self.data.clone()),
            None => request.with_deploy_code(self.data.clone()),
        }
    }
}

/// Fetch the chain id, suggested gas price and pending nonce of `sender`.
///
/// The three reads are independent and issued concurrently.
pub async fn fetch_chain_parameters<C: NodeClient + ?Sized>(
    client: &C,
    sender: Address,
) -> BlockchainResult<ChainParameters> {
    let (chain_id, gas_price, nonce) = tokio::try_join!(
        client.chain_id(),
        client.suggest_gas_price(),
        client.pending_nonce(sender)
    )?;
    Ok(ChainParameters {
        chain_id,
        gas_price,
        nonce,
    })
}

/// Build a complete transaction request for `target`.
///
/// Chain parameters and the gas estimate are fetched concurrently. A failed
/// estimate is returned as `GasEstimation`; no fallback gas limit is
/// substituted. The nonce is not cached or incremented.
///
/// # Arguments
/// * `identity` - Signer whose address becomes the sender
/// * `client` - Node to query
/// * `target` - Recipient (or deployment) and call data; `target.from` is
///   overwritten with the identity's address
pub async fn build_request<C: NodeClient + ?Sized>(
    identity: &SigningIdentity,
    client: &C,
    target: &CallMessage,
) -> BlockchainResult<TransactionRequest> {
    let sender = identity.address();
    let msg = CallMessage {
        from: sender,
        ..target.clone()
    };

    let (params, gas_limit) =
        tokio::try_join!(fetch_chain_parameters(client, sender), client.estimate_gas(&msg))?;

    tracing::debug!(
        from = %sender,
        nonce = params.nonce,
        gas_price = params.gas_price,
        gas_limit,
        chain_id = params.chain_id.0,
        "Transaction request built"
    );

    Ok(TransactionRequest {
        from: sender,
        to: msg.to,
        nonce: params.nonce,
        gas_price: params.gas_price,
        gas_limit,
        value: U256::ZERO,
        data: msg.data,
        chain_id: params.chain_id,
    })
}

/// Sign a request after checking it is complete.
pub async fn sign_request(
    identity: &SigningIdentity,
    request: &TransactionRequest,
) -> BlockchainResult<SignedTransaction> {
    request.ensure_complete()?;
    if request.from != identity.address() {
        return Err(BlockchainError::Signing(format!(
            "request sender {} does not match signer {}",
            request.from,
            identity.address()
        )));
    }
    identity
        .sign_transaction(request.to_rpc(), request.chain_id.0)
        .await
}
