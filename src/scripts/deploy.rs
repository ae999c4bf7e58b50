//! Deploy the token contract.

use std::fmt;

use alloy::primitives::{Address, Bytes, TxHash};

use crate::blockchain::client::NodeClient;
use crate::blockchain::receipt::wait_for_receipt;
use crate::blockchain::transaction::{build_request, sign_request, TransactionRequest};
use crate::blockchain::types::{BlockchainError, CallMessage, Receipt};
use crate::blockchain::wallet::SigningIdentity;
use crate::scripts::{write_title, ScriptResult, Step, StepExt, WaitOptions};

/// Outcome of a deployment.
#[derive(Debug, Clone)]
pub struct DeployReport {
    pub request: TransactionRequest,
    pub tx_hash: TxHash,
    pub contract_address: Address,
    /// Present when the command waited for inclusion.
    pub receipt: Option<Receipt>,
    /// Size of the code found at `contract_address` after inclusion.
    pub code_len: Option<usize>,
}

/// Deploy `bytecode` from `identity`.
///
/// With `wait`, blocks until the receipt is available, fails if the
/// deployment reverted, and confirms code exists at the new address.
pub async fn run<C: NodeClient + ?Sized>(
    client: &C,
    identity: &SigningIdentity,
    bytecode: Bytes,
    wait: Option<WaitOptions>,
) -> ScriptResult<DeployReport> {
    let msg = CallMessage::deployment(identity.address(), bytecode);

    let request = build_request(identity, client, &msg)
        .await
        .step(Step::BuildRequest)?;
    let signed = sign_request(identity, &request).await.step(Step::Sign)?;
    let tx_hash = client
        .submit_transaction(&signed.raw)
        .await
        .step(Step::Submit)?;

    let mut contract_address = request.created_address().unwrap_or_default();
    tracing::info!(tx_hash = %tx_hash, contract = %contract_address, "Deployment submitted");

    let Some(wait) = wait else {
        return Ok(DeployReport {
            request,
            tx_hash,
            contract_address,
            receipt: None,
            code_len: None,
        });
    };

    let receipt = wait_for_receipt(client, tx_hash, wait.poll_interval, wait.timeout)
        .await
        .step(Step::WaitForReceipt)?;
    if !receipt.status {
        return Err(BlockchainError::TransactionFailed(tx_hash)).step(Step::WaitForReceipt);
    }
    if receipt.is_deployment() {
        contract_address = receipt.contract_address;
    }

    let code = client.code_at(contract_address).await.step(Step::GetCode)?;
    if code.is_empty() {
        return Err(BlockchainError::MissingCode(contract_address)).step(Step::GetCode);
    }

    Ok(DeployReport {
        request,
        tx_hash,
        contract_address,
        receipt: Some(receipt),
        code_len: Some(code.len()),
    })
}

impl fmt::Display for DeployReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_title(f, "deploy", "This command deploys the token contract to the connected node.")?;
        writeln!(f, "Deployer:             {}", self.request.from)?;
        writeln!(f, "Current nonce:        {}", self.request.nonce)?;
        writeln!(f, "Estimated gas:        {}", self.request.gas_limit)?;
        writeln!(f, "Suggested gas price:  {}", self.request.gas_price)?;
        writeln!(f, "Max fee (wei):        {}", self.request.max_fee())?;
        writeln!(f, "Chain ID:             {}", self.request.chain_id)?;
        writeln!(f, "\n*********** Success ***********")?;
        writeln!(f, "The token contract was deployed in transaction {}", self.tx_hash)?;
        writeln!(f, "The contract address is {}", self.contract_address)?;
        match (&self.receipt, self.code_len) {
            (Some(receipt), Some(code_len)) => {
                writeln!(
                    f,
                    "Included in block {} using {} gas",
                    receipt.block_number, receipt.gas_used
                )?;
                write!(f, "Length of code at contract address: {}", code_len)
            }
            _ => write!(f, "Not waiting for inclusion; use `receipt {}` to check.", self.tx_hash),
        }
    }
}
