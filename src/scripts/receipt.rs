//! Print a transaction receipt.

use std::fmt;

use alloy::primitives::TxHash;

use crate::blockchain::client::NodeClient;
use crate::blockchain::types::Receipt;
use crate::scripts::{write_title, ScriptResult, Step, StepExt};

#[derive(Debug, Clone)]
pub struct ReceiptReport {
    pub receipt: Receipt,
    /// Code size at the created contract; `None` if nothing was deployed.
    pub code_len: Option<usize>,
}

/// Look up the receipt of `tx_hash` once, without waiting.
pub async fn run<C: NodeClient + ?Sized>(
    client: &C,
    tx_hash: TxHash,
) -> ScriptResult<ReceiptReport> {
    let receipt = client.receipt(tx_hash).await.step(Step::LookupReceipt)?;

    let code_len = if receipt.is_deployment() {
        let code = client
            .code_at(receipt.contract_address)
            .await
            .step(Step::GetCode)?;
        Some(code.len())
    } else {
        None
    };

    Ok(ReceiptReport { receipt, code_len })
}

impl fmt::Display for ReceiptReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let r = &self.receipt;
        write_title(
            f,
            "receipt",
            "This command prints information from the transaction receipt.",
        )?;
        writeln!(f, "Transaction:      {}\n", r.transaction_hash)?;
        writeln!(f, "Blocknumber:      {}", r.block_number)?;
        writeln!(f, "Contract address: {}", r.contract_address)?;
        writeln!(f, "Status:           {}", if r.status { "1 (success)" } else { "0 (failed)" })?;
        writeln!(f, "Gas used:         {}", r.gas_used)?;
        if r.logs.is_empty() {
            writeln!(f, "Logs:             []")?;
        } else {
            writeln!(f, "Logs:")?;
            for log in &r.logs {
                writeln!(f, "  {}", log)?;
            }
        }
        match self.code_len {
            Some(len) => write!(f, "Length of code at contract address: {}", len),
            None => write!(f, "Length of code at contract address: n/a (not a deployment)"),
        }
    }
}
