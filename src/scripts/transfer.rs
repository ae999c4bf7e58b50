//! Query balances and transfer tokens between two accounts.

use std::fmt;

use alloy::primitives::{Address, TxHash, U256};

use crate::blockchain::client::NodeClient;
use crate::blockchain::contract::TokenContract;
use crate::blockchain::encoding::{encode_call, CallArg, WORD_SIZE};
use crate::blockchain::receipt::wait_for_receipt;
use crate::blockchain::transaction::{build_request, sign_request, TransactionRequest};
use crate::blockchain::types::{BlockchainError, CallMessage, Receipt};
use crate::blockchain::wallet::SigningIdentity;
use crate::scripts::{format_amount, write_title, ScriptResult, Step, StepExt, WaitOptions};

/// Canonical signature of the ERC20 transfer method.
pub const TRANSFER_SIGNATURE: &str = "transfer(address,uint256)";

/// Sender and recipient token balances at one point in time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Balances {
    pub sender: U256,
    pub recipient: U256,
}

#[derive(Debug, Clone)]
pub struct TransferReport {
    pub contract: Address,
    pub token_name: String,
    pub decimals: u8,
    pub recipient: Address,
    pub amount: U256,
    pub request: TransactionRequest,
    pub tx_hash: TxHash,
    pub before: Balances,
    /// Present when the command waited for inclusion.
    pub after: Option<(Receipt, Balances)>,
}

async fn balances<C: NodeClient + ?Sized>(
    token: &TokenContract<'_, C>,
    sender: Address,
    recipient: Address,
) -> ScriptResult<Balances> {
    let (sender, recipient) =
        tokio::try_join!(token.balance_of(sender), token.balance_of(recipient))
            .step(Step::QueryToken)?;
    Ok(Balances { sender, recipient })
}

/// Transfer `amount` base units of the token at `contract` to `recipient`.
///
/// # Arguments
/// * `amount` - Decimal integer in the token's smallest unit
pub async fn run<C: NodeClient + ?Sized>(
    client: &C,
    identity: &SigningIdentity,
    contract: Address,
    recipient: Address,
    amount: &str,
    wait: Option<WaitOptions>,
) -> ScriptResult<TransferReport> {
    let sender = identity.address();

    // Encode first so a bad amount fails before any network traffic
    let data = encode_call(
        TRANSFER_SIGNATURE,
        &[recipient.into(), CallArg::Decimal(amount.to_string())],
    )
    .step(Step::EncodeCall)?;
    let amount = U256::from_be_slice(&data[4 + WORD_SIZE..4 + 2 * WORD_SIZE]);

    let token = TokenContract::new(contract, client);
    let (token_name, decimals) =
        tokio::try_join!(token.name(), token.decimals()).step(Step::QueryToken)?;
    let before = balances(&token, sender, recipient).await?;

    let msg = CallMessage::call(sender, contract, data);
    let request = build_request(identity, client, &msg)
        .await
        .step(Step::BuildRequest)?;
    let signed = sign_request(identity, &request).await.step(Step::Sign)?;
    let tx_hash = client
        .submit_transaction(&signed.raw)
        .await
        .step(Step::Submit)?;

    tracing::info!(
        tx_hash = %tx_hash,
        token = %contract,
        to = %recipient,
        amount = %amount,
        "Transfer submitted"
    );

    let after = match wait {
        Some(wait) => {
            let receipt = wait_for_receipt(client, tx_hash, wait.poll_interval, wait.timeout)
                .await
                .step(Step::WaitForReceipt)?;
            if !receipt.status {
                return Err(BlockchainError::TransactionFailed(tx_hash)).step(Step::WaitForReceipt);
            }
            let balances = balances(&token, sender, recipient).await?;
            Some((receipt, balances))
        }
        None => None,
    };

    Ok(TransferReport {
        contract,
        token_name,
        decimals,
        recipient,
        amount,
        request,
        tx_hash,
        before,
        after,
    })
}

impl fmt::Display for TransferReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sender = self.request.from;
        let amount = |v: U256| format_amount(v, self.decimals);

        write_title(
            f,
            "transfer",
            "This command queries token balances and transfers tokens between accounts.",
        )?;
        writeln!(f, "Token contract loaded at address: {}", self.contract)?;
        writeln!(f, "Token name: {}\n", self.token_name)?;
        writeln!(f, "Balance of sender    {}: {}", sender, amount(self.before.sender))?;
        writeln!(
            f,
            "Balance of recipient {}: {}\n",
            self.recipient,
            amount(self.before.recipient)
        )?;
        writeln!(f, "Transferring {}", amount(self.amount))?;
        writeln!(f, "Current nonce:        {}", self.request.nonce)?;
        writeln!(f, "Estimated gas:        {}", self.request.gas_limit)?;
        writeln!(f, "Suggested gas price:  {}", self.request.gas_price)?;
        writeln!(f, "Max fee (wei):        {}", self.request.max_fee())?;
        writeln!(f, "\n*********** Success ***********")?;
        write!(f, "The transfer was submitted in transaction {}", self.tx_hash)?;

        if let Some((receipt, after)) = &self.after {
            writeln!(
                f,
                "\nIncluded in block {} using {} gas\n",
                receipt.block_number, receipt.gas_used
            )?;
            writeln!(f, "Balance of sender    {}: {}", sender, amount(after.sender))?;
            write!(f, "Balance of recipient {}: {}", self.recipient, amount(after.recipient))?;
        }
        Ok(())
    }
}
