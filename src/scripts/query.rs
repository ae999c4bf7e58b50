//! Read token settings and balances.

use std::fmt;

use alloy::primitives::{Address, U256};

use crate::blockchain::client::NodeClient;
use crate::blockchain::contract::{TokenContract, TokenInfo};
use crate::scripts::{format_amount, write_title, ScriptResult, Step, StepExt};

#[derive(Debug, Clone)]
pub struct QueryReport {
    pub contract: Address,
    pub info: TokenInfo,
    pub holder_balance: Option<(Address, U256)>,
}

pub async fn run<C: NodeClient + ?Sized>(
    client: &C,
    contract: Address,
    holder: Option<Address>,
) -> ScriptResult<QueryReport> {
    let token = TokenContract::new(contract, client);
    let info = token.info().await.step(Step::QueryToken)?;

    let holder_balance = match holder {
        Some(holder) => Some((holder, token.balance_of(holder).await.step(Step::QueryToken)?)),
        None => None,
    };

    Ok(QueryReport {
        contract,
        info,
        holder_balance,
    })
}

impl fmt::Display for QueryReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_title(f, "query", "This command reads the settings of a deployed token contract.")?;
        writeln!(f, "Token contract:   {}", self.contract)?;
        writeln!(f, "Token name:       {}", self.info.name)?;
        writeln!(f, "Token symbol:     {}", self.info.symbol)?;
        writeln!(f, "Decimals:         {}", self.info.decimals)?;
        write!(
            f,
            "Total supply:     {}",
            format_amount(self.info.total_supply, self.info.decimals)
        )?;
        if let Some((holder, balance)) = self.holder_balance {
            write!(
                f,
                "\nBalance of {}: {}",
                holder,
                format_amount(balance, self.info.decimals)
            )?;
        }
        Ok(())
    }
}
