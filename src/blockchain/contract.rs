//! Maltcoin token binding and deployment bytecode loading.
//!
//! The contract itself is compiled elsewhere; this module only knows its
//! interface and how to read a compiled artifact from disk.

use std::path::Path;

use alloy::primitives::{Address, Bytes, U256};
use alloy::sol;
use alloy::sol_types::SolCall;

use crate::blockchain::client::NodeClient;
use crate::blockchain::types::{BlockchainError, BlockchainResult, CallMessage};

sol! {
    /// ERC20 interface exposed by the Maltcoin contract.
    interface IMaltcoin {
        function name() external view returns (string memory);
        function symbol() external view returns (string memory);
        function decimals() external view returns (uint8);
        function totalSupply() external view returns (uint256);
        function balanceOf(address account) external view returns (uint256);
        function transfer(address recipient, uint256 amount) external returns (bool);

        event Transfer(address indexed from, address indexed to, uint256 value);
    }
}

/// Name, symbol, decimals and supply of a deployed token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenInfo {
    pub name: String,
    pub symbol: String,
    pub decimals: u8,
    pub total_supply: U256,
}

/// Read-only view of a deployed token, queried through any [`NodeClient`].
pub struct TokenContract<'a, C: ?Sized> {
    address: Address,
    client: &'a C,
}

impl<'a, C: NodeClient + ?Sized> TokenContract<'a, C> {
    pub fn new(address: Address, client: &'a C) -> Self {
        Self { address, client }
    }

    pub fn address(&self) -> Address {
        self.address
    }

    pub async fn name(&self) -> BlockchainResult<String> {
        self.query(IMaltcoin::nameCall {}).await
    }

    pub async fn symbol(&self) -> BlockchainResult<String> {
        self.query(IMaltcoin::symbolCall {}).await
    }

    pub async fn decimals(&self) -> BlockchainResult<u8> {
        self.query(IMaltcoin::decimalsCall {}).await
    }

    pub async fn total_supply(&self) -> BlockchainResult<U256> {
        self.query(IMaltcoin::totalSupplyCall {}).await
    }

    pub async fn balance_of(&self, account: Address) -> BlockchainResult<U256> {
        self.query(IMaltcoin::balanceOfCall { account }).await
    }

    /// Fetch all token settings at once.
    pub async fn info(&self) -> BlockchainResult<TokenInfo> {
        let (name, symbol, decimals, total_supply) = tokio::try_join!(
            self.name(),
            self.symbol(),
            self.decimals(),
            self.total_supply()
        )?;
        Ok(TokenInfo {
            name,
            symbol,
            decimals,
            total_supply,
        })
    }

    async fn query<T: SolCall>(&self, call: T) -> BlockchainResult<T::Return> {
        let msg = CallMessage::call(Address::ZERO, self.address, Bytes::from(call.abi_encode()));
        let output = self.client.call(&msg).await?;
        if output.is_empty() {
            return Err(BlockchainError::Decode(format!(
                "{} returned no data; is {} a token contract?",
                T::SIGNATURE,
                self.address
            )));
        }
        T::abi_decode_returns(&output).map_err(|e| BlockchainError::Decode(e.to_string()))
    }
}

/// Load deployment bytecode from a compiled artifact.
///
/// Accepts raw hex (optionally `0x`-prefixed, whitespace ignored) or a JSON
/// artifact whose `bytecode` field is either a hex string or an object with
/// an `object` string, as emitted by solc and Foundry.
pub fn load_bytecode(path: &Path) -> BlockchainResult<Bytes> {
    let content = std::fs::read_to_string(path).map_err(|e| {
        BlockchainError::InvalidBytecode(format!("cannot read {}: {}", path.display(), e))
    })?;
    parse_bytecode(&content)
}

/// Parse bytecode from the text of an artifact. See [`load_bytecode`].
pub fn parse_bytecode(content: &str) -> BlockchainResult<Bytes> {
    let trimmed = content.trim();

    let hex_text = if trimmed.starts_with('{') {
        let artifact: serde_json::Value = serde_json::from_str(trimmed).map_err(|e| {
            BlockchainError::InvalidBytecode(format!("invalid JSON artifact: {}", e))
        })?;
        match artifact.get("bytecode") {
            Some(serde_json::Value::String(s)) => s.clone(),
            Some(serde_json::Value::Object(obj)) => obj
                .get("object")
                .and_then(|v| v.as_str())
                .map(str::to_string)
                .ok_or_else(|| {
                    BlockchainError::InvalidBytecode("bytecode.object missing".to_string())
                })?,
            _ => {
                return Err(BlockchainError::InvalidBytecode(
                    "artifact has no bytecode field".to_string(),
                ))
            }
        }
    } else {
        trimmed.split_whitespace().collect()
    };

    let hex_text = hex_text.strip_prefix("0x").unwrap_or(&hex_text);
    if hex_text.is_empty() {
        return Err(BlockchainError::InvalidBytecode("bytecode is empty".to_string()));
    }

    alloy::primitives::hex::decode(hex_text)
        .map(Bytes::from)
        .map_err(|e| BlockchainError::InvalidBytecode(e.to_string()))
}
