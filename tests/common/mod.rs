//! Shared utilities for integration testing.
//!
//! `SimulatedNode` is an in-process stand-in for a development chain. It
//! accepts real signed transactions, recovers their sender, enforces
//! chain id and nonces, and runs a minimal Maltcoin ledger so the scripts
//! can be exercised end to end without a running node.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use alloy::consensus::transaction::SignerRecoverable;
use alloy::consensus::{Transaction, TxEnvelope};
use alloy::eips::eip2718::Decodable2718;
use alloy::primitives::{Address, Bytes, TxHash, TxKind, U256};
use alloy::sol_types::{SolEvent, SolInterface, SolValue};
use async_trait::async_trait;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

use maltcoin_scripts::blockchain::contract::IMaltcoin;
use maltcoin_scripts::blockchain::types::{
    BlockchainError, BlockchainResult, CallMessage, ChainId, LogRecord, Receipt,
};
use maltcoin_scripts::blockchain::NodeClient;
use maltcoin_scripts::scripts::WaitOptions;

/// Chain id of go-ethereum style simulated backends.
pub const TEST_CHAIN_ID: u64 = 1337;

/// Placeholder init code; the simulated node does not execute bytecode.
pub const TEST_BYTECODE: &[u8] = &[0x60, 0x80, 0x60, 0x40, 0x52];

pub const GAS_PRICE: u128 = 1_000_000_000;
const DEPLOY_GAS: u64 = 1_200_000;
const TRANSFER_GAS: u64 = 51_000;

/// 10^18, one whole token.
pub fn ten_18() -> U256 {
    U256::from(10u64).pow(U256::from(18u64))
}

/// Supply minted to the deployer.
pub fn initial_supply() -> U256 {
    U256::from(10_000u64) * ten_18()
}

pub fn fast_wait() -> WaitOptions {
    WaitOptions {
        poll_interval: Duration::from_millis(5),
        timeout: Duration::from_secs(2),
    }
}

/// Start a JSON-RPC endpoint that answers every request with `body`.
///
/// Returns the URL to connect to.
pub async fn start_rpc_stub(body: &'static str) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        loop {
            match listener.accept().await {
                Ok((mut socket, _)) => {
                    tokio::spawn(async move {
                        read_request(&mut socket).await;
                        let response = format!(
                            concat!(
                                "HTTP/1.1 200 OK\r\n",
                                "Content-Type: application/json\r\n",
                                "Content-Length: {}\r\n",
                                "Connection: close\r\n\r\n{}"
                            ),
                            body.len(),
                            body
                        );
                        let _ = socket.write_all(response.as_bytes()).await;
                        let _ = socket.shutdown().await;
                    });
                }
                Err(_) => break,
            }
        }
    });

    format!("http://{}", addr)
}

/// Consume one HTTP request: headers plus `Content-Length` bytes of body.
async fn read_request(socket: &mut TcpStream) {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 4096];
    loop {
        if let Some(end) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
            let headers = String::from_utf8_lossy(&buf[..end]).to_ascii_lowercase();
            let body_len = headers
                .lines()
                .find_map(|line| line.strip_prefix("content-length:"))
                .and_then(|v| v.trim().parse::<usize>().ok())
                .unwrap_or(0);
            if buf.len() >= end + 4 + body_len {
                return;
            }
        }
        match socket.read(&mut chunk).await {
            Ok(0) | Err(_) => return,
            Ok(n) => buf.extend_from_slice(&chunk[..n]),
        }
    }
}

#[derive(Default)]
struct Ledger {
    balances: HashMap<Address, U256>,
    total_supply: U256,
}

#[derive(Default)]
struct State {
    nonces: HashMap<Address, u64>,
    tokens: HashMap<Address, Ledger>,
    code: HashMap<Address, Bytes>,
    receipts: HashMap<TxHash, Receipt>,
    block_number: u64,
}

pub struct SimulatedNode {
    chain_id: u64,
    state: Mutex<State>,
    pub nonce_queries: AtomicU32,
    pub submissions: AtomicU32,
    /// Include the next transaction with a failed status and no effects.
    pub revert_next: AtomicBool,
    /// Deploy contracts without storing their code.
    pub discard_code: AtomicBool,
}

impl SimulatedNode {
    pub fn new() -> Self {
        Self::with_chain_id(TEST_CHAIN_ID)
    }

    pub fn with_chain_id(chain_id: u64) -> Self {
        Self {
            chain_id,
            state: Mutex::new(State::default()),
            nonce_queries: AtomicU32::new(0),
            submissions: AtomicU32::new(0),
            revert_next: AtomicBool::new(false),
            discard_code: AtomicBool::new(false),
        }
    }

    pub fn block_number(&self) -> u64 {
        self.state.lock().unwrap().block_number
    }
}

fn transfer_log(token: Address, from: Address, to: Address, value: U256) -> LogRecord {
    LogRecord {
        address: token,
        topics: vec![IMaltcoin::Transfer::SIGNATURE_HASH, from.into_word(), to.into_word()],
        data: Bytes::from(value.to_be_bytes::<32>().to_vec()),
    }
}

impl Ledger {
    fn mint(owner: Address) -> Self {
        let mut ledger = Ledger {
            total_supply: initial_supply(),
            ..Default::default()
        };
        ledger.balances.insert(owner, initial_supply());
        ledger
    }

    fn balance(&self, account: Address) -> U256 {
        self.balances.get(&account).copied().unwrap_or_default()
    }

    /// Move tokens, or explain why the contract would revert.
    fn transfer(&mut self, from: Address, to: Address, amount: U256) -> Result<(), String> {
        if to.is_zero() {
            return Err("execution reverted: ERC20: transfer to the zero address".into());
        }
        let from_balance = self.balance(from);
        if from_balance < amount {
            return Err("execution reverted: ERC20: transfer amount exceeds balance".into());
        }
        self.balances.insert(from, from_balance - amount);
        let to_balance = self.balance(to);
        self.balances.insert(to, to_balance + amount);
        Ok(())
    }
}

fn decode_call(data: &[u8]) -> Result<IMaltcoin::IMaltcoinCalls, String> {
    IMaltcoin::IMaltcoinCalls::abi_decode(data).map_err(|e| format!("execution reverted: {}", e))
}

#[async_trait]
impl NodeClient for SimulatedNode {
    async fn chain_id(&self) -> BlockchainResult<ChainId> {
        Ok(ChainId(self.chain_id))
    }

    async fn suggest_gas_price(&self) -> BlockchainResult<u128> {
        Ok(GAS_PRICE)
    }

    async fn pending_nonce(&self, address: Address) -> BlockchainResult<u64> {
        self.nonce_queries.fetch_add(1, Ordering::SeqCst);
        let state = self.state.lock().unwrap();
        Ok(state.nonces.get(&address).copied().unwrap_or_default())
    }

    async fn estimate_gas(&self, msg: &CallMessage) -> BlockchainResult<u64> {
        let Some(to) = msg.to else {
            return Ok(DEPLOY_GAS);
        };
        let mut state = self.state.lock().unwrap();
        let ledger = state
            .tokens
            .get_mut(&to)
            .ok_or_else(|| BlockchainError::GasEstimation(format!("no contract at {}", to)))?;

        match decode_call(&msg.data).map_err(BlockchainError::GasEstimation)? {
            IMaltcoin::IMaltcoinCalls::transfer(call) => {
                // Dry run against a snapshot of the two balances
                let from_before = ledger.balance(msg.from);
                let to_before = ledger.balance(call.recipient);
                let result = ledger.transfer(msg.from, call.recipient, call.amount);
                ledger.balances.insert(msg.from, from_before);
                ledger.balances.insert(call.recipient, to_before);
                result.map_err(BlockchainError::GasEstimation)?;
                Ok(TRANSFER_GAS)
            }
            _ => Ok(30_000),
        }
    }

    async fn call(&self, msg: &CallMessage) -> BlockchainResult<Bytes> {
        let Some(to) = msg.to else {
            return Err(BlockchainError::CallReverted("call without recipient".into()));
        };
        let state = self.state.lock().unwrap();
        let Some(ledger) = state.tokens.get(&to) else {
            // Calling an account without code succeeds with empty output
            return Ok(Bytes::new());
        };

        let output = match decode_call(&msg.data).map_err(BlockchainError::CallReverted)? {
            IMaltcoin::IMaltcoinCalls::name(_) => "Maltcoin".to_string().abi_encode(),
            IMaltcoin::IMaltcoinCalls::symbol(_) => "MALT".to_string().abi_encode(),
            IMaltcoin::IMaltcoinCalls::decimals(_) => <alloy::sol_types::sol_data::Uint<8> as alloy::sol_types::SolType>::abi_encode(&18u8),
            IMaltcoin::IMaltcoinCalls::totalSupply(_) => ledger.total_supply.abi_encode(),
            IMaltcoin::IMaltcoinCalls::balanceOf(call) => ledger.balance(call.account).abi_encode(),
            IMaltcoin::IMaltcoinCalls::transfer(call) => {
                (ledger.balance(msg.from) >= call.amount).abi_encode()
            }
        };
        Ok(Bytes::from(output))
    }

    async fn submit_transaction(&self, raw: &Bytes) -> BlockchainResult<TxHash> {
        self.submissions.fetch_add(1, Ordering::SeqCst);

        let envelope = TxEnvelope::decode_2718(&mut raw.as_ref())
            .map_err(|e| BlockchainError::Submission(format!("rlp: {}", e)))?;
        let from = envelope
            .recover_signer()
            .map_err(|e| BlockchainError::Submission(format!("invalid sender: {}", e)))?;

        if envelope.chain_id() != Some(self.chain_id) {
            return Err(BlockchainError::Submission("invalid chain id for signer".into()));
        }

        let mut state = self.state.lock().unwrap();
        let expected_nonce = state.nonces.get(&from).copied().unwrap_or_default();
        if envelope.nonce() < expected_nonce {
            return Err(BlockchainError::Submission("nonce too low".into()));
        }
        if envelope.nonce() > expected_nonce {
            return Err(BlockchainError::Submission("nonce too high".into()));
        }

        let tx_hash = *envelope.tx_hash();
        let reverted = self.revert_next.swap(false, Ordering::SeqCst);
        let (status, contract_address, logs) = match envelope.kind() {
            _ if reverted => (false, Address::ZERO, Vec::new()),
            TxKind::Create => {
                let address = from.create(expected_nonce);
                state.tokens.insert(address, Ledger::mint(from));
                if !self.discard_code.load(Ordering::SeqCst) {
                    state.code.insert(address, envelope.input().clone());
                }
                let mint = transfer_log(address, Address::ZERO, from, initial_supply());
                (true, address, vec![mint])
            }
            TxKind::Call(to) => {
                let outcome = match state.tokens.get_mut(&to) {
                    Some(ledger) => match decode_call(envelope.input()) {
                        Ok(IMaltcoin::IMaltcoinCalls::transfer(call)) => ledger
                            .transfer(from, call.recipient, call.amount)
                            .map(|()| vec![transfer_log(to, from, call.recipient, call.amount)]),
                        Ok(_) => Ok(Vec::new()),
                        Err(e) => Err(e),
                    },
                    None => Ok(Vec::new()),
                };
                match outcome {
                    Ok(logs) => (true, Address::ZERO, logs),
                    Err(_) => (false, Address::ZERO, Vec::new()),
                }
            }
        };

        state.nonces.insert(from, expected_nonce + 1);
        state.block_number += 1;
        let receipt = Receipt {
            transaction_hash: tx_hash,
            block_number: state.block_number,
            contract_address,
            status,
            gas_used: if contract_address.is_zero() { TRANSFER_GAS } else { DEPLOY_GAS },
            logs,
        };
        state.receipts.insert(tx_hash, receipt);

        Ok(tx_hash)
    }

    async fn receipt(&self, tx_hash: TxHash) -> BlockchainResult<Receipt> {
        let state = self.state.lock().unwrap();
        state
            .receipts
            .get(&tx_hash)
            .cloned()
            .ok_or(BlockchainError::ReceiptNotFound(tx_hash))
    }

    async fn code_at(&self, address: Address) -> BlockchainResult<Bytes> {
        let state = self.state.lock().unwrap();
        Ok(state.code.get(&address).cloned().unwrap_or_default())
    }
}
