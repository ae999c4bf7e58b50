//! Command drivers.
//!
//! Each driver performs exactly one action against a [`NodeClient`] and
//! returns a report whose `Display` impl is the human-readable output.
//! Every failure is tagged with the [`Step`] it happened in; nothing is
//! retried or rolled back here.

use std::fmt;
use std::time::Duration;

use alloy::primitives::utils::format_units;
use alloy::primitives::U256;
use thiserror::Error;

use crate::blockchain::types::{BlockchainError, BlockchainResult};
use crate::config::ReceiptConfig;

pub mod deploy;
pub mod query;
pub mod receipt;
pub mod transfer;

/// Separator printed under each report title.
const RULE: &str = "-----------------------------------------------------";

/// The stage of a command that failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    ParseKey,
    ParseArgument,
    LoadBytecode,
    Connect,
    QueryToken,
    EncodeCall,
    BuildRequest,
    Sign,
    Submit,
    WaitForReceipt,
    LookupReceipt,
    GetCode,
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Step::ParseKey => "parsing private key",
            Step::ParseArgument => "parsing arguments",
            Step::LoadBytecode => "loading contract bytecode",
            Step::Connect => "connecting to node",
            Step::QueryToken => "querying token contract",
            Step::EncodeCall => "encoding contract call",
            Step::BuildRequest => "building transaction request",
            Step::Sign => "signing transaction",
            Step::Submit => "submitting transaction",
            Step::WaitForReceipt => "waiting for receipt",
            Step::LookupReceipt => "retrieving receipt",
            Step::GetCode => "retrieving contract code",
        };
        f.write_str(s)
    }
}

/// A command failure with the step it occurred in.
#[derive(Debug, Error)]
#[error("{step}: {source}")]
pub struct ScriptError {
    pub step: Step,
    #[source]
    pub source: BlockchainError,
}

pub type ScriptResult<T> = Result<T, ScriptError>;

/// Attach a [`Step`] to a blockchain result.
pub trait StepExt<T> {
    fn step(self, step: Step) -> ScriptResult<T>;
}

impl<T> StepExt<T> for BlockchainResult<T> {
    fn step(self, step: Step) -> ScriptResult<T> {
        self.map_err(|source| ScriptError { step, source })
    }
}

/// Receipt polling settings for commands that wait for inclusion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WaitOptions {
    pub poll_interval: Duration,
    pub timeout: Duration,
}

impl From<&ReceiptConfig> for WaitOptions {
    fn from(config: &ReceiptConfig) -> Self {
        Self {
            poll_interval: Duration::from_millis(config.poll_interval_ms),
            timeout: Duration::from_secs(config.timeout_secs),
        }
    }
}

/// Render a raw token amount with its decimals, e.g. `9999.0 (9999000000000000000000)`.
pub fn format_amount(raw: U256, decimals: u8) -> String {
    match format_units(raw, decimals) {
        Ok(units) => format!("{} ({})", trim_units(&units), raw),
        Err(_) => raw.to_string(),
    }
}

fn trim_units(units: &str) -> &str {
    match units.split_once('.') {
        Some((_, frac)) if !frac.is_empty() => {
            let trimmed = units.trim_end_matches('0');
            if trimmed.ends_with('.') {
                &units[..trimmed.len() + 1]
            } else {
                trimmed
            }
        }
        _ => units,
    }
}

fn write_title(f: &mut fmt::Formatter<'_>, title: &str, description: &str) -> fmt::Result {
    writeln!(f, "\n{}\n{}", title, RULE)?;
    writeln!(f, "{}\n", description)
}
