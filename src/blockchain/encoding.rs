//! Contract call encoding.
//!
//! Call data is `selector(4) || word(32) || word(32) || ...`, where the
//! selector is the first four bytes of keccak256 over the method signature
//! and every static argument occupies one left-zero-padded 32-byte word.

use alloy::primitives::{keccak256, Address, Bytes, FixedBytes, U256};

use crate::blockchain::types::{BlockchainError, BlockchainResult};

/// Size of one ABI word.
pub const WORD_SIZE: usize = 32;

/// A typed call argument.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CallArg {
    Address(Address),
    Uint(U256),
    /// Unsigned integer given as decimal text, range-checked at encode time.
    Decimal(String),
}

impl From<Address> for CallArg {
    fn from(address: Address) -> Self {
        Self::Address(address)
    }
}

impl From<U256> for CallArg {
    fn from(value: U256) -> Self {
        Self::Uint(value)
    }
}

/// ABI types understood by the encoder.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ParamType {
    Address,
    Uint(usize),
}

impl ParamType {
    fn parse(ty: &str) -> Option<Self> {
        match ty {
            "address" => Some(Self::Address),
            "uint" => Some(Self::Uint(256)),
            _ => {
                let bits: usize = ty.strip_prefix("uint")?.parse().ok()?;
                (bits > 0 && bits <= 256 && bits % 8 == 0).then_some(Self::Uint(bits))
            }
        }
    }
}

/// Compute the 4-byte selector of a method signature.
pub fn selector(signature: &str) -> FixedBytes<4> {
    FixedBytes::from_slice(&keccak256(signature.as_bytes())[..4])
}

/// Encode a method call.
///
/// # Arguments
/// * `signature` - Canonical signature, e.g. `transfer(address,uint256)`
/// * `args` - Arguments in declaration order
///
/// # Errors
/// - `InvalidSignature` if the signature is malformed or uses a type the
///   encoder does not support
/// - `ArgumentMismatch` if count or kinds of `args` disagree with the signature
/// - `ArgumentOutOfRange` for negative integers or integers wider than the
///   declared type
pub fn encode_call(signature: &str, args: &[CallArg]) -> BlockchainResult<Bytes> {
    let params = parse_signature(signature)?;

    if params.len() != args.len() {
        return Err(BlockchainError::ArgumentMismatch {
            signature: signature.to_string(),
            reason: format!("expected {} arguments, got {}", params.len(), args.len()),
        });
    }

    let mut out = Vec::with_capacity(4 + WORD_SIZE * args.len());
    out.extend_from_slice(selector(signature).as_slice());

    for (index, (param, arg)) in params.iter().zip(args).enumerate() {
        let word = encode_word(signature, index, *param, arg)?;
        out.extend_from_slice(&word);
    }

    Ok(Bytes::from(out))
}

fn parse_signature(signature: &str) -> BlockchainResult<Vec<ParamType>> {
    let invalid = || BlockchainError::InvalidSignature(signature.to_string());

    let (name, rest) = signature.split_once('(').ok_or_else(invalid)?;
    let inner = rest.strip_suffix(')').ok_or_else(invalid)?;
    if name.is_empty() || !name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
        return Err(invalid());
    }
    if inner.is_empty() {
        return Ok(Vec::new());
    }

    inner
        .split(',')
        .map(|ty| ParamType::parse(ty).ok_or_else(invalid))
        .collect()
}

fn encode_word(
    signature: &str,
    index: usize,
    param: ParamType,
    arg: &CallArg,
) -> BlockchainResult<[u8; WORD_SIZE]> {
    match (param, arg) {
        (ParamType::Address, CallArg::Address(address)) => Ok(address.into_word().0),
        (ParamType::Uint(bits), CallArg::Uint(value)) => uint_word(index, bits, *value),
        (ParamType::Uint(bits), CallArg::Decimal(text)) => {
            let value = parse_decimal(index, text)?;
            uint_word(index, bits, value)
        }
        (expected, got) => Err(BlockchainError::ArgumentMismatch {
            signature: signature.to_string(),
            reason: format!("argument {} is {:?}, expected {:?}", index, got, expected),
        }),
    }
}

fn uint_word(index: usize, bits: usize, value: U256) -> BlockchainResult<[u8; WORD_SIZE]> {
    if bits < 256 && value.bit_len() > bits {
        return Err(BlockchainError::ArgumentOutOfRange {
            index,
            reason: format!("{} does not fit in uint{}", value, bits),
        });
    }
    Ok(value.to_be_bytes::<WORD_SIZE>())
}

fn parse_decimal(index: usize, text: &str) -> BlockchainResult<U256> {
    let text = text.trim();
    let out_of_range = |reason: String| BlockchainError::ArgumentOutOfRange { index, reason };

    if text.starts_with('-') {
        return Err(out_of_range(format!("negative value {}", text)));
    }
    let digits = text.strip_prefix('+').unwrap_or(text);
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Err(out_of_range(format!("'{}' is not a decimal integer", text)));
    }

    U256::from_str_radix(digits, 10)
        .map_err(|_| out_of_range(format!("{} does not fit in 256 bits", digits)))
}
