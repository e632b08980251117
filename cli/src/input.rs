//! Parsers for command line values.

use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum InputError {
    #[error("invalid number {0:?}: expected decimal or 0x-prefixed hex")]
    Number(String),

    #[error("invalid hex payload: {0}")]
    Payload(#[from] hex::FromHexError),
}

/// Parse a `u64` written in decimal or with a `0x` prefix in hex.
///
/// Underscores are accepted as digit separators.
pub fn parse_u64(s: &str) -> Result<u64, InputError> {
    let cleaned = s.trim().replace('_', "");
    let parsed = match cleaned
        .strip_prefix("0x")
        .or_else(|| cleaned.strip_prefix("0X"))
    {
        Some(hex) => u64::from_str_radix(hex, 16),
        None => cleaned.parse(),
    };
    parsed.map_err(|_| InputError::Number(s.to_string()))
}

/// Decode a hex payload; an optional `0x` prefix is ignored.
pub fn parse_payload_hex(s: &str) -> Result<Vec<u8>, InputError> {
    let s = s.trim();
    let digits = s.strip_prefix("0x").unwrap_or(s);
    Ok(hex::decode(digits)?)
}
