//! Display helpers for addresses, balances and chain ids.

use std::str::FromStr;

use alloy_primitives::{Address, U256};
use serde_json::Value;

use crate::error::{Result, WalletError};

/// Balance shown when the wallet returns something that is not a quantity.
pub const UNPARSEABLE_BALANCE: &str = "0.0000";

/// Number of decimals shown for balances of at least 0.01 native units.
const DISPLAY_DECIMALS: u32 = 4;

/// Returns the EIP-55 checksummed form of an address.
///
/// Accepts any casing, with or without the `0x` prefix.
pub fn checksum_address(raw: &str) -> Result<String> {
    let address = Address::from_str(raw.trim())
        .map_err(|e| WalletError::unknown(format!("invalid address {raw:?}: {e}")))?;
    Ok(address.to_checksum(None))
}

/// Shortens an address for display: `0x1234…abcd`.
pub fn shorten_address(address: &str) -> String {
    let chars: Vec<char> = address.chars().collect();
    if chars.len() <= 10 {
        return address.to_string();
    }
    let head: String = chars[..6].iter().collect();
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("{head}…{tail}")
}

/// Parses a JSON-RPC hex quantity (`0x1bc16d674ec80000`).
pub fn parse_quantity(raw: &str) -> Option<U256> {
    let digits = raw
        .strip_prefix("0x")
        .or_else(|| raw.strip_prefix("0X"))?;
    if digits.is_empty() {
        return None;
    }
    U256::from_str_radix(digits, 16).ok()
}

/// Parses a chain id given as `0x`-hex or decimal text.
pub fn parse_chain_id(raw: &str) -> Option<u64> {
    let raw = raw.trim();
    match raw.strip_prefix("0x").or_else(|| raw.strip_prefix("0X")) {
        Some(hex) => u64::from_str_radix(hex, 16).ok(),
        None => raw.parse().ok(),
    }
}

/// Reads a chain id out of a JSON value; wallets report either a hex string or a number.
pub fn chain_id_from_value(value: &Value) -> Option<u64> {
    match value {
        Value::String(s) => parse_chain_id(s),
        Value::Number(n) => n.as_u64(),
        _ => None,
    }
}

/// Formats a balance in base units for display.
///
/// Balances of at least 0.01 are rounded to four decimals; smaller balances are
/// shown in full with trailing zeros removed, so dust stays visible.
pub fn format_balance(amount: U256, decimals: u8) -> String {
    let unit = U256::from(10u64).pow(U256::from(decimals));

    if amount.saturating_mul(U256::from(100u64)) >= unit {
        let decimals = u32::from(decimals);
        let scaled = if decimals >= DISPLAY_DECIMALS {
            let step = U256::from(10u64).pow(U256::from(decimals - DISPLAY_DECIMALS));
            (amount + step / U256::from(2u64)) / step
        } else {
            amount * U256::from(10u64).pow(U256::from(DISPLAY_DECIMALS - decimals))
        };
        let denom = U256::from(10u64).pow(U256::from(DISPLAY_DECIMALS));
        let whole = scaled / denom;
        let frac = (scaled % denom).to_string();
        return format!("{whole}.{frac:0>4}");
    }

    let whole = amount / unit;
    let frac = (amount % unit).to_string();
    let frac = format!("{frac:0>width$}", width = usize::from(decimals));
    let frac = frac.trim_end_matches('0');
    if frac.is_empty() {
        whole.to_string()
    } else {
        format!("{whole}.{frac}")
    }
}

/// Formats an `eth_getBalance` result, falling back to `0.0000` when it is not a quantity.
pub fn format_balance_value(value: &Value, decimals: u8) -> String {
    value
        .as_str()
        .and_then(parse_quantity)
        .map(|amount| format_balance(amount, decimals))
        .unwrap_or_else(|| UNPARSEABLE_BALANCE.to_string())
}
