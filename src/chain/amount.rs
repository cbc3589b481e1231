// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Human-readable amount codec.
//!
//! Amounts travel through the chat flow as decimal strings ("0.05") and hit
//! the chain as integer wei. Parsing works on integer parts only; no floats
//! anywhere near money.

use alloy::primitives::U256;

/// Decimals of the native token.
pub const NATIVE_DECIMALS: u8 = 18;

/// Errors from amount parsing.
#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum AmountError {
    #[error("not a decimal number")]
    Malformed,

    #[error("too many decimal places (max {0})")]
    TooManyDecimals(u8),

    #[error("amount too large")]
    Overflow,

    #[error("amount must be greater than zero")]
    NotPositive,
}

/// Parse a human-readable amount to wei (or token units).
///
/// # Arguments
/// * `amount` - Amount as a string (e.g., "1.5")
/// * `decimals` - Number of decimals (18 for the native token)
pub fn parse_amount(amount: &str, decimals: u8) -> Result<U256, AmountError> {
    let amount = amount.trim();
    let parts: Vec<&str> = amount.split('.').collect();

    if parts.len() > 2 {
        return Err(AmountError::Malformed);
    }

    let whole = parts[0].parse::<u128>().map_err(|_| AmountError::Malformed)?;

    let decimal_part = if parts.len() == 2 {
        let dec_str = parts[1];
        if dec_str.is_empty() || !dec_str.bytes().all(|b| b.is_ascii_digit()) {
            return Err(AmountError::Malformed);
        }
        if dec_str.len() > decimals as usize {
            return Err(AmountError::TooManyDecimals(decimals));
        }
        // Pad with zeros to match decimals
        let padded = format!("{:0<width$}", dec_str, width = decimals as usize);
        padded.parse::<u128>().map_err(|_| AmountError::Malformed)?
    } else {
        0u128
    };

    let multiplier = 10u128.pow(decimals as u32);
    let total = whole
        .checked_mul(multiplier)
        .and_then(|w| w.checked_add(decimal_part))
        .ok_or(AmountError::Overflow)?;

    Ok(U256::from(total))
}

/// Parse an amount that must be strictly positive.
///
/// This is the validation the transfer flow applies to user input.
pub fn parse_positive_amount(amount: &str, decimals: u8) -> Result<U256, AmountError> {
    let wei = parse_amount(amount, decimals)?;
    if wei.is_zero() {
        return Err(AmountError::NotPositive);
    }
    Ok(wei)
}

/// Format wei (or token units) to a human-readable amount.
pub fn format_amount(amount: U256, decimals: u8) -> String {
    if amount.is_zero() {
        return "0".to_string();
    }

    let divisor = U256::from(10u64).pow(U256::from(decimals));
    let whole = amount / divisor;
    let remainder = amount % divisor;

    if remainder.is_zero() {
        whole.to_string()
    } else {
        let decimal_str = format!("{:0>width$}", remainder, width = decimals as usize);
        let trimmed = decimal_str.trim_end_matches('0');
        if trimmed.is_empty() {
            whole.to_string()
        } else {
            format!("{}.{}", whole, trimmed)
        }
    }
}
