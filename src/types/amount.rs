//! Amount parsing at the transport boundary
//!
//! Clients may send an amount as a JSON string or a JSON number. Both are parsed
//! exactly once, here, into a `Decimal`; nothing past this module sees raw text.
//! Range checks (positive, below the ceiling) belong to the engine.

use crate::types::WalletError;
use rust_decimal::Decimal;
use serde_json::Value;
use std::str::FromStr;

/// Parse a textual amount
///
/// Accepts plain decimal notation ("100", "12.5") and scientific notation
/// ("1e3", "2.5E-1").
///
/// # Errors
///
/// Returns `InvalidAmount` for empty or non-numeric input.
pub fn parse_amount(raw: &str) -> Result<Decimal, WalletError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(WalletError::invalid_amount(raw, "amount is required"));
    }

    Decimal::from_str(trimmed)
        .or_else(|_| Decimal::from_scientific(trimmed))
        .map_err(|_| WalletError::invalid_amount(raw, "amount must be a number"))
}

/// Parse an amount from a JSON value (string or number)
///
/// # Errors
///
/// Returns `InvalidAmount` when the value is missing, null, of another JSON
/// type, or not numeric.
pub fn parse_amount_value(value: &Value) -> Result<Decimal, WalletError> {
    match value {
        Value::String(text) => parse_amount(text),
        Value::Number(number) => parse_amount(&number.to_string()),
        Value::Null => Err(WalletError::invalid_amount("", "amount is required")),
        other => Err(WalletError::invalid_amount(
            other,
            "amount must be a number or numeric string",
        )),
    }
}
