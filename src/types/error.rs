//! Error types for the wallet service
//!
//! This module defines every error a wallet operation can produce. Each variant
//! carries enough context to log the failure, and exposes three views of itself:
//!
//! - [`WalletError::code`] - a stable machine-readable code for API clients
//! - [`WalletError::message`] - a short human message that never contains internals
//! - [`WalletError::details`] - optional client-safe detail text
//!
//! # Error Categories
//!
//! - **Business rule errors**: wallet missing or duplicated, insufficient balance
//! - **Validation errors**: malformed amounts, unknown balance types, bad user ids
//! - **Collaborator errors**: registry or store failures, lost optimistic updates

use rust_decimal::Decimal;
use thiserror::Error;

/// Main error type for wallet operations
///
/// Validation and business-rule variants are never retried by the engine.
/// `ConcurrentModification` is retried internally before it is surfaced.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum WalletError {
    /// No live wallet exists for the user id
    #[error("Wallet not found for user {user_id}")]
    WalletNotFound {
        /// The user id that was looked up
        user_id: String,
    },

    /// A wallet (live or soft-deleted) already exists for the user id
    #[error("Wallet already exists for user {user_id}")]
    WalletAlreadyExists {
        /// The duplicated user id
        user_id: String,
    },

    /// Deduction larger than the current balance
    ///
    /// The stored balance is left unchanged.
    #[error("Insufficient {currency} balance: current {available}, requested {requested}")]
    InsufficientBalance {
        /// Balance type being deducted
        currency: String,
        /// Balance at the time of the check
        available: Decimal,
        /// Requested deduction
        requested: Decimal,
    },

    /// Balance type not present in the registry
    #[error("Invalid balance type '{currency}'")]
    InvalidCurrency {
        /// The rejected balance type
        currency: String,
    },

    /// Amount is missing, non-numeric, non-positive or above the ceiling
    #[error("Invalid amount '{amount}': {reason}")]
    InvalidAmount {
        /// The amount as received
        amount: String,
        /// Why it was rejected
        reason: String,
    },

    /// A request field failed validation
    #[error("Validation failed for {field}: {reason}")]
    ValidationFailed {
        /// Field name in snake_case
        field: String,
        /// Why it was rejected
        reason: String,
    },

    /// The balance type registry could not be queried
    #[error("Balance type registry unavailable: {message}")]
    RegistryUnavailable {
        /// Raw failure description (logged, never returned to clients)
        message: String,
    },

    /// The wallet store failed
    #[error("Store error during {operation}: {message}")]
    StoreError {
        /// Store operation that failed
        operation: String,
        /// Raw failure description (logged, never returned to clients)
        message: String,
    },

    /// The wallet changed between read and write
    ///
    /// Raised by stores on a stale version, and by the engine once its retry
    /// budget is exhausted.
    #[error("Wallet {user_id} was modified concurrently ({attempts} attempts)")]
    ConcurrentModification {
        /// Wallet owner
        user_id: String,
        /// Number of write attempts made
        attempts: u32,
    },

    /// Unexpected internal failure
    #[error("Internal error: {message}")]
    InternalError {
        /// Raw failure description (logged, never returned to clients)
        message: String,
    },
}

impl WalletError {
    /// Create a WalletNotFound error
    pub fn wallet_not_found(user_id: &str) -> Self {
        WalletError::WalletNotFound {
            user_id: user_id.to_string(),
        }
    }

    /// Create a WalletAlreadyExists error
    pub fn wallet_already_exists(user_id: &str) -> Self {
        WalletError::WalletAlreadyExists {
            user_id: user_id.to_string(),
        }
    }

    /// Create an InsufficientBalance error
    pub fn insufficient_balance(currency: &str, available: Decimal, requested: Decimal) -> Self {
        WalletError::InsufficientBalance {
            currency: currency.to_string(),
            available,
            requested,
        }
    }

    /// Create an InvalidCurrency error
    pub fn invalid_currency(currency: &str) -> Self {
        WalletError::InvalidCurrency {
            currency: currency.to_string(),
        }
    }

    /// Create an InvalidAmount error
    pub fn invalid_amount(amount: impl ToString, reason: &str) -> Self {
        WalletError::InvalidAmount {
            amount: amount.to_string(),
            reason: reason.to_string(),
        }
    }

    /// Create a ValidationFailed error
    pub fn validation_failed(field: &str, reason: &str) -> Self {
        WalletError::ValidationFailed {
            field: field.to_string(),
            reason: reason.to_string(),
        }
    }

    /// Create a RegistryUnavailable error
    pub fn registry_unavailable(message: impl ToString) -> Self {
        WalletError::RegistryUnavailable {
            message: message.to_string(),
        }
    }

    /// Create a StoreError error
    pub fn store_error(operation: &str, message: impl ToString) -> Self {
        WalletError::StoreError {
            operation: operation.to_string(),
            message: message.to_string(),
        }
    }

    /// Create a ConcurrentModification error
    pub fn concurrent_modification(user_id: &str, attempts: u32) -> Self {
        WalletError::ConcurrentModification {
            user_id: user_id.to_string(),
            attempts,
        }
    }

    /// Create an InternalError error
    pub fn internal(message: impl ToString) -> Self {
        WalletError::InternalError {
            message: message.to_string(),
        }
    }

    /// Stable machine-readable error code
    pub fn code(&self) -> &'static str {
        match self {
            WalletError::WalletNotFound { .. } => "WALLET_NOT_FOUND",
            WalletError::WalletAlreadyExists { .. } => "WALLET_ALREADY_EXISTS",
            WalletError::InsufficientBalance { .. } => "INSUFFICIENT_BALANCE",
            WalletError::InvalidCurrency { .. } => "INVALID_BALANCE_TYPE",
            WalletError::InvalidAmount { .. } => "INVALID_AMOUNT",
            WalletError::ValidationFailed { .. } => "VALIDATION_ERROR",
            WalletError::RegistryUnavailable { .. } => "REGISTRY_UNAVAILABLE",
            WalletError::StoreError { .. } => "DATABASE_ERROR",
            WalletError::ConcurrentModification { .. } => "CONCURRENT_MODIFICATION",
            WalletError::InternalError { .. } => "INTERNAL_ERROR",
        }
    }

    /// Human-readable message that is safe to return to clients
    pub fn message(&self) -> String {
        match self {
            WalletError::WalletNotFound { .. } => "Wallet not found".to_string(),
            WalletError::WalletAlreadyExists { .. } => {
                "Wallet already exists for this user".to_string()
            }
            WalletError::InsufficientBalance { currency, .. } => {
                format!("Insufficient {} balance", currency)
            }
            WalletError::InvalidCurrency { .. } => "Invalid balance type".to_string(),
            WalletError::InvalidAmount { .. } => "Invalid amount".to_string(),
            WalletError::ValidationFailed { .. } => "Validation failed".to_string(),
            WalletError::RegistryUnavailable { .. } => {
                "Balance type registry is unavailable".to_string()
            }
            WalletError::StoreError { .. } => {
                "An error occurred while processing your request".to_string()
            }
            WalletError::ConcurrentModification { .. } => {
                "Wallet was modified concurrently, please retry".to_string()
            }
            WalletError::InternalError { .. } => "An unexpected error occurred".to_string(),
        }
    }

    /// Client-safe detail text, if any
    ///
    /// Collaborator failures return `None`: their raw text only goes to the log.
    pub fn details(&self) -> Option<String> {
        match self {
            WalletError::InsufficientBalance {
                available,
                requested,
                ..
            } => Some(format!(
                "Current balance: {}, required: {}",
                available, requested
            )),
            WalletError::InvalidCurrency { currency } => {
                Some(format!("'{}' is not a registered balance type", currency))
            }
            WalletError::InvalidAmount { reason, .. } => Some(reason.clone()),
            WalletError::ValidationFailed { field, reason } => {
                Some(format!("{}: {}", field, reason))
            }
            WalletError::ConcurrentModification { attempts, .. } => {
                Some(format!("gave up after {} attempts", attempts))
            }
            WalletError::WalletNotFound { .. }
            | WalletError::WalletAlreadyExists { .. }
            | WalletError::RegistryUnavailable { .. }
            | WalletError::StoreError { .. }
            | WalletError::InternalError { .. } => None,
        }
    }

    /// Whether the failure comes from a collaborator rather than the request
    pub fn is_internal(&self) -> bool {
        matches!(
            self,
            WalletError::RegistryUnavailable { .. }
                | WalletError::StoreError { .. }
                | WalletError::InternalError { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case::wallet_not_found(
        WalletError::wallet_not_found("u1"),
        "Wallet not found for user u1"
    )]
    #[case::wallet_already_exists(
        WalletError::wallet_already_exists("u1"),
        "Wallet already exists for user u1"
    )]
    #[case::insufficient_balance(
        WalletError::insufficient_balance("coins", Decimal::new(60, 0), Decimal::new(1000, 0)),
        "Insufficient coins balance: current 60, requested 1000"
    )]
    #[case::invalid_currency(
        WalletError::invalid_currency("gems"),
        "Invalid balance type 'gems'"
    )]
    #[case::invalid_amount(
        WalletError::invalid_amount("-5", "amount must be positive"),
        "Invalid amount '-5': amount must be positive"
    )]
    #[case::store_error(
        WalletError::store_error("create", "connection reset"),
        "Store error during create: connection reset"
    )]
    #[case::concurrent_modification(
        WalletError::concurrent_modification("u1", 5),
        "Wallet u1 was modified concurrently (5 attempts)"
    )]
    fn test_error_display(#[case] error: WalletError, #[case] expected: &str) {
        assert_eq!(error.to_string(), expected);
    }

    #[rstest]
    #[case::not_found(WalletError::wallet_not_found("u1"), "WALLET_NOT_FOUND")]
    #[case::exists(WalletError::wallet_already_exists("u1"), "WALLET_ALREADY_EXISTS")]
    #[case::insufficient(
        WalletError::insufficient_balance("exp", Decimal::ZERO, Decimal::ONE),
        "INSUFFICIENT_BALANCE"
    )]
    #[case::currency(WalletError::invalid_currency("gems"), "INVALID_BALANCE_TYPE")]
    #[case::amount(WalletError::invalid_amount("abc", "not a number"), "INVALID_AMOUNT")]
    #[case::validation(WalletError::validation_failed("user_id", "too long"), "VALIDATION_ERROR")]
    #[case::registry(WalletError::registry_unavailable("timeout"), "REGISTRY_UNAVAILABLE")]
    #[case::store(WalletError::store_error("get", "boom"), "DATABASE_ERROR")]
    #[case::concurrent(WalletError::concurrent_modification("u1", 3), "CONCURRENT_MODIFICATION")]
    #[case::internal(WalletError::internal("boom"), "INTERNAL_ERROR")]
    fn test_error_codes(#[case] error: WalletError, #[case] expected: &str) {
        assert_eq!(error.code(), expected);
    }

    #[test]
    fn test_insufficient_balance_details_carry_both_amounts() {
        let error =
            WalletError::insufficient_balance("coins", Decimal::new(60, 0), Decimal::new(1000, 0));

        assert_eq!(error.message(), "Insufficient coins balance");
        assert_eq!(
            error.details().as_deref(),
            Some("Current balance: 60, required: 1000")
        );
    }

    #[rstest]
    #[case::store(WalletError::store_error("update", "password authentication failed"))]
    #[case::registry(WalletError::registry_unavailable("dns error: frappe.internal"))]
    #[case::internal(WalletError::internal("serde: trailing characters"))]
    fn test_internal_errors_hide_raw_text(#[case] error: WalletError) {
        assert!(error.is_internal());
        assert!(error.details().is_none());

        let message = error.message();
        assert!(!message.contains("password"));
        assert!(!message.contains("frappe"));
        assert!(!message.contains("serde"));
    }
}
