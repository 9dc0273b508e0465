//! Wallet entity and user-id rules
//!
//! A wallet is the single balance record owned by one external user id. It is
//! created once, mutated only through the engine's add/deduct operations, and
//! soft-deleted by the store.

use super::balance::BalanceMap;
use super::error::WalletError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Maximum length of an external user id
pub const MAX_USER_ID_LEN: usize = 255;

/// Per-user balance record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Wallet {
    /// External user identifier, unique and immutable
    pub user_id: String,

    /// Current balances keyed by balance type
    pub balances: BalanceMap,

    /// Server-assigned creation time
    pub created_at: DateTime<Utc>,

    /// Server-assigned time of the last balance write
    pub updated_at: DateTime<Utc>,

    /// Optimistic-concurrency version, bumped on every balance write
    ///
    /// Internal bookkeeping; not part of the API representation.
    #[serde(skip)]
    pub version: u64,
}

impl Wallet {
    /// Create a fresh, never-persisted wallet
    ///
    /// # Arguments
    ///
    /// * `user_id` - The owner of the wallet
    /// * `balances` - Initial balances (normally every registered currency at zero)
    pub fn new(user_id: impl Into<String>, balances: BalanceMap) -> Self {
        let now = Utc::now();
        Wallet {
            user_id: user_id.into(),
            balances,
            created_at: now,
            updated_at: now,
            version: 0,
        }
    }
}

/// Validate an external user id
///
/// Ids must be non-empty, at most [`MAX_USER_ID_LEN`] bytes, and consist of
/// ASCII letters, digits, hyphens and underscores.
pub fn validate_user_id(user_id: &str) -> Result<(), WalletError> {
    if user_id.is_empty() {
        return Err(WalletError::validation_failed("user_id", "user_id is required"));
    }

    if user_id.len() > MAX_USER_ID_LEN {
        return Err(WalletError::validation_failed(
            "user_id",
            "maximum 255 characters allowed",
        ));
    }

    let valid = user_id
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
    if !valid {
        return Err(WalletError::validation_failed(
            "user_id",
            "only alphanumeric characters, hyphens, and underscores are allowed",
        ));
    }

    Ok(())
}
