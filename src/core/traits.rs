//! Core traits for wallet persistence and balance-type lookup
//!
//! The engine depends only on these two abstractions, so the same logic runs
//! against the in-memory or PostgreSQL store and the fixed or catalog registry.

use crate::types::{BalanceMap, Wallet, WalletError};
use async_trait::async_trait;
use std::collections::BTreeSet;

/// Persistence contract for wallets
///
/// Soft-deleted wallets are invisible to `get_by_user_id` and `exists`, but
/// their rows are retained, so `create` still rejects their user ids.
#[async_trait]
pub trait WalletStore: Send + Sync {
    /// Insert a new wallet
    ///
    /// Fails with `WalletAlreadyExists` when the user id is taken, including
    /// when a concurrent `create` for the same id commits first.
    async fn create(&self, wallet: Wallet) -> Result<Wallet, WalletError>;

    /// Fetch a live wallet, failing with `WalletNotFound` if absent or deleted
    async fn get_by_user_id(&self, user_id: &str) -> Result<Wallet, WalletError>;

    /// Whether a live wallet exists for the user id
    async fn exists(&self, user_id: &str) -> Result<bool, WalletError>;

    /// Atomically replace the whole balance map
    ///
    /// The write only applies if the stored version still equals
    /// `expected_version`; it then bumps the version and `updated_at`.
    ///
    /// # Errors
    ///
    /// - `WalletNotFound` if no live wallet has this user id
    /// - `ConcurrentModification` if the version moved since it was read
    async fn replace_balances(
        &self,
        user_id: &str,
        balances: &BalanceMap,
        expected_version: u64,
    ) -> Result<(), WalletError>;

    /// Mark a wallet deleted, failing with `WalletNotFound` if absent or deleted
    async fn soft_delete(&self, user_id: &str) -> Result<(), WalletError>;
}

/// Authority for the set of valid balance types
#[async_trait]
pub trait BalanceTypeRegistry: Send + Sync {
    /// All currently valid balance-type names
    async fn list_valid_currencies(&self) -> Result<BTreeSet<String>, WalletError>;

    /// Whether a single balance type is valid
    async fn is_valid(&self, currency: &str) -> Result<bool, WalletError> {
        Ok(self.list_valid_currencies().await?.contains(currency))
    }
}
