//! Thread-safe in-memory wallet store
//!
//! `MemoryWalletStore` keeps wallets in a `DashMap`, so concurrent requests for
//! different users never contend and operations on one user are serialized by
//! the map's shard locks. It implements the full [`WalletStore`] contract,
//! including versioned balance replacement and soft deletion, and backs the
//! service when no database is configured.

use crate::core::WalletStore;
use crate::types::{BalanceMap, Wallet, WalletError};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;

#[derive(Debug, Clone)]
struct StoredWallet {
    wallet: Wallet,
    deleted_at: Option<DateTime<Utc>>,
}

impl StoredWallet {
    fn is_live(&self) -> bool {
        self.deleted_at.is_none()
    }
}

/// In-memory wallet store keyed by user id
///
/// Soft-deleted wallets stay in the map, so their user ids cannot be reused.
#[derive(Debug, Default)]
pub struct MemoryWalletStore {
    wallets: DashMap<String, StoredWallet>,
}

impl MemoryWalletStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self {
            wallets: DashMap::new(),
        }
    }

    /// Number of live (not deleted) wallets
    pub fn len(&self) -> usize {
        self.wallets.iter().filter(|entry| entry.is_live()).count()
    }

    /// Whether the store holds no live wallets
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl WalletStore for MemoryWalletStore {
    async fn create(&self, wallet: Wallet) -> Result<Wallet, WalletError> {
        match self.wallets.entry(wallet.user_id.clone()) {
            Entry::Occupied(_) => Err(WalletError::wallet_already_exists(&wallet.user_id)),
            Entry::Vacant(vacant) => {
                vacant.insert(StoredWallet {
                    wallet: wallet.clone(),
                    deleted_at: None,
                });
                Ok(wallet)
            }
        }
    }

    async fn get_by_user_id(&self, user_id: &str) -> Result<Wallet, WalletError> {
        self.wallets
            .get(user_id)
            .filter(|entry| entry.is_live())
            .map(|entry| entry.wallet.clone())
            .ok_or_else(|| WalletError::wallet_not_found(user_id))
    }

    async fn exists(&self, user_id: &str) -> Result<bool, WalletError> {
        Ok(self
            .wallets
            .get(user_id)
            .is_some_and(|entry| entry.is_live()))
    }

    async fn replace_balances(
        &self,
        user_id: &str,
        balances: &BalanceMap,
        expected_version: u64,
    ) -> Result<(), WalletError> {
        let mut entry = match self.wallets.get_mut(user_id) {
            Some(entry) if entry.is_live() => entry,
            _ => return Err(WalletError::wallet_not_found(user_id)),
        };

        if entry.wallet.version != expected_version {
            return Err(WalletError::concurrent_modification(user_id, 1));
        }

        entry.wallet.balances = balances.clone();
        entry.wallet.version += 1;
        entry.wallet.updated_at = Utc::now();

        Ok(())
    }

    async fn soft_delete(&self, user_id: &str) -> Result<(), WalletError> {
        let mut entry = match self.wallets.get_mut(user_id) {
            Some(entry) if entry.is_live() => entry,
            _ => return Err(WalletError::wallet_not_found(user_id)),
        };

        entry.deleted_at = Some(Utc::now());
        Ok(())
    }
}
