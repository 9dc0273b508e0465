//! Wallet operations engine
//!
//! This module provides the [`WalletEngine`], the only component allowed to
//! change a wallet's balances. Every operation runs the same pipeline:
//!
//! ```text
//! Validate -> Fetch -> Mutate (in memory) -> Persist -> Reload
//! ```
//!
//! Failures during validation or fetch abort before anything is written. The
//! persist step is a compare-and-swap on the wallet version; a stale version
//! re-runs fetch/mutate/persist up to `max_retries` times so concurrent
//! increments are never lost. Store and registry failures are returned as-is
//! and never retried.

use crate::core::config::EngineConfig;
use crate::core::traits::{BalanceTypeRegistry, WalletStore};
use crate::types::{validate_user_id, BalanceMap, Wallet, WalletError};
use rust_decimal::Decimal;
use std::collections::BTreeSet;
use std::future::Future;
use std::sync::Arc;
use tracing::{info, instrument, warn};

/// Balance mutation applied by the engine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BalanceOperation {
    /// Credit the balance
    Add,
    /// Debit the balance, failing if it would go negative
    Deduct,
}

impl BalanceOperation {
    fn apply(
        self,
        balances: &mut BalanceMap,
        currency: &str,
        amount: Decimal,
    ) -> Result<Decimal, WalletError> {
        match self {
            BalanceOperation::Add => balances.add(currency, amount),
            BalanceOperation::Deduct => balances.deduct(currency, amount),
        }
    }

    fn as_str(self) -> &'static str {
        match self {
            BalanceOperation::Add => "add",
            BalanceOperation::Deduct => "deduct",
        }
    }
}

/// Orchestrates validation, store access and balance mutation
///
/// Cheap to clone; collaborators are shared through `Arc`.
#[derive(Clone)]
pub struct WalletEngine {
    store: Arc<dyn WalletStore>,
    registry: Arc<dyn BalanceTypeRegistry>,
    config: EngineConfig,
}

impl WalletEngine {
    /// Create a new WalletEngine
    ///
    /// # Arguments
    ///
    /// * `store` - Wallet persistence
    /// * `registry` - Source of valid balance types
    /// * `config` - Amount ceiling, retry budget and registry timeout
    pub fn new(
        store: Arc<dyn WalletStore>,
        registry: Arc<dyn BalanceTypeRegistry>,
        config: EngineConfig,
    ) -> Self {
        WalletEngine {
            store,
            registry,
            config,
        }
    }

    /// The engine's configuration
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Create a wallet with every registered balance type at zero
    ///
    /// # Errors
    ///
    /// - `ValidationFailed` for a malformed user id
    /// - `WalletAlreadyExists` if the id is taken (also when a concurrent create wins)
    /// - `RegistryUnavailable` if the balance types cannot be listed; nothing is written
    #[instrument(skip(self))]
    pub async fn create_wallet(&self, user_id: &str) -> Result<Wallet, WalletError> {
        validate_user_id(user_id)?;

        if self.store.exists(user_id).await? {
            return Err(WalletError::wallet_already_exists(user_id));
        }

        let currencies = self.valid_currencies().await?;
        let wallet = Wallet::new(user_id, BalanceMap::with_currencies(currencies));

        let created = self.store.create(wallet).await?;
        info!(balance_types = created.balances.len(), "wallet created");

        Ok(created)
    }

    /// Fetch a live wallet
    #[instrument(skip(self))]
    pub async fn get_wallet(&self, user_id: &str) -> Result<Wallet, WalletError> {
        validate_user_id(user_id)?;
        self.store.get_by_user_id(user_id).await
    }

    /// Credit `amount` to `currency` and return the reloaded wallet
    pub async fn add_balance(
        &self,
        user_id: &str,
        currency: &str,
        amount: Decimal,
    ) -> Result<Wallet, WalletError> {
        self.apply(user_id, currency, amount, BalanceOperation::Add).await
    }

    /// Debit `amount` from `currency` and return the reloaded wallet
    ///
    /// Fails with `InsufficientBalance` (carrying current and requested amounts)
    /// when the balance is lower than `amount`; the stored balance is unchanged.
    pub async fn deduct_balance(
        &self,
        user_id: &str,
        currency: &str,
        amount: Decimal,
    ) -> Result<Wallet, WalletError> {
        self.apply(user_id, currency, amount, BalanceOperation::Deduct).await
    }

    /// Soft-delete a wallet
    #[instrument(skip(self))]
    pub async fn delete_wallet(&self, user_id: &str) -> Result<(), WalletError> {
        validate_user_id(user_id)?;
        self.store.soft_delete(user_id).await?;
        info!("wallet soft-deleted");
        Ok(())
    }

    /// Currently valid balance types, as reported by the registry
    pub async fn balance_types(&self) -> Result<BTreeSet<String>, WalletError> {
        self.valid_currencies().await
    }

    #[instrument(skip(self, amount, operation), fields(amount = %amount, operation = operation.as_str()))]
    async fn apply(
        &self,
        user_id: &str,
        currency: &str,
        amount: Decimal,
        operation: BalanceOperation,
    ) -> Result<Wallet, WalletError> {
        validate_user_id(user_id)?;
        self.validate_amount(amount)?;
        self.validate_currency(currency).await?;

        let mut attempts = 0;
        loop {
            attempts += 1;

            let wallet = self.store.get_by_user_id(user_id).await?;
            let mut balances = wallet.balances.clone();
            let new_balance = operation.apply(&mut balances, currency, amount)?;

            match self
                .store
                .replace_balances(user_id, &balances, wallet.version)
                .await
            {
                Ok(()) => {
                    info!(%new_balance, attempts, "balance updated");
                    break;
                }
                Err(WalletError::ConcurrentModification { .. })
                    if attempts < self.config.max_retries =>
                {
                    warn!(attempts, "stale wallet version, retrying");
                }
                Err(WalletError::ConcurrentModification { .. }) => {
                    warn!(attempts, "retry budget exhausted");
                    return Err(WalletError::concurrent_modification(user_id, attempts));
                }
                Err(error) => return Err(error),
            }
        }

        self.store.get_by_user_id(user_id).await
    }

    fn validate_amount(&self, amount: Decimal) -> Result<(), WalletError> {
        if amount <= Decimal::ZERO {
            return Err(WalletError::invalid_amount(amount, "amount must be positive"));
        }

        if amount > self.config.amount_ceiling {
            return Err(WalletError::invalid_amount(
                amount,
                &format!("maximum {} allowed", self.config.amount_ceiling),
            ));
        }

        Ok(())
    }

    async fn validate_currency(&self, currency: &str) -> Result<(), WalletError> {
        if currency.trim().is_empty() {
            return Err(WalletError::validation_failed("type", "balance type is required"));
        }

        let valid = self
            .with_registry_timeout(self.registry.is_valid(currency))
            .await?;
        if !valid {
            return Err(WalletError::invalid_currency(currency));
        }

        Ok(())
    }

    async fn valid_currencies(&self) -> Result<BTreeSet<String>, WalletError> {
        self.with_registry_timeout(self.registry.list_valid_currencies())
            .await
    }

    async fn with_registry_timeout<T, F>(&self, call: F) -> Result<T, WalletError>
    where
        F: Future<Output = Result<T, WalletError>>,
    {
        let timeout = self.config.registry_timeout;
        match tokio::time::timeout(timeout, call).await {
            Ok(result) => result,
            Err(_) => Err(WalletError::registry_unavailable(format!(
                "no response within {}ms",
                timeout.as_millis()
            ))),
        }
    }
}
