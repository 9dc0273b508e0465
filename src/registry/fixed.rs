//! Fixed balance-type registry
//!
//! Serves a set of balance types decided at start-up. The default set is
//! `coins` and `exp`.

use crate::core::BalanceTypeRegistry;
use crate::types::WalletError;
use async_trait::async_trait;
use std::collections::BTreeSet;

/// Balance types used when none are configured
pub const DEFAULT_BALANCE_TYPES: [&str; 2] = ["coins", "exp"];

/// Registry over a fixed set of balance types
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FixedRegistry {
    currencies: BTreeSet<String>,
}

impl FixedRegistry {
    /// Create a registry from the given names
    ///
    /// Names are trimmed; blank names are dropped.
    pub fn new<I, S>(currencies: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        FixedRegistry {
            currencies: currencies
                .into_iter()
                .map(|currency| currency.as_ref().trim().to_string())
                .filter(|currency| !currency.is_empty())
                .collect(),
        }
    }
}

impl Default for FixedRegistry {
    fn default() -> Self {
        Self::new(DEFAULT_BALANCE_TYPES)
    }
}

#[async_trait]
impl BalanceTypeRegistry for FixedRegistry {
    async fn list_valid_currencies(&self) -> Result<BTreeSet<String>, WalletError> {
        Ok(self.currencies.clone())
    }

    async fn is_valid(&self, currency: &str) -> Result<bool, WalletError> {
        Ok(self.currencies.contains(currency))
    }
}
