//! Balance map for wallet currencies
//!
//! A [`BalanceMap`] maps balance-type names ("coins", "exp", ...) to fixed-point
//! amounts. It is the unit of mutation: the engine loads a wallet's map, applies
//! one `add` or `deduct`, and persists the whole map back.
//!
//! # Invariants
//!
//! - No operation can leave an amount below zero
//! - Mutation amounts must be strictly positive
//! - An absent currency reads as zero
//!
//! Keys are held in a `BTreeMap` so serialization order is deterministic.

use crate::types::WalletError;
use rust_decimal::Decimal;
use serde::ser::{Error as _, SerializeMap};
use serde::{Deserialize, Serialize, Serializer};
use std::collections::BTreeMap;
use std::str::FromStr;

/// Currency-name to amount mapping
///
/// Serializes as a JSON object of exact numbers, e.g. `{"coins": 60.50}`, and
/// accepts numbers or numeric strings when deserializing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(transparent)]
pub struct BalanceMap {
    balances: BTreeMap<String, Decimal>,
}

impl BalanceMap {
    /// Create an empty balance map
    pub fn new() -> Self {
        BalanceMap {
            balances: BTreeMap::new(),
        }
    }

    /// Create a map with every given currency initialized to zero
    pub fn with_currencies<I, S>(currencies: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        BalanceMap {
            balances: currencies
                .into_iter()
                .map(|currency| (currency.into(), Decimal::ZERO))
                .collect(),
        }
    }

    /// Current balance for a currency
    ///
    /// Returns zero when the currency has never been touched.
    pub fn get(&self, currency: &str) -> Decimal {
        self.balances
            .get(currency)
            .copied()
            .unwrap_or(Decimal::ZERO)
    }

    /// Whether the currency has an entry
    pub fn contains(&self, currency: &str) -> bool {
        self.balances.contains_key(currency)
    }

    /// Add to a currency, creating the entry if absent
    ///
    /// # Arguments
    ///
    /// * `currency` - Balance type to credit
    /// * `amount` - Amount to add (must be > 0)
    ///
    /// # Returns
    ///
    /// The new balance for `currency`
    ///
    /// # Errors
    ///
    /// Returns `InvalidAmount` if `amount` is not positive or the sum overflows.
    pub fn add(&mut self, currency: &str, amount: Decimal) -> Result<Decimal, WalletError> {
        ensure_positive(amount)?;

        let current = self.get(currency);
        let updated = current
            .checked_add(amount)
            .ok_or_else(|| WalletError::invalid_amount(amount, "balance would overflow"))?;

        self.balances.insert(currency.to_string(), updated);
        Ok(updated)
    }

    /// Deduct from a currency
    ///
    /// # Arguments
    ///
    /// * `currency` - Balance type to debit
    /// * `amount` - Amount to remove (must be > 0)
    ///
    /// # Returns
    ///
    /// The new balance for `currency`
    ///
    /// # Errors
    ///
    /// Returns `InvalidAmount` if `amount` is not positive, and
    /// `InsufficientBalance` if the current balance is lower than `amount`.
    /// The map is untouched on error.
    pub fn deduct(&mut self, currency: &str, amount: Decimal) -> Result<Decimal, WalletError> {
        ensure_positive(amount)?;

        let current = self.get(currency);
        if current < amount {
            return Err(WalletError::insufficient_balance(currency, current, amount));
        }

        let updated = current
            .checked_sub(amount)
            .ok_or_else(|| WalletError::invalid_amount(amount, "balance would underflow"))?;

        self.balances.insert(currency.to_string(), updated);
        Ok(updated)
    }

    /// Iterate over (currency, amount) pairs in key order
    pub fn iter(&self) -> impl Iterator<Item = (&str, Decimal)> {
        self.balances
            .iter()
            .map(|(currency, amount)| (currency.as_str(), *amount))
    }

    /// Number of currencies with an entry
    pub fn len(&self) -> usize {
        self.balances.len()
    }

    /// Whether the map has no entries
    pub fn is_empty(&self) -> bool {
        self.balances.is_empty()
    }

    /// Whether every stored amount is non-negative
    pub fn is_non_negative(&self) -> bool {
        self.balances.values().all(|amount| !amount.is_sign_negative())
    }
}

impl Serialize for BalanceMap {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.balances.len()))?;
        for (currency, amount) in &self.balances {
            let number =
                serde_json::Number::from_str(&amount.to_string()).map_err(S::Error::custom)?;
            map.serialize_entry(currency, &number)?;
        }
        map.end()
    }
}

fn ensure_positive(amount: Decimal) -> Result<(), WalletError> {
    if amount <= Decimal::ZERO {
        return Err(WalletError::invalid_amount(amount, "amount must be positive"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn test_with_currencies_initializes_zero() {
        let map = BalanceMap::with_currencies(["coins", "exp"]);

        assert_eq!(map.len(), 2);
        assert_eq!(map.get("coins"), Decimal::ZERO);
        assert_eq!(map.get("exp"), Decimal::ZERO);
    }

    #[test]
    fn test_get_missing_currency_is_zero() {
        let map = BalanceMap::new();

        assert_eq!(map.get("coins"), Decimal::ZERO);
        assert!(!map.contains("coins"));
    }

    #[test]
    fn test_add_creates_missing_key() {
        let mut map = BalanceMap::new();

        let updated = map.add("gems", Decimal::new(25, 0)).unwrap();

        assert_eq!(updated, Decimal::new(25, 0));
        assert!(map.contains("gems"));
    }

    #[test]
    fn test_add_accumulates() {
        let mut map = BalanceMap::with_currencies(["coins"]);

        map.add("coins", Decimal::new(100, 0)).unwrap();
        map.add("coins", Decimal::new(2550, 2)).unwrap();

        assert_eq!(map.get("coins"), Decimal::new(12550, 2));
    }

    #[test]
    fn test_deduct_decreases_balance() {
        let mut map = BalanceMap::with_currencies(["coins"]);
        map.add("coins", Decimal::new(100, 0)).unwrap();

        let updated = map.deduct("coins", Decimal::new(40, 0)).unwrap();

        assert_eq!(updated, Decimal::new(60, 0));
    }

    #[test]
    fn test_deduct_entire_balance_reaches_zero() {
        let mut map = BalanceMap::with_currencies(["exp"]);
        map.add("exp", Decimal::new(5, 1)).unwrap();

        map.deduct("exp", Decimal::new(5, 1)).unwrap();

        assert_eq!(map.get("exp"), Decimal::ZERO);
        assert!(map.is_non_negative());
    }

    #[test]
    fn test_deduct_insufficient_leaves_map_unchanged() {
        let mut map = BalanceMap::with_currencies(["coins", "exp"]);
        map.add("coins", Decimal::new(60, 0)).unwrap();
        let before = map.clone();

        let result = map.deduct("coins", Decimal::new(1000, 0));

        assert_eq!(
            result.unwrap_err(),
            WalletError::insufficient_balance("coins", Decimal::new(60, 0), Decimal::new(1000, 0))
        );
        assert_eq!(map, before);
    }

    #[test]
    fn test_deduct_from_untouched_currency_is_insufficient() {
        let mut map = BalanceMap::new();

        let result = map.deduct("gems", Decimal::ONE);

        assert!(matches!(result, Err(WalletError::InsufficientBalance { .. })));
        assert!(map.is_empty());
    }

    #[rstest]
    #[case::zero(Decimal::ZERO)]
    #[case::negative(Decimal::new(-1, 0))]
    #[case::negative_fraction(Decimal::new(-1, 4))]
    fn test_non_positive_amounts_rejected(#[case] amount: Decimal) {
        let mut map = BalanceMap::with_currencies(["coins"]);
        map.add("coins", Decimal::new(10, 0)).unwrap();

        assert!(matches!(
            map.add("coins", amount),
            Err(WalletError::InvalidAmount { .. })
        ));
        assert!(matches!(
            map.deduct("coins", amount),
            Err(WalletError::InvalidAmount { .. })
        ));
        assert_eq!(map.get("coins"), Decimal::new(10, 0));
    }

    #[test]
    fn test_add_overflow_is_rejected() {
        let mut map = BalanceMap::new();
        map.add("coins", Decimal::MAX).unwrap();

        let result = map.add("coins", Decimal::ONE);

        assert!(matches!(result, Err(WalletError::InvalidAmount { .. })));
        assert_eq!(map.get("coins"), Decimal::MAX);
    }

    #[test]
    fn test_repeated_fractional_cycles_do_not_drift() {
        let mut map = BalanceMap::with_currencies(["coins"]);
        let tenth = Decimal::new(1, 1);

        for _ in 0..1000 {
            map.add("coins", tenth).unwrap();
        }
        for _ in 0..1000 {
            map.deduct("coins", tenth).unwrap();
        }

        assert_eq!(map.get("coins"), Decimal::ZERO);
    }

    #[test]
    fn test_serializes_as_numeric_object_and_round_trips() {
        let mut map = BalanceMap::with_currencies(["coins", "exp"]);
        map.add("coins", Decimal::new(6050, 2)).unwrap();

        let json = serde_json::to_string(&map).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert!(value["coins"].is_number());
        assert!(value["exp"].is_number());
        assert_eq!(json, r#"{"coins":60.50,"exp":0}"#);

        let restored: BalanceMap = serde_json::from_str(&json).unwrap();
        assert_eq!(restored, map);
    }

    #[test]
    fn test_deserializes_numbers_and_strings() {
        let map: BalanceMap = serde_json::from_str(r#"{"coins": 60.50, "exp": "12"}"#).unwrap();

        assert_eq!(map.get("coins"), Decimal::new(6050, 2));
        assert_eq!(map.get("exp"), Decimal::new(12, 0));
    }
}
