//! Types module
//!
//! Contains core data structures used throughout the service.
//! This module organizes types into logical submodules:
//! - `balance`: the currency-name to amount map and its safe mutations
//! - `wallet`: the wallet entity and user-id rules
//! - `amount`: parsing of client-supplied amounts
//! - `error`: error taxonomy for wallet operations

pub mod amount;
pub mod balance;
pub mod error;
pub mod wallet;

pub use amount::{parse_amount, parse_amount_value};
pub use balance::BalanceMap;
pub use error::WalletError;
pub use wallet::{validate_user_id, Wallet, MAX_USER_ID_LEN};
