//! Core business logic module
//!
//! This module contains the wallet processing components:
//! - `traits` - Store and registry abstractions the engine depends on
//! - `config` - Engine configuration (amount ceiling, retries, registry timeout)
//! - `engine` - Wallet operations orchestration

pub mod config;
pub mod engine;
pub mod traits;

pub use config::EngineConfig;
pub use engine::{BalanceOperation, WalletEngine};
pub use traits::{BalanceTypeRegistry, WalletStore};
