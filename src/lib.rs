//! Wallet Service Library
//! # Overview
//!
//! This library implements a multi-currency wallet microservice: one wallet per
//! external user id, holding named non-negative balances (e.g. `coins`, `exp`)
//! that change only through add and deduct operations.
//!
//! # Architecture
//!
//! The system is organized into several key components:
//!
//! - [`types`] - Core data types (BalanceMap, Wallet, WalletError, amount parsing)
//! - [`core`] - Business logic components:
//!   - [`core::engine`] - Wallet operations: validate, fetch, mutate, persist, reload
//!   - [`core::traits`] - Store and registry contracts the engine depends on
//!   - [`core::config`] - Engine configuration
//! - [`store`] - Wallet persistence (in-memory and PostgreSQL)
//! - [`registry`] - Valid balance types (fixed set or remote catalog)
//! - [`api`] - HTTP router, handlers and response envelope
//! - [`cli`] - Configuration from flags and environment variables
//!
//! # Concurrency
//!
//! Balance writes are optimistic: each wallet carries a version, the store only
//! accepts a write made against the current version, and the engine retries a
//! bounded number of times on conflict. Concurrent increments are never lost.

// Module declarations
pub mod api;
pub mod cli;
pub mod core;
pub mod registry;
pub mod store;
pub mod types;

pub use api::{create_router, AppState};
pub use core::{BalanceTypeRegistry, EngineConfig, WalletEngine, WalletStore};
pub use registry::{CatalogRegistry, FixedRegistry};
pub use store::{MemoryWalletStore, PgWalletStore};
pub use types::{BalanceMap, Wallet, WalletError};
