//! Wallet store implementations
//!
//! - `memory` - `DashMap`-backed store used for tests and database-less runs
//! - `postgres` - `sqlx` PostgreSQL store with a JSONB balances column

pub mod memory;
pub mod postgres;

pub use memory::MemoryWalletStore;
pub use postgres::PgWalletStore;
