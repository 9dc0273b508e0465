//! Balance-type registry implementations
//!
//! - `fixed` - a set configured at start-up (default `coins`, `exp`)
//! - `catalog` - a remote catalog queried over HTTP on every call

pub mod catalog;
pub mod fixed;

pub use catalog::CatalogRegistry;
pub use fixed::{FixedRegistry, DEFAULT_BALANCE_TYPES};
