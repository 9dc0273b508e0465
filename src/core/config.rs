//! Engine configuration
//!
//! Everything the engine needs besides its collaborators is passed in through
//! [`EngineConfig`] at construction time.

use rust_decimal::Decimal;
use std::time::Duration;

/// Configuration for the wallet operations engine
#[derive(Clone, Debug, PartialEq)]
pub struct EngineConfig {
    /// Largest amount accepted by a single add or deduct
    pub amount_ceiling: Decimal,
    /// Write attempts before giving up with `ConcurrentModification`
    pub max_retries: u32,
    /// Upper bound on every registry call
    pub registry_timeout: Duration,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            amount_ceiling: Decimal::new(1_000_000_000, 0),
            max_retries: 5,
            registry_timeout: Duration::from_secs(5),
        }
    }
}

impl EngineConfig {
    /// Create a new EngineConfig with custom values
    ///
    /// Non-positive ceilings, zero retries and zero timeouts fall back to the
    /// defaults with a warning.
    pub fn new(amount_ceiling: Decimal, max_retries: u32, registry_timeout: Duration) -> Self {
        let default = Self::default();

        let amount_ceiling = if amount_ceiling <= Decimal::ZERO {
            tracing::warn!(
                %amount_ceiling,
                default = %default.amount_ceiling,
                "invalid amount ceiling, using default"
            );
            default.amount_ceiling
        } else {
            amount_ceiling
        };

        let max_retries = if max_retries == 0 {
            tracing::warn!(
                default = default.max_retries,
                "invalid max_retries (0), using default"
            );
            default.max_retries
        } else {
            max_retries
        };

        let registry_timeout = if registry_timeout.is_zero() {
            tracing::warn!(
                default_ms = default.registry_timeout.as_millis() as u64,
                "invalid registry timeout (0), using default"
            );
            default.registry_timeout
        } else {
            registry_timeout
        };

        Self {
            amount_ceiling,
            max_retries,
            registry_timeout,
        }
    }
}
