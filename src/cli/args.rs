use crate::core::{BalanceTypeRegistry, EngineConfig};
use crate::registry::{CatalogRegistry, FixedRegistry};
use crate::types::WalletError;
use clap::{Parser, ValueEnum};
use rust_decimal::Decimal;
use std::sync::Arc;
use std::time::Duration;

/// Wallet microservice
#[derive(Parser, Debug, Clone)]
#[command(name = "wallet-service")]
#[command(about = "Multi-currency wallet microservice", long_about = None)]
pub struct ServiceConfig {
    /// Address to bind
    #[arg(long, env = "HOST", default_value = "0.0.0.0")]
    pub host: String,

    /// Port to listen on
    #[arg(long, env = "PORT", default_value_t = 8080)]
    pub port: u16,

    /// PostgreSQL connection string; the in-memory store is used when unset
    #[arg(long, env = "DATABASE_URL")]
    pub database_url: Option<String>,

    /// Maximum pooled database connections
    #[arg(long, env = "DB_MAX_CONNECTIONS", default_value_t = 10)]
    pub db_max_connections: u32,

    /// Where valid balance types come from
    #[arg(long, env = "REGISTRY_MODE", value_enum, default_value = "fixed")]
    pub registry_mode: RegistryMode,

    /// Balance types served in fixed mode (comma separated)
    #[arg(
        long,
        env = "BALANCE_TYPES",
        value_delimiter = ',',
        default_values = ["coins", "exp"]
    )]
    pub balance_types: Vec<String>,

    /// Catalog base URL (catalog mode)
    #[arg(long, env = "FRAPPE_URL")]
    pub frappe_url: Option<String>,

    /// Catalog API key (catalog mode)
    #[arg(long, env = "FRAPPE_API_KEY", default_value = "", hide_env_values = true)]
    pub frappe_api_key: String,

    /// Catalog API secret (catalog mode)
    #[arg(long, env = "FRAPPE_API_SECRET", default_value = "", hide_env_values = true)]
    pub frappe_api_secret: String,

    /// Timeout for each registry call, in milliseconds
    #[arg(long, env = "REGISTRY_TIMEOUT_MS", default_value_t = 5000)]
    pub registry_timeout_ms: u64,

    /// Largest amount accepted by a single add or deduct
    #[arg(long, env = "AMOUNT_CEILING", default_value = "1000000000")]
    pub amount_ceiling: Decimal,

    /// Write attempts on concurrent modification before giving up
    #[arg(long, env = "MAX_UPDATE_RETRIES", default_value_t = 5)]
    pub max_update_retries: u32,
}

/// Source of valid balance types
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum RegistryMode {
    /// Fixed list from `BALANCE_TYPES`
    Fixed,
    /// Remote catalog at `FRAPPE_URL`
    Catalog,
}

impl ServiceConfig {
    /// `host:port` to bind
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Build the engine configuration
    ///
    /// Invalid values fall back to the engine defaults (see [`EngineConfig::new`]).
    pub fn engine_config(&self) -> EngineConfig {
        EngineConfig::new(
            self.amount_ceiling,
            self.max_update_retries,
            Duration::from_millis(self.registry_timeout_ms),
        )
    }

    /// Build the configured balance-type registry
    ///
    /// # Errors
    ///
    /// Returns `ValidationFailed` in catalog mode without a catalog URL, or
    /// `InternalError` if the HTTP client cannot be built.
    pub fn build_registry(&self) -> Result<Arc<dyn BalanceTypeRegistry>, WalletError> {
        match self.registry_mode {
            RegistryMode::Fixed => Ok(Arc::new(FixedRegistry::new(&self.balance_types))),
            RegistryMode::Catalog => {
                let url = self
                    .frappe_url
                    .as_deref()
                    .filter(|url| !url.trim().is_empty())
                    .ok_or_else(|| {
                        WalletError::validation_failed(
                            "frappe_url",
                            "required when registry mode is catalog",
                        )
                    })?;

                let registry = CatalogRegistry::new(
                    url,
                    &self.frappe_api_key,
                    &self.frappe_api_secret,
                    self.engine_config().registry_timeout,
                )?;
                Ok(Arc::new(registry))
            }
        }
    }
}
