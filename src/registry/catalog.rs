//! Remote catalog registry
//!
//! Fetches the valid balance types from a Frappe-style resource API:
//!
//! ```text
//! GET {base_url}/api/resource/Balance%20Type?fields=["name","type_name"]
//! Authorization: token {api_key}:{api_secret}
//! ```
//!
//! The response's `data[].type_name` values (trimmed, non-empty) are the valid
//! balance types. The catalog is queried on every call; nothing is cached.

use crate::core::BalanceTypeRegistry;
use crate::types::WalletError;
use async_trait::async_trait;
use reqwest::StatusCode;
use serde::Deserialize;
use std::collections::BTreeSet;
use std::time::Duration;
use tracing::{debug, error};

const RESOURCE_PATH: &str = "/api/resource/Balance%20Type";
const FIELDS: &str = r#"["name","type_name"]"#;

#[derive(Debug, Deserialize)]
struct CatalogResponse {
    #[serde(default)]
    data: Vec<CatalogEntry>,
}

#[derive(Debug, Deserialize)]
struct CatalogEntry {
    #[serde(default)]
    type_name: Option<String>,
}

impl CatalogResponse {
    fn into_currencies(self) -> BTreeSet<String> {
        self.data
            .into_iter()
            .filter_map(|entry| entry.type_name)
            .map(|name| name.trim().to_string())
            .filter(|name| !name.is_empty())
            .collect()
    }
}

/// Registry backed by a remote balance-type catalog
#[derive(Debug, Clone)]
pub struct CatalogRegistry {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    api_secret: String,
}

impl CatalogRegistry {
    /// Create a catalog client
    ///
    /// # Arguments
    ///
    /// * `base_url` - Catalog root, e.g. `https://erp.example.com`
    /// * `api_key` / `api_secret` - Token credentials
    /// * `timeout` - Per-request timeout
    ///
    /// # Errors
    ///
    /// Returns `InternalError` if the HTTP client cannot be built.
    pub fn new(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        api_secret: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, WalletError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(WalletError::internal)?;

        Ok(CatalogRegistry {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            api_secret: api_secret.into(),
        })
    }

    fn endpoint(&self) -> String {
        format!("{}{}", self.base_url, RESOURCE_PATH)
    }

    fn authorization(&self) -> String {
        format!("token {}:{}", self.api_key, self.api_secret)
    }
}

fn unavailable(context: &str, err: impl std::fmt::Display) -> WalletError {
    error!(context, error = %err, "balance type catalog failure");
    WalletError::registry_unavailable(format!("{}: {}", context, err))
}

#[async_trait]
impl BalanceTypeRegistry for CatalogRegistry {
    async fn list_valid_currencies(&self) -> Result<BTreeSet<String>, WalletError> {
        let response = self
            .client
            .get(self.endpoint())
            .query(&[("fields", FIELDS)])
            .header(reqwest::header::AUTHORIZATION, self.authorization())
            .send()
            .await
            .map_err(|e| unavailable("request failed", e))?;

        let status = response.status();
        if status != StatusCode::OK {
            return Err(unavailable("unexpected status", status));
        }

        let body: CatalogResponse = response
            .json()
            .await
            .map_err(|e| unavailable("invalid response body", e))?;

        let currencies = body.into_currencies();
        debug!(count = currencies.len(), "fetched balance types");
        Ok(currencies)
    }
}
