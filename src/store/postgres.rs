//! PostgreSQL wallet store
//!
//! Wallets live in one `wallets` table keyed by `user_id`, with the balance map
//! in a JSONB column. Balance writes are a single conditional `UPDATE` on the
//! row version, so two writers that read the same version cannot both win.

use crate::core::WalletStore;
use crate::types::{BalanceMap, Wallet, WalletError};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::{PgPoolOptions, PgRow};
use sqlx::types::Json;
use sqlx::{PgPool, Row};
use std::time::Duration;
use tracing::{error, info};

const CREATE_TABLE: &str = r#"
    CREATE TABLE IF NOT EXISTS wallets (
        user_id     TEXT PRIMARY KEY,
        balances    JSONB NOT NULL DEFAULT '{}'::jsonb,
        version     BIGINT NOT NULL DEFAULT 0,
        created_at  TIMESTAMPTZ NOT NULL DEFAULT NOW(),
        updated_at  TIMESTAMPTZ NOT NULL DEFAULT NOW(),
        deleted_at  TIMESTAMPTZ NULL
    )
"#;

const CREATE_DELETED_INDEX: &str =
    "CREATE INDEX IF NOT EXISTS idx_wallets_deleted_at ON wallets (deleted_at)";

/// Wallet store backed by a PostgreSQL pool
#[derive(Debug, Clone)]
pub struct PgWalletStore {
    pool: PgPool,
}

impl PgWalletStore {
    /// Wrap an existing pool
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Open a pool against `database_url`
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if no connection can be established.
    pub async fn connect(
        database_url: &str,
        max_connections: u32,
        acquire_timeout: Duration,
    ) -> Result<Self, WalletError> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .acquire_timeout(acquire_timeout)
            .connect(database_url)
            .await
            .map_err(|e| store_error("connect", e))?;

        Ok(Self::new(pool))
    }

    /// Create the wallets table and its index if they do not exist
    pub async fn migrate(&self) -> Result<(), WalletError> {
        sqlx::query(CREATE_TABLE)
            .execute(&self.pool)
            .await
            .map_err(|e| store_error("migrate", e))?;
        sqlx::query(CREATE_DELETED_INDEX)
            .execute(&self.pool)
            .await
            .map_err(|e| store_error("migrate", e))?;

        info!("wallets table ready");
        Ok(())
    }
}

fn row_to_wallet(row: &PgRow) -> Result<Wallet, sqlx::Error> {
    let Json(balances): Json<BalanceMap> = row.try_get("balances")?;
    let version: i64 = row.try_get("version")?;
    let created_at: DateTime<Utc> = row.try_get("created_at")?;
    let updated_at: DateTime<Utc> = row.try_get("updated_at")?;

    Ok(Wallet {
        user_id: row.try_get("user_id")?,
        balances,
        created_at,
        updated_at,
        version: version.max(0) as u64,
    })
}

fn store_error(operation: &str, err: sqlx::Error) -> WalletError {
    error!(operation, error = %err, "wallet store failure");
    WalletError::store_error(operation, err)
}

fn is_unique_violation(err: &sqlx::Error) -> bool {
    matches!(err, sqlx::Error::Database(db) if db.is_unique_violation())
}

#[async_trait]
impl WalletStore for PgWalletStore {
    async fn create(&self, wallet: Wallet) -> Result<Wallet, WalletError> {
        let result = sqlx::query(
            r#"
            INSERT INTO wallets (user_id, balances, version, created_at, updated_at)
            VALUES ($1, $2, 0, $3, $3)
            RETURNING user_id, balances, version, created_at, updated_at
            "#,
        )
        .bind(&wallet.user_id)
        .bind(Json(&wallet.balances))
        .bind(wallet.created_at)
        .fetch_one(&self.pool)
        .await;

        match result {
            Ok(row) => row_to_wallet(&row).map_err(|e| store_error("create", e)),
            Err(e) if is_unique_violation(&e) => {
                Err(WalletError::wallet_already_exists(&wallet.user_id))
            }
            Err(e) => Err(store_error("create", e)),
        }
    }

    async fn get_by_user_id(&self, user_id: &str) -> Result<Wallet, WalletError> {
        let row = sqlx::query(
            r#"
            SELECT user_id, balances, version, created_at, updated_at
            FROM wallets
            WHERE user_id = $1 AND deleted_at IS NULL
            "#,
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| store_error("get", e))?;

        match row {
            Some(row) => row_to_wallet(&row).map_err(|e| store_error("get", e)),
            None => Err(WalletError::wallet_not_found(user_id)),
        }
    }

    async fn exists(&self, user_id: &str) -> Result<bool, WalletError> {
        sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM wallets WHERE user_id = $1 AND deleted_at IS NULL)",
        )
        .bind(user_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| store_error("exists", e))
    }

    async fn replace_balances(
        &self,
        user_id: &str,
        balances: &BalanceMap,
        expected_version: u64,
    ) -> Result<(), WalletError> {
        let result = sqlx::query(
            r#"
            UPDATE wallets
            SET balances = $2, version = version + 1, updated_at = NOW()
            WHERE user_id = $1 AND version = $3 AND deleted_at IS NULL
            "#,
        )
        .bind(user_id)
        .bind(Json(balances))
        .bind(expected_version as i64)
        .execute(&self.pool)
        .await
        .map_err(|e| store_error("replace_balances", e))?;

        if result.rows_affected() == 1 {
            return Ok(());
        }

        // Zero rows: either the wallet is gone or its version moved on.
        if self.exists(user_id).await? {
            Err(WalletError::concurrent_modification(user_id, 1))
        } else {
            Err(WalletError::wallet_not_found(user_id))
        }
    }

    async fn soft_delete(&self, user_id: &str) -> Result<(), WalletError> {
        let result = sqlx::query(
            "UPDATE wallets SET deleted_at = NOW() WHERE user_id = $1 AND deleted_at IS NULL",
        )
        .bind(user_id)
        .execute(&self.pool)
        .await
        .map_err(|e| store_error("soft_delete", e))?;

        if result.rows_affected() == 0 {
            return Err(WalletError::wallet_not_found(user_id));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;

    #[test]
    fn test_non_database_errors_are_not_unique_violations() {
        assert!(!is_unique_violation(&sqlx::Error::RowNotFound));
        assert!(!is_unique_violation(&sqlx::Error::PoolTimedOut));
    }

    #[test]
    fn test_store_error_keeps_operation_and_raw_text() {
        let error = store_error("create", sqlx::Error::PoolTimedOut);

        match error {
            WalletError::StoreError { operation, message } => {
                assert_eq!(operation, "create");
                assert!(!message.is_empty());
            }
            other => panic!("expected StoreError, got {:?}", other),
        }
    }

    async fn live_store() -> PgWalletStore {
        let url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");
        let store = PgWalletStore::connect(&url, 2, Duration::from_secs(5))
            .await
            .unwrap();
        store.migrate().await.unwrap();
        store
    }

    #[tokio::test]
    #[ignore = "requires a PostgreSQL database (DATABASE_URL)"]
    async fn test_live_round_trip() {
        let store = live_store().await;
        let user_id = format!("test-{}", uuid::Uuid::new_v4());

        let created = store
            .create(Wallet::new(
                &user_id,
                BalanceMap::with_currencies(["coins", "exp"]),
            ))
            .await
            .unwrap();
        assert_eq!(created.version, 0);

        let mut balances = created.balances.clone();
        balances.add("coins", Decimal::new(1050, 2)).unwrap();
        store.replace_balances(&user_id, &balances, 0).await.unwrap();

        let stale = store.replace_balances(&user_id, &balances, 0).await;
        assert!(matches!(
            stale,
            Err(WalletError::ConcurrentModification { .. })
        ));

        let fetched = store.get_by_user_id(&user_id).await.unwrap();
        assert_eq!(fetched.balances.get("coins"), Decimal::new(1050, 2));
        assert_eq!(fetched.version, 1);

        store.soft_delete(&user_id).await.unwrap();
        assert!(!store.exists(&user_id).await.unwrap());
        assert!(matches!(
            store
                .create(Wallet::new(&user_id, BalanceMap::new()))
                .await,
            Err(WalletError::WalletAlreadyExists { .. })
        ));
    }
}
