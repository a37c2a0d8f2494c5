use sqlx::{sqlite::SqlitePoolOptions, SqlitePool};

use super::models::{SyncEventRecord, TransactionRecord};
use crate::core::sync::SyncStatus;
use crate::core::transactions::WalletTransaction;

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),
}

#[derive(Debug, Clone)]
pub struct WalletRepository {
    pool: SqlitePool,
}

impl WalletRepository {
    pub async fn connect(database_url: &str) -> Result<Self, StorageError> {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect(database_url)
            .await?;
        sqlx::migrate!("./migrations").run(&pool).await?;
        Ok(Self { pool })
    }

    pub async fn get_setting(&self, key: &str) -> Result<Option<String>, StorageError> {
        let row = sqlx::query_scalar::<_, String>("SELECT value FROM settings WHERE key = ?1")
            .bind(key)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    pub async fn set_setting(&self, key: &str, value: &str) -> Result<(), StorageError> {
        sqlx::query(
            r#"
            INSERT INTO settings (key, value)
            VALUES (?1, ?2)
            ON CONFLICT(key) DO UPDATE SET
              value = excluded.value,
              updated_at = CURRENT_TIMESTAMP
            "#,
        )
        .bind(key)
        .bind(value)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    pub async fn record_sync_event(&self, status: &SyncStatus) -> Result<(), StorageError> {
        sqlx::query("INSERT INTO sync_events (progress, sync_type) VALUES (?1, ?2)")
            .bind(status.progress)
            .bind(status.sync_type.as_str())
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    pub async fn latest_sync_event(&self) -> Result<Option<SyncEventRecord>, StorageError> {
        let row = sqlx::query_as::<_, SyncEventRecord>(
            r#"
            SELECT id, progress, sync_type, recorded_at
            FROM sync_events
            ORDER BY id DESC
            LIMIT 1
            "#,
        )
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    pub async fn recent_sync_events(&self, limit: i64) -> Result<Vec<SyncEventRecord>, StorageError> {
        let rows = sqlx::query_as::<_, SyncEventRecord>(
            r#"
            SELECT id, progress, sync_type, recorded_at
            FROM sync_events
            ORDER BY id DESC
            LIMIT ?1
            "#,
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    /// Keeps only the newest `max_rows` events; returns how many were removed.
    pub async fn prune_sync_events(&self, max_rows: i64) -> Result<u64, StorageError> {
        let affected = sqlx::query(
            r#"
            DELETE FROM sync_events
            WHERE id NOT IN (
              SELECT id FROM sync_events ORDER BY id DESC LIMIT ?1
            )
            "#,
        )
        .bind(max_rows)
        .execute(&self.pool)
        .await?
        .rows_affected();
        Ok(affected)
    }

    pub async fn upsert_transactions(
        &self,
        transactions: &[WalletTransaction],
    ) -> Result<usize, StorageError> {
        let mut affected = 0_usize;
        for transaction in transactions {
            sqlx::query(
                r#"
                INSERT INTO transactions (txid, kind, address, amount, confirmations, time)
                VALUES (?1, ?2, ?3, ?4, ?5, ?6)
                ON CONFLICT(txid, kind) DO UPDATE SET
                  address = excluded.address,
                  amount = excluded.amount,
                  confirmations = excluded.confirmations,
                  time = excluded.time
                "#,
            )
            .bind(&transaction.txid)
            .bind(transaction.kind.as_str())
            .bind(&transaction.address)
            .bind(transaction.amount)
            .bind(transaction.confirmations)
            .bind(transaction.time)
            .execute(&self.pool)
            .await?;
            affected += 1;
        }
        Ok(affected)
    }

    pub async fn list_transactions(&self, limit: i64) -> Result<Vec<TransactionRecord>, StorageError> {
        let rows = sqlx::query_as::<_, TransactionRecord>(
            r#"
            SELECT txid, kind, address, amount, confirmations, time
            FROM transactions
            ORDER BY time DESC
            LIMIT ?1
            "#,
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    pub async fn count_unconfirmed(&self) -> Result<i64, StorageError> {
        let count = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM transactions WHERE confirmations < 1",
        )
        .fetch_one(&self.pool)
        .await?;
        Ok(count)
    }
}
