use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct SyncEventRecord {
    pub id: i64,
    pub progress: f64,
    pub sync_type: String,
    pub recorded_at: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct TransactionRecord {
    pub txid: String,
    pub kind: String,
    pub address: String,
    pub amount: f64,
    pub confirmations: i64,
    pub time: i64,
}
