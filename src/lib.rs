pub mod core;

use std::path::PathBuf;
use std::time::Duration;

pub use crate::core::node::client::{NodeClient, RpcError};
pub use crate::core::node::types::{BlockchainInfo, ListedTransaction};
pub use crate::core::storage::record_status_history;
pub use crate::core::storage::repository::{StorageError, WalletRepository};
pub use crate::core::sync::{
    check_node_status, resolve_sync_status, run_status_poll, StatusSink, SyncStatus,
    SyncStatusStore, SyncType, READY_THRESHOLD,
};
pub use crate::core::transactions::{
    build_transaction_row, TransactionKind, TransactionRow, TransactionTone, WalletTransaction,
    SHIELDED_ADDRESS,
};

use crate::core::AppServices;

const DEFAULT_RPC_URL: &str = "http://127.0.0.1:8232";
const DEFAULT_RPC_TIMEOUT_SECS: u64 = 20;
const DEFAULT_POLL_INTERVAL_SECS: u64 = 15;
const DEFAULT_TX_REFRESH_SECS: u64 = 60;
const DEFAULT_COIN_TICKER: &str = "ANON";
const DEFAULT_HISTORY_MAX_ROWS: i64 = 5000;
const TRANSACTION_PAGE_SIZE: usize = 200;

#[derive(Debug, Clone)]
pub struct Config {
    pub rpc_url: String,
    pub rpc_username: Option<String>,
    pub rpc_password: Option<String>,
    pub rpc_timeout_secs: u64,
    pub poll_interval_secs: u64,
    pub tx_refresh_secs: u64,
    pub database_url: String,
    pub coin_ticker: String,
    pub history_max_rows: i64,
}

impl Config {
    /// Reads configuration from `ANON_WALLET_*` environment variables,
    /// falling back to localhost defaults. Blank values count as unset.
    pub fn from_env() -> Self {
        Self {
            rpc_url: env_or("ANON_WALLET_RPC_URL")
                .unwrap_or_else(|| DEFAULT_RPC_URL.to_string()),
            rpc_username: env_or("ANON_WALLET_RPC_USER"),
            rpc_password: env_or("ANON_WALLET_RPC_PASSWORD"),
            rpc_timeout_secs: env_or("ANON_WALLET_RPC_TIMEOUT_SECS")
                .and_then(|value| value.parse().ok())
                .unwrap_or(DEFAULT_RPC_TIMEOUT_SECS),
            poll_interval_secs: env_or("ANON_WALLET_POLL_INTERVAL_SECS")
                .and_then(|value| value.parse().ok())
                .unwrap_or(DEFAULT_POLL_INTERVAL_SECS),
            tx_refresh_secs: env_or("ANON_WALLET_TX_REFRESH_SECS")
                .and_then(|value| value.parse().ok())
                .unwrap_or(DEFAULT_TX_REFRESH_SECS),
            database_url: env_or("ANON_WALLET_DATABASE_URL")
                .unwrap_or_else(|| to_sqlite_url(PathBuf::from("anon-wallet.db"))),
            coin_ticker: env_or("ANON_WALLET_COIN_TICKER")
                .unwrap_or_else(|| DEFAULT_COIN_TICKER.to_string()),
            history_max_rows: env_or("ANON_WALLET_HISTORY_MAX_ROWS")
                .and_then(|value| value.parse().ok())
                .unwrap_or(DEFAULT_HISTORY_MAX_ROWS),
        }
    }

    pub fn rpc_timeout(&self) -> Duration {
        Duration::from_secs(self.rpc_timeout_secs)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs)
    }

    pub fn tx_refresh_interval(&self) -> Duration {
        Duration::from_secs(self.tx_refresh_secs)
    }
}

fn env_or(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .filter(|value| !value.trim().is_empty())
}

fn to_sqlite_url(path: PathBuf) -> String {
    format!("sqlite://{}?mode=rwc", path.to_string_lossy())
}

fn listed_to_wallet_transaction(listed: ListedTransaction) -> WalletTransaction {
    WalletTransaction {
        txid: listed.txid,
        kind: listed.category,
        address: listed
            .address
            .unwrap_or_else(|| SHIELDED_ADDRESS.to_string()),
        amount: listed.amount.abs(),
        confirmations: listed.confirmations,
        confirmed: listed.confirmations > 0,
        time: listed.time,
    }
}

/// Fetches the wallet's recent transactions from the node and caches them
/// locally. Returns how many rows were written.
pub async fn refresh_transactions(
    client: &NodeClient,
    repository: &WalletRepository,
) -> anyhow::Result<usize> {
    let listed = client
        .list_transactions_with_retry(TRANSACTION_PAGE_SIZE, 0, 2)
        .await?;
    let transactions: Vec<WalletTransaction> = listed
        .into_iter()
        .map(listed_to_wallet_transaction)
        .collect();
    let written = repository.upsert_transactions(&transactions).await?;
    Ok(written)
}

pub async fn run_transaction_refresh(
    client: NodeClient,
    repository: WalletRepository,
    interval: Duration,
) {
    loop {
        match refresh_transactions(&client, &repository).await {
            Ok(written) => tracing::debug!("refreshed {written} wallet transactions"),
            Err(error) => tracing::warn!("transaction refresh failed: {error}"),
        }
        tokio::time::sleep(interval).await;
    }
}

/// Wires up the monitor: repository, node client, status store, history
/// recorder, transaction refresher and the status poll loop. Runs until
/// Ctrl-C.
pub async fn run_daemon(config: Config) -> anyhow::Result<()> {
    for (name, status) in AppServices::default().health_report() {
        tracing::info!("service {name}: {status}");
    }

    let repository = WalletRepository::connect(&config.database_url).await?;
    let client = NodeClient::new(
        &config.rpc_url,
        config.rpc_username.as_deref(),
        config.rpc_password.as_deref(),
        config.rpc_timeout(),
    )?;
    let store = SyncStatusStore::new();

    let recorder = tokio::spawn(record_status_history(
        store.subscribe(),
        repository.clone(),
        config.history_max_rows,
    ));
    let refresher = tokio::spawn(run_transaction_refresh(
        client.clone(),
        repository.clone(),
        config.tx_refresh_interval(),
    ));

    tokio::select! {
        _ = run_status_poll(&client, &store, config.poll_interval()) => {}
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("received ctrl-c, shutting down");
        }
    }

    recorder.abort();
    refresher.abort();
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::response::IntoResponse;
    use axum::routing::post;
    use axum::{Json, Router};
    use serde_json::json;

    #[test]
    fn config_defaults_point_at_local_node() {
        let config = Config::from_env();
        assert_eq!(config.rpc_url, DEFAULT_RPC_URL);
        assert_eq!(config.poll_interval(), Duration::from_secs(15));
        assert_eq!(config.coin_ticker, "ANON");
        assert_eq!(config.history_max_rows, 5000);
    }

    #[test]
    fn sqlite_url_has_read_write_create_mode() {
        assert_eq!(
            to_sqlite_url(PathBuf::from("anon-wallet.db")),
            "sqlite://anon-wallet.db?mode=rwc"
        );
    }

    #[test]
    fn listed_rows_normalize_amount_and_shielded_address() {
        let listed = ListedTransaction {
            txid: "f00d".to_string(),
            category: TransactionKind::Send,
            address: None,
            amount: -2.5,
            confirmations: 0,
            time: 1_600_000_000,
        };

        let transaction = listed_to_wallet_transaction(listed);
        assert_eq!(transaction.amount, 2.5);
        assert_eq!(transaction.address, SHIELDED_ADDRESS);
        assert!(!transaction.confirmed);
        assert!(transaction.is_unconfirmed());
    }

    #[test]
    fn health_report_covers_all_services() {
        let report = AppServices::default().health_report();
        for service in ["node", "storage", "sync", "transactions"] {
            assert_eq!(report.get(service).map(String::as_str), Some("ready"));
        }
    }

    async fn transactions_handler() -> impl IntoResponse {
        Json(json!({
            "result": [
                {
                    "txid": "aaaa",
                    "category": "receive",
                    "address": "t1VnZLe",
                    "amount": 1.25,
                    "confirmations": 3,
                    "time": 1_600_000_000,
                },
                {
                    "txid": "bbbb",
                    "category": "send",
                    "address": null,
                    "amount": -0.5,
                    "confirmations": 0,
                    "time": 1_600_000_100,
                },
            ],
            "error": null,
            "id": "anon-wallet-core",
        }))
    }

    #[tokio::test]
    async fn refresh_transactions_caches_node_rows() {
        let app = Router::new().route("/", post(transactions_handler));
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("listener should bind");
        let address = listener.local_addr().expect("local addr should exist");
        let server_task = tokio::spawn(async move {
            axum::serve(listener, app).await.expect("server should run");
        });

        let client = NodeClient::new(
            &format!("http://{address}/"),
            None,
            None,
            Duration::from_secs(5),
        )
        .expect("client should build");
        let repository = WalletRepository::connect("sqlite::memory:")
            .await
            .expect("connect must succeed");

        let written = refresh_transactions(&client, &repository)
            .await
            .expect("refresh should succeed");
        assert_eq!(written, 2);

        let rows = repository
            .list_transactions(10)
            .await
            .expect("list must succeed");
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].txid, "bbbb");
        assert_eq!(rows[0].amount, 0.5);
        assert_eq!(rows[0].address, SHIELDED_ADDRESS);

        let unconfirmed = repository
            .count_unconfirmed()
            .await
            .expect("count must succeed");
        assert_eq!(unconfirmed, 1);

        server_task.abort();
    }
}
