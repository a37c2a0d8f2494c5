use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::sync::watch;

use crate::core::node::client::NodeClient;
use crate::core::node::types::BlockchainInfo;

/// Progress percentage above which the node counts as fully synced.
/// The bound is exclusive: exactly 99.95 still reads as syncing.
pub const READY_THRESHOLD: f64 = 99.95;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SyncType {
    Ready,
    Syncing,
    Error,
}

impl SyncType {
    pub fn as_str(self) -> &'static str {
        match self {
            SyncType::Ready => "ready",
            SyncType::Syncing => "syncing",
            SyncType::Error => "error",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SyncStatus {
    pub progress: f64,
    pub sync_type: SyncType,
}

impl SyncStatus {
    pub fn error() -> Self {
        Self {
            progress: 0.0,
            sync_type: SyncType::Error,
        }
    }

    fn from_snapshot(info: &BlockchainInfo) -> Self {
        let progress = info.verification_progress * 100.0;
        let sync_type = if progress > READY_THRESHOLD {
            SyncType::Ready
        } else {
            SyncType::Syncing
        };
        Self {
            progress,
            sync_type,
        }
    }
}

/// Classifies the outcome of one `getblockchaininfo` query. Pure: a failed
/// or empty query maps to the error status, never to a propagated error.
pub fn resolve_sync_status<E>(outcome: Result<Option<BlockchainInfo>, E>) -> SyncStatus {
    match outcome {
        Ok(Some(info)) => SyncStatus::from_snapshot(&info),
        Ok(None) | Err(_) => SyncStatus::error(),
    }
}

/// Destination for freshly resolved statuses. Fire-and-forget: no return
/// value and no error path.
pub trait StatusSink: Send + Sync {
    fn update_sync_status(&self, status: SyncStatus);
}

/// Last-write-wins in-memory status store backed by a watch channel.
/// Starts out syncing at zero progress, the state a wallet shows before
/// the first poll lands.
#[derive(Debug, Clone)]
pub struct SyncStatusStore {
    sender: watch::Sender<SyncStatus>,
}

impl SyncStatusStore {
    pub fn new() -> Self {
        let (sender, _) = watch::channel(SyncStatus {
            progress: 0.0,
            sync_type: SyncType::Syncing,
        });
        Self { sender }
    }

    pub fn latest(&self) -> SyncStatus {
        self.sender.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<SyncStatus> {
        self.sender.subscribe()
    }
}

impl Default for SyncStatusStore {
    fn default() -> Self {
        Self::new()
    }
}

impl StatusSink for SyncStatusStore {
    fn update_sync_status(&self, status: SyncStatus) {
        self.sender.send_replace(status);
    }
}

/// One poll: query, resolve, forward to the sink, return the status.
pub async fn check_node_status(client: &NodeClient, sink: &dyn StatusSink) -> SyncStatus {
    let outcome = client.get_blockchain_info().await;
    if let Err(error) = &outcome {
        tracing::debug!("getblockchaininfo failed: {error}");
    }
    let status = resolve_sync_status(outcome);
    sink.update_sync_status(status.clone());
    status
}

/// Polls the node forever. Each query is awaited before the next tick, so
/// this loop never issues overlapping requests.
pub async fn run_status_poll(client: &NodeClient, sink: &dyn StatusSink, interval: Duration) {
    let mut previous: Option<SyncType> = None;
    loop {
        let status = check_node_status(client, sink).await;
        if previous != Some(status.sync_type) {
            tracing::info!(
                "node sync status changed to {} ({:.2}%)",
                status.sync_type.as_str(),
                status.progress
            );
        }
        previous = Some(status.sync_type);
        tokio::time::sleep(interval).await;
    }
}

#[derive(Debug, Clone, Default)]
pub struct SyncService;

impl SyncService {
    pub fn name(&self) -> &'static str {
        "sync"
    }

    pub fn status(&self) -> &'static str {
        "ready"
    }
}
