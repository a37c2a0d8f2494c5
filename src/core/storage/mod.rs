pub mod models;
pub mod repository;

use tokio::sync::watch;

use crate::core::sync::SyncStatus;
use repository::WalletRepository;

/// Persists every status change the store publishes, keeping the history
/// table capped at `max_rows`. Runs until the store side is dropped.
/// Watch semantics mean a slow recorder samples the latest value rather
/// than queueing every poll.
pub async fn record_status_history(
    mut receiver: watch::Receiver<SyncStatus>,
    repository: WalletRepository,
    max_rows: i64,
) {
    while receiver.changed().await.is_ok() {
        let status = receiver.borrow().clone();
        if let Err(error) = repository.record_sync_event(&status).await {
            tracing::warn!("failed to record sync event: {error}");
            continue;
        }
        if let Err(error) = repository.prune_sync_events(max_rows).await {
            tracing::warn!("failed to prune sync history: {error}");
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct StorageService;

impl StorageService {
    pub fn name(&self) -> &'static str {
        "storage"
    }

    pub fn status(&self) -> &'static str {
        "ready"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::sync::{StatusSink, SyncStatus, SyncStatusStore, SyncType};
    use std::time::Duration;

    async fn wait_for_latest(repository: &WalletRepository, sync_type: &str) {
        for _ in 0..50 {
            let latest = repository
                .latest_sync_event()
                .await
                .expect("latest must succeed");
            if latest.map(|event| event.sync_type) == Some(sync_type.to_string()) {
                return;
            }
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
        panic!("recorder did not persist a {sync_type} event in time");
    }

    #[tokio::test]
    async fn recorder_persists_store_updates_and_prunes() {
        let repository = WalletRepository::connect("sqlite::memory:")
            .await
            .expect("connect must succeed");
        let store = SyncStatusStore::new();

        let recorder = tokio::spawn(record_status_history(
            store.subscribe(),
            repository.clone(),
            2,
        ));

        store.update_sync_status(SyncStatus {
            progress: 40.0,
            sync_type: SyncType::Syncing,
        });
        tokio::time::sleep(Duration::from_millis(100)).await;
        store.update_sync_status(SyncStatus {
            progress: 60.0,
            sync_type: SyncType::Syncing,
        });
        tokio::time::sleep(Duration::from_millis(100)).await;
        store.update_sync_status(SyncStatus {
            progress: 100.0,
            sync_type: SyncType::Ready,
        });

        wait_for_latest(&repository, "ready").await;
        let events = repository
            .recent_sync_events(10)
            .await
            .expect("recent must succeed");
        assert!(!events.is_empty() && events.len() <= 2);
        assert_eq!(events[0].sync_type, "ready");
        assert_eq!(events[0].progress, 100.0);

        recorder.abort();
    }
}
