pub mod node;
pub mod storage;
pub mod sync;
pub mod transactions;

use std::collections::BTreeMap;

use node::NodeService;
use storage::StorageService;
use sync::SyncService;
use transactions::TransactionsService;

#[derive(Debug, Clone, Default)]
pub struct AppServices {
    node: NodeService,
    storage: StorageService,
    sync: SyncService,
    transactions: TransactionsService,
}

impl AppServices {
    pub fn health_report(&self) -> BTreeMap<String, String> {
        let mut report = BTreeMap::new();
        report.insert(self.node.name().to_string(), self.node.status().to_string());
        report.insert(
            self.storage.name().to_string(),
            self.storage.status().to_string(),
        );
        report.insert(self.sync.name().to_string(), self.sync.status().to_string());
        report.insert(
            self.transactions.name().to_string(),
            self.transactions.status().to_string(),
        );
        report
    }
}
