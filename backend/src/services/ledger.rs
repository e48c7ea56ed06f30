//! Shared stock ledger handle
//!
//! One writer at a time mutates the ledger behind a mutex. After every
//! successful mutation the writer publishes an immutable snapshot on a watch
//! channel; previews read that snapshot and never wait on the writer.

use std::sync::Arc;

use shared::StockLedger;
use tokio::sync::{watch, Mutex, MutexGuard};

#[derive(Clone)]
pub struct LedgerHandle {
    writer: Arc<Mutex<StockLedger>>,
    snapshots: Arc<watch::Sender<Arc<StockLedger>>>,
}

impl LedgerHandle {
    pub fn new(ledger: StockLedger) -> Self {
        let (snapshots, _) = watch::channel(Arc::new(ledger.clone()));
        Self {
            writer: Arc::new(Mutex::new(ledger)),
            snapshots: Arc::new(snapshots),
        }
    }

    /// Latest published state
    pub fn snapshot(&self) -> Arc<StockLedger> {
        self.snapshots.borrow().clone()
    }

    /// Exclusive write access. Call [`LedgerHandle::publish`] after mutating.
    pub async fn lock(&self) -> MutexGuard<'_, StockLedger> {
        self.writer.lock().await
    }

    pub fn publish(&self, ledger: &StockLedger) {
        self.snapshots.send_replace(Arc::new(ledger.clone()));
    }
}
