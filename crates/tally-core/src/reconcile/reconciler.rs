//! Serialized load-merge-save over an injected store.

use std::sync::Mutex;
use std::thread;
use std::time::Duration;

use chrono::Utc;
use tracing::{info, warn};

use super::engine::{ReconcileReport, ReconciliationEngine};
use crate::error::{StoreError, TallyError};
use crate::models::record::DocumentBatch;
use crate::store::{Inventory, InventoryStore};

/// Commits batches to a store one at a time.
///
/// Each submission loads the committed inventory, merges the batch into that copy and
/// saves it. Nothing is committed unless the save succeeds, so a failed batch leaves
/// the store exactly as it was.
pub struct Reconciler<S: InventoryStore> {
    store: S,
    engine: ReconciliationEngine,
    lock: Mutex<()>,
    max_save_attempts: u32,
}

impl<S: InventoryStore> Reconciler<S> {
    pub fn new(store: S, max_save_attempts: u32) -> Self {
        Self {
            store,
            engine: ReconciliationEngine::new(),
            lock: Mutex::new(()),
            max_save_attempts: max_save_attempts.max(1),
        }
    }

    /// Reconcile one batch into the store.
    pub fn submit(&self, batch: &DocumentBatch) -> Result<ReconcileReport, TallyError> {
        let fail = |source: StoreError| TallyError::Reconcile {
            document: batch.document.clone(),
            source,
        };

        if batch.is_empty() {
            info!("{}: no records, inventory unchanged", batch.document);
            return Ok(ReconcileReport {
                document: batch.document.clone(),
                ..Default::default()
            });
        }

        let _guard = self.lock.lock().map_err(|_| fail(StoreError::Poisoned))?;

        let current = self.store.load().map_err(fail)?;
        let (mut merged, report) = self.engine.reconcile(current, batch);
        merged.touch(Utc::now());
        self.save_with_retry(&merged).map_err(fail)?;

        info!(
            "{}: {} inserted, {} updated ({} records in inventory)",
            batch.document,
            report.inserted,
            report.updated,
            merged.len()
        );
        Ok(report)
    }

    /// Load the committed inventory.
    pub fn snapshot(&self) -> Result<Inventory, TallyError> {
        let _guard = self.lock.lock().map_err(|_| StoreError::Poisoned)?;
        Ok(self.store.load()?)
    }

    fn save_with_retry(&self, inventory: &Inventory) -> Result<(), StoreError> {
        let mut attempt = 1;
        loop {
            match self.store.save(inventory) {
                Ok(()) => return Ok(()),
                Err(e) if attempt < self.max_save_attempts => {
                    warn!(
                        "Save attempt {}/{} failed: {}",
                        attempt, self.max_save_attempts, e
                    );
                    thread::sleep(Duration::from_millis(25 * u64::from(attempt)));
                    attempt += 1;
                }
                Err(e) => {
                    return Err(StoreError::SaveExhausted {
                        attempts: attempt,
                        last: Box::new(e),
                    });
                }
            }
        }
    }
}
