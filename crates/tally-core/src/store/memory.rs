//! In-memory store for embedding and tests.

use std::sync::RwLock;

use super::{Inventory, InventoryStore, Result};
use crate::error::StoreError;

/// Keeps the committed inventory in process memory.
#[derive(Debug, Default)]
pub struct MemoryStore {
    inner: RwLock<Inventory>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl InventoryStore for MemoryStore {
    fn load(&self) -> Result<Inventory> {
        self.inner
            .read()
            .map(|inventory| inventory.clone())
            .map_err(|_| StoreError::Poisoned)
    }

    fn save(&self, inventory: &Inventory) -> Result<()> {
        let mut guard = self.inner.write().map_err(|_| StoreError::Poisoned)?;
        *guard = inventory.clone();
        Ok(())
    }
}
