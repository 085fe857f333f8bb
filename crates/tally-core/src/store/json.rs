//! JSON file store with write-to-temp-then-rename saves.

use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use tracing::{debug, trace};

use super::{Inventory, InventoryStore, Result};
use crate::error::StoreError;

/// Inventory persisted as a single pretty-printed JSON document.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_else(|| "inventory.json".into());
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

impl InventoryStore for JsonFileStore {
    fn load(&self) -> Result<Inventory> {
        if !self.path.exists() {
            debug!("No inventory at {}, starting empty", self.path.display());
            return Ok(Inventory::new());
        }

        let content =
            fs::read_to_string(&self.path).map_err(|e| StoreError::io(&self.path, e))?;
        let inventory: Inventory =
            serde_json::from_str(&content).map_err(|source| StoreError::Corrupt {
                path: self.path.clone(),
                source,
            })?;

        debug!(
            "Loaded {} records from {}",
            inventory.len(),
            self.path.display()
        );
        Ok(inventory)
    }

    fn save(&self, inventory: &Inventory) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| StoreError::io(parent, e))?;
        }

        let json = serde_json::to_string_pretty(inventory)?;
        let temp = self.temp_path();

        // Write and sync the temp file fully before it replaces the store
        let mut file = File::create(&temp).map_err(|e| StoreError::io(&temp, e))?;
        file.write_all(json.as_bytes())
            .and_then(|_| file.sync_all())
            .map_err(|e| StoreError::io(&temp, e))?;
        drop(file);

        fs::rename(&temp, &self.path).map_err(|e| StoreError::io(&self.path, e))?;

        trace!("Saved {} records to {}", inventory.len(), self.path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::record::{BatchMetadata, InventoryRecord};

    #[test]
    fn test_missing_file_loads_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::new(dir.path().join("inventory.json"));
        assert!(store.load().unwrap().is_empty());
    }

    #[test]
    fn test_save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::new(dir.path().join("nested").join("inventory.json"));

        let mut inventory = Inventory::new();
        let mut record = InventoryRecord::new("Tito's Vodka").unwrap();
        record.ordered_quantity = 5;
        inventory.upsert(record);
        inventory.set_last_batch(BatchMetadata::new(None, Some("$109.95".into())));

        store.save(&inventory).unwrap();
        let loaded = store.load().unwrap();

        assert_eq!(loaded, inventory);
        assert!(!store.temp_path().exists());
    }

    #[test]
    fn test_save_replaces_previous_content() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::new(dir.path().join("inventory.json"));

        let mut first = Inventory::new();
        first.upsert(InventoryRecord::new("Merlot").unwrap());
        first.upsert(InventoryRecord::new("Chablis").unwrap());
        store.save(&first).unwrap();

        let mut second = Inventory::new();
        second.upsert(InventoryRecord::new("Budweiser").unwrap());
        store.save(&second).unwrap();

        let loaded = store.load().unwrap();
        assert_eq!(loaded.len(), 1);
        assert!(loaded.contains_key("budweiser"));
    }

    #[test]
    fn test_corrupt_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("inventory.json");
        fs::write(&path, "{ not json").unwrap();

        let store = JsonFileStore::new(&path);
        assert!(matches!(store.load(), Err(StoreError::Corrupt { .. })));
    }
}
