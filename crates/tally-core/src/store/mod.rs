//! Inventory persistence.
//!
//! The store is a dumb keyed collection: `load` and `save` each replace the full
//! content, and all merge policy lives in the reconciliation engine.

mod export;
mod json;
mod memory;

pub use export::{export_to_path, write_export, EXPORT_HEADER};
pub use json::JsonFileStore;
pub use memory::MemoryStore;

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::StoreError;
use crate::models::record::{
    item_key, saturating_add_value, BatchMetadata, Category, InventoryRecord,
};

/// Result type for store operations.
pub type Result<T> = std::result::Result<T, StoreError>;

/// Keyed persistence for the inventory.
pub trait InventoryStore: Send + Sync {
    /// Load the committed inventory. A store that was never saved loads empty.
    fn load(&self) -> Result<Inventory>;

    /// Replace the committed inventory. Either the whole snapshot becomes visible to
    /// the next `load` or none of it does.
    fn save(&self, inventory: &Inventory) -> Result<()>;
}

impl<S> InventoryStore for Arc<S>
where
    S: InventoryStore + ?Sized,
{
    fn load(&self) -> Result<Inventory> {
        (**self).load()
    }

    fn save(&self, inventory: &Inventory) -> Result<()> {
        (**self).save(inventory)
    }
}

/// The canonical inventory: records in insertion order, unique by `item_key`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "InventorySnapshot", into = "InventorySnapshot")]
pub struct Inventory {
    records: Vec<InventoryRecord>,
    index: HashMap<String, usize>,
    last_batch: Option<BatchMetadata>,
    updated_at: Option<DateTime<Utc>>,
}

#[derive(Serialize, Deserialize)]
struct InventorySnapshot {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    updated_at: Option<DateTime<Utc>>,
    #[serde(default)]
    records: Vec<InventoryRecord>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    last_batch: Option<BatchMetadata>,
}

impl From<InventorySnapshot> for Inventory {
    fn from(snapshot: InventorySnapshot) -> Self {
        let mut inventory = Inventory::from_records(snapshot.records);
        inventory.last_batch = snapshot.last_batch;
        inventory.updated_at = snapshot.updated_at;
        inventory
    }
}

impl From<Inventory> for InventorySnapshot {
    fn from(inventory: Inventory) -> Self {
        Self {
            updated_at: inventory.updated_at,
            records: inventory.records,
            last_batch: inventory.last_batch,
        }
    }
}

/// Per-category totals.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryTotal {
    pub category: Category,
    pub items: usize,
    pub ordered_quantity: u64,
    pub extended_value: Decimal,
}

impl Inventory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build an inventory from records, re-deriving each key from its name.
    /// A later record with the same key replaces the earlier one in place.
    pub fn from_records(records: impl IntoIterator<Item = InventoryRecord>) -> Self {
        let mut inventory = Self::new();
        for mut record in records {
            record.item_key = item_key(&record.item_name);
            inventory.upsert(record);
        }
        inventory
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.index.contains_key(key)
    }

    pub fn get(&self, key: &str) -> Option<&InventoryRecord> {
        self.index.get(key).map(|&i| &self.records[i])
    }

    pub fn get_mut(&mut self, key: &str) -> Option<&mut InventoryRecord> {
        self.index.get(key).map(|&i| &mut self.records[i])
    }

    /// Insert a record, replacing any record with the same key in place.
    pub fn upsert(&mut self, record: InventoryRecord) {
        match self.index.get(&record.item_key) {
            Some(&i) => self.records[i] = record,
            None => {
                self.index.insert(record.item_key.clone(), self.records.len());
                self.records.push(record);
            }
        }
    }

    /// Records in store order.
    pub fn iter(&self) -> impl Iterator<Item = &InventoryRecord> {
        self.records.iter()
    }

    pub fn records(&self) -> &[InventoryRecord] {
        &self.records
    }

    /// Metadata of the most recently merged batch, used for export footers.
    pub fn last_batch(&self) -> Option<&BatchMetadata> {
        self.last_batch.as_ref()
    }

    pub fn set_last_batch(&mut self, metadata: BatchMetadata) {
        self.last_batch = Some(metadata);
    }

    /// When a batch was last committed.
    pub fn updated_at(&self) -> Option<DateTime<Utc>> {
        self.updated_at
    }

    pub fn touch(&mut self, at: DateTime<Utc>) {
        self.updated_at = Some(at);
    }

    /// Sum of every record's extended value.
    pub fn total_value(&self) -> Decimal {
        self.records
            .iter()
            .map(InventoryRecord::extended_value)
            .fold(Decimal::ZERO, saturating_add_value)
    }

    /// Sum of every record's ordered quantity, saturating at `u64::MAX`.
    pub fn total_quantity(&self) -> u64 {
        self.records
            .iter()
            .fold(0u64, |acc, r| acc.saturating_add(r.ordered_quantity))
    }

    /// Quantity and value totals grouped by category, in category order.
    /// Categories without records are omitted.
    pub fn category_summary(&self) -> Vec<CategoryTotal> {
        Category::ALL
            .into_iter()
            .filter_map(|category| {
                let members: Vec<&InventoryRecord> =
                    self.records.iter().filter(|r| r.category == category).collect();
                if members.is_empty() {
                    return None;
                }
                Some(CategoryTotal {
                    category,
                    items: members.len(),
                    ordered_quantity: members
                        .iter()
                        .fold(0u64, |acc, r| acc.saturating_add(r.ordered_quantity)),
                    extended_value: members
                        .iter()
                        .map(|r| r.extended_value())
                        .fold(Decimal::ZERO, saturating_add_value),
                })
            })
            .collect()
    }
}
