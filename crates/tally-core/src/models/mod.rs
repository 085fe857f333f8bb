//! Data models: inventory records, batches and configuration.

pub mod config;
pub mod record;

pub use config::{ExportConfig, ParsingConfig, StoreConfig, TallyConfig};
pub use record::{item_key, BatchMetadata, Category, DocumentBatch, InventoryRecord, CONFIRMED};
