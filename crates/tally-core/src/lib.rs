//! Core library for turning invoice text into a running inventory.
//!
//! This crate provides:
//! - Line tokenization, per-document schema inference and record parsing
//! - Normalization of prices, quantities, units and categories
//! - Reconciliation of document batches into a keyed inventory
//! - Atomic JSON persistence and CSV export
//! - Text adapters for TXT, CSV, JSON and (with the `pdf` feature) PDF sources

pub mod error;
pub mod models;
pub mod normalize;
pub mod parse;
pub mod pipeline;
pub mod reconcile;
pub mod source;
pub mod store;

pub use error::{ExtractError, Result, StoreError, TallyError};
pub use models::config::{ExportConfig, ParsingConfig, StoreConfig, TallyConfig};
pub use models::record::{item_key, BatchMetadata, Category, DocumentBatch, InventoryRecord};
pub use normalize::{CategoryClassifier, CategorySignals, Normalizer, RuleClassifier};
pub use parse::{ColumnSchema, DocumentParser, ParseStats};
pub use pipeline::Pipeline;
pub use reconcile::{MergeAction, MergeOutcome, ReconcileReport, ReconciliationEngine, Reconciler};
pub use source::{extract_text, DocumentKind};
pub use store::{
    export_to_path, write_export, CategoryTotal, Inventory, InventoryStore, JsonFileStore,
    MemoryStore,
};
