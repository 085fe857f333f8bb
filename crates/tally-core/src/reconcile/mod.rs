//! Folding document batches into the running inventory.

pub mod engine;
mod reconciler;

pub use engine::{MergeAction, MergeOutcome, ReconcileReport, ReconciliationEngine};
pub use reconciler::Reconciler;
