//! Candidate record normalization: numbers, units, categories and keys.

pub mod amounts;
pub mod category;
pub mod units;

pub use amounts::{coerce_price, coerce_quantity, format_amount, parse_amount, Coerced};
pub use category::{categorize_text, CategoryClassifier, CategorySignals, RuleClassifier};
pub use units::{unit_factor, unit_from_pack_size};

use std::sync::Arc;

use tracing::debug;

use crate::models::record::InventoryRecord;
use crate::parse::{CandidateRecord, FieldRole};

/// A normalized record plus the names of fields that failed numeric coercion.
#[derive(Debug, Clone, PartialEq)]
pub struct Normalized {
    pub record: InventoryRecord,
    pub parse_failed: Vec<&'static str>,
}

/// Turns candidate records into inventory records.
#[derive(Clone, Default)]
pub struct Normalizer {
    classifier: Option<Arc<dyn CategoryClassifier>>,
}

impl std::fmt::Debug for Normalizer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Normalizer")
            .field("external_classifier", &self.classifier.is_some())
            .finish()
    }
}

impl Normalizer {
    /// Create a normalizer using only the keyword rules.
    pub fn new() -> Self {
        Self { classifier: None }
    }

    /// Consult an external classifier before the keyword rules.
    pub fn with_classifier(mut self, classifier: Arc<dyn CategoryClassifier>) -> Self {
        self.classifier = Some(classifier);
        self
    }

    /// Normalize one candidate. Returns `None` only if the row has no item name.
    pub fn normalize(&self, candidate: &CandidateRecord) -> Option<Normalized> {
        let mut record = InventoryRecord::new(candidate.value(FieldRole::ItemName)?)?;
        let mut parse_failed = Vec::new();

        let owned = |role| candidate.value(role).map(str::to_string);
        record.item_number = owned(FieldRole::ItemNumber);
        record.brand = owned(FieldRole::Brand);
        record.pack_size = owned(FieldRole::PackSize);

        let price = coerce_price(candidate.value(FieldRole::Price));
        if price.failed {
            parse_failed.push("price");
        }
        record.price = price.value;
        record.price_known = price.known;

        let quantity = coerce_quantity(candidate.value(FieldRole::Quantity));
        if quantity.failed {
            parse_failed.push("ordered_quantity");
        }
        record.ordered_quantity = quantity.value;

        record.unit = candidate
            .value(FieldRole::Unit)
            .map(units::canonical_unit)
            .or_else(|| record.pack_size.as_deref().and_then(unit_from_pack_size));
        record.unit_cost_normalized = unit_factor(record.unit.as_deref());

        let signals = CategorySignals {
            explicit: candidate.value(FieldRole::Category),
            section: candidate.section.as_deref(),
            brand: record.brand.as_deref(),
            item_name: &record.item_name,
        };
        record.category = self
            .classifier
            .as_ref()
            .and_then(|c| c.classify(&signals))
            .or_else(|| RuleClassifier.classify(&signals))
            .unwrap_or_default();

        // Left empty when the row has no status; the engine decides on merge
        record.status = candidate
            .value(FieldRole::Status)
            .unwrap_or_default()
            .to_string();

        if !parse_failed.is_empty() {
            debug!(
                "Line {}: coerced {:?} to zero for {:?}",
                candidate.line, parse_failed, record.item_name
            );
        }

        Some(Normalized {
            record,
            parse_failed,
        })
    }
}
