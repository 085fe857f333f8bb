//! Inventory records and per-document batches.

use std::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::parse::ParseStats;

/// Status given to a record the first time it is merged without an explicit status.
pub const CONFIRMED: &str = "Confirmed";

/// Product category assigned during normalization.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Category {
    Beer,
    Wine,
    Liquor,
    #[default]
    Miscellaneous,
}

impl Category {
    /// All categories in classification priority order.
    pub const ALL: [Category; 4] = [
        Category::Beer,
        Category::Wine,
        Category::Liquor,
        Category::Miscellaneous,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Beer => "Beer",
            Category::Wine => "Wine",
            Category::Liquor => "Liquor",
            Category::Miscellaneous => "Miscellaneous",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

/// One row of the canonical inventory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InventoryRecord {
    /// Merge identity, derived from the item name.
    pub item_key: String,

    /// Distributor item number.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub item_number: Option<String>,

    /// Item name as printed on the most recent document.
    pub item_name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub brand: Option<String>,

    /// Pack size text (e.g. "12/750 ml", "case").
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pack_size: Option<String>,

    /// Unit token the conversion factor was looked up with.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,

    /// Unit price. Zero when unknown.
    pub price: Decimal,

    /// Whether `price` came from a parseable value.
    #[serde(default = "default_true")]
    pub price_known: bool,

    /// Quantity on order, accumulated across documents.
    pub ordered_quantity: u64,

    pub category: Category,

    pub status: String,

    /// Liters-equivalent conversion factor for `unit` (1 when unknown).
    pub unit_cost_normalized: Decimal,
}

fn default_true() -> bool {
    true
}

impl InventoryRecord {
    /// Create a record with defaults for everything but the name.
    ///
    /// Returns `None` if the name is blank.
    pub fn new(item_name: &str) -> Option<Self> {
        let item_name = item_name.trim();
        if item_name.is_empty() {
            return None;
        }

        Some(Self {
            item_key: item_key(item_name),
            item_number: None,
            item_name: item_name.to_string(),
            brand: None,
            pack_size: None,
            unit: None,
            price: Decimal::ZERO,
            price_known: false,
            ordered_quantity: 0,
            category: Category::Miscellaneous,
            status: CONFIRMED.to_string(),
            unit_cost_normalized: Decimal::ONE,
        })
    }

    /// Quantity times price, derived on every call. Saturates instead of overflowing.
    pub fn extended_value(&self) -> Decimal {
        Decimal::from(self.ordered_quantity)
            .checked_mul(self.price)
            .unwrap_or_else(|| saturated(self.price))
    }
}

/// Add two money values, clamping at the representable bounds.
pub fn saturating_add_value(acc: Decimal, value: Decimal) -> Decimal {
    acc.checked_add(value).unwrap_or_else(|| saturated(value))
}

fn saturated(sign_of: Decimal) -> Decimal {
    if sign_of.is_sign_negative() {
        Decimal::MIN
    } else {
        Decimal::MAX
    }
}

/// Fold an item name into its merge key: lower-cased with whitespace runs collapsed.
pub fn item_key(name: &str) -> String {
    name.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

/// Document-level annotations carried with a batch. Display only.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchMetadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delivery_date: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub invoice_total: Option<String>,
}

impl BatchMetadata {
    pub fn new(delivery_date: Option<String>, invoice_total: Option<String>) -> Self {
        Self {
            delivery_date: delivery_date.filter(|s| !s.trim().is_empty()),
            invoice_total: invoice_total.filter(|s| !s.trim().is_empty()),
        }
    }

    /// Fill fields missing here from `fallback`.
    pub fn or(self, fallback: BatchMetadata) -> Self {
        Self {
            delivery_date: self.delivery_date.or(fallback.delivery_date),
            invoice_total: self.invoice_total.or(fallback.invoice_total),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.delivery_date.is_none() && self.invoice_total.is_none()
    }
}

/// Records parsed from one document plus its metadata.
///
/// A batch is consumed by exactly one reconciliation pass.
#[derive(Debug, Clone, Default, Serialize)]
pub struct DocumentBatch {
    /// Source document name.
    pub document: String,

    /// Normalized records in document order.
    pub records: Vec<InventoryRecord>,

    pub metadata: BatchMetadata,

    /// Line counters from parsing.
    pub stats: ParseStats,

    /// Non-fatal issues found while parsing and normalizing.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
}

impl DocumentBatch {
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Total quantity across the batch's records.
    pub fn total_quantity(&self) -> u64 {
        self.records
            .iter()
            .fold(0u64, |acc, r| acc.saturating_add(r.ordered_quantity))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_item_key_folds_case_and_whitespace() {
        assert_eq!(item_key("  Tito's   Vodka "), "tito's vodka");
        assert_eq!(item_key("TITO'S\tVODKA"), "tito's vodka");
    }

    #[test]
    fn test_new_rejects_blank_name() {
        assert!(InventoryRecord::new("   ").is_none());
        let record = InventoryRecord::new(" Bud Light ").unwrap();
        assert_eq!(record.item_name, "Bud Light");
        assert_eq!(record.item_key, "bud light");
        assert_eq!(record.status, CONFIRMED);
        assert_eq!(record.unit_cost_normalized, Decimal::ONE);
    }

    #[test]
    fn test_extended_value() {
        let mut record = InventoryRecord::new("Merlot").unwrap();
        record.price = Decimal::from_str("12.50").unwrap();
        record.ordered_quantity = 4;
        assert_eq!(record.extended_value(), Decimal::from_str("50.00").unwrap());
    }

    #[test]
    fn test_extended_value_saturates() {
        let mut record = InventoryRecord::new("Reserve Cognac").unwrap();
        record.price = Decimal::from_str("99999999999999999999999").unwrap();
        record.ordered_quantity = 1_000_000;
        assert_eq!(record.extended_value(), Decimal::MAX);

        record.price = -record.price;
        assert_eq!(record.extended_value(), Decimal::MIN);

        assert_eq!(saturating_add_value(Decimal::MAX, Decimal::ONE), Decimal::MAX);
        assert_eq!(saturating_add_value(Decimal::ONE, Decimal::ONE), Decimal::TWO);
    }

    #[test]
    fn test_metadata_fallback() {
        let explicit = BatchMetadata::new(Some("2024-05-01".into()), Some(" ".into()));
        let harvested = BatchMetadata::new(Some("05/02/2024".into()), Some("$120.00".into()));
        let merged = explicit.or(harvested);
        assert_eq!(merged.delivery_date.as_deref(), Some("2024-05-01"));
        assert_eq!(merged.invoice_total.as_deref(), Some("$120.00"));
    }
}
