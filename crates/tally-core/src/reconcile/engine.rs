//! Merge policy for folding a batch into the inventory.

use serde::Serialize;
use tracing::{debug, trace};

use crate::models::record::{Category, DocumentBatch, InventoryRecord, CONFIRMED};
use crate::store::Inventory;

/// What happened to one incoming record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum MergeAction {
    Inserted,
    Updated,
}

/// Per-record merge outcome.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MergeOutcome {
    pub item_key: String,
    pub action: MergeAction,
    /// Quantity on the inventory record after the merge.
    pub ordered_quantity: u64,
}

/// Result of reconciling one batch.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ReconcileReport {
    pub document: String,
    pub inserted: usize,
    pub updated: usize,
    pub outcomes: Vec<MergeOutcome>,
}

impl ReconcileReport {
    fn record(&mut self, outcome: MergeOutcome) {
        match outcome.action {
            MergeAction::Inserted => self.inserted += 1,
            MergeAction::Updated => self.updated += 1,
        }
        self.outcomes.push(outcome);
    }
}

/// Stateless merge engine. Prices are last-write-wins, quantities accumulate and
/// descriptive fields are overwritten only by non-empty values.
#[derive(Debug, Clone, Copy, Default)]
pub struct ReconciliationEngine;

impl ReconciliationEngine {
    pub fn new() -> Self {
        Self
    }

    /// Merge `batch` into `inventory`, applying records in batch order.
    ///
    /// An empty batch returns the inventory unchanged, `last_batch` included.
    pub fn reconcile(
        &self,
        mut inventory: Inventory,
        batch: &DocumentBatch,
    ) -> (Inventory, ReconcileReport) {
        let mut report = ReconcileReport {
            document: batch.document.clone(),
            ..Default::default()
        };

        if batch.is_empty() {
            debug!("{}: empty batch, nothing to merge", batch.document);
            return (inventory, report);
        }

        for incoming in &batch.records {
            let outcome = match inventory.get_mut(&incoming.item_key) {
                Some(existing) => {
                    merge_into(existing, incoming);
                    MergeOutcome {
                        item_key: existing.item_key.clone(),
                        action: MergeAction::Updated,
                        ordered_quantity: existing.ordered_quantity,
                    }
                }
                None => {
                    let record = insert_record(incoming);
                    let outcome = MergeOutcome {
                        item_key: record.item_key.clone(),
                        action: MergeAction::Inserted,
                        ordered_quantity: record.ordered_quantity,
                    };
                    inventory.upsert(record);
                    outcome
                }
            };
            trace!("{:?} {} -> qty {}", outcome.action, outcome.item_key, outcome.ordered_quantity);
            report.record(outcome);
        }

        inventory.set_last_batch(batch.metadata.clone());
        (inventory, report)
    }
}

fn insert_record(incoming: &InventoryRecord) -> InventoryRecord {
    let mut record = incoming.clone();
    if record.status.trim().is_empty() {
        record.status = CONFIRMED.to_string();
    }
    record
}

fn merge_into(existing: &mut InventoryRecord, incoming: &InventoryRecord) {
    if incoming.price_known {
        existing.price = incoming.price;
        existing.price_known = true;
    }

    existing.ordered_quantity = existing
        .ordered_quantity
        .saturating_add(incoming.ordered_quantity);

    existing.item_name.clone_from(&incoming.item_name);
    overwrite(&mut existing.item_number, &incoming.item_number);
    overwrite(&mut existing.brand, &incoming.brand);
    overwrite(&mut existing.pack_size, &incoming.pack_size);

    if incoming.unit.is_some() {
        existing.unit.clone_from(&incoming.unit);
        existing.unit_cost_normalized = incoming.unit_cost_normalized;
    }

    if incoming.category != Category::Miscellaneous {
        existing.category = incoming.category;
    }

    if !incoming.status.trim().is_empty() {
        existing.status.clone_from(&incoming.status);
    }
}

fn overwrite(target: &mut Option<String>, value: &Option<String>) {
    if value.as_deref().is_some_and(|v| !v.trim().is_empty()) {
        target.clone_from(value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::record::BatchMetadata;
    use pretty_assertions::assert_eq;
    use rust_decimal::Decimal;
    use std::str::FromStr;

    fn item(name: &str, qty: u64, price: Option<&str>) -> InventoryRecord {
        let mut r = InventoryRecord::new(name).unwrap();
        r.ordered_quantity = qty;
        if let Some(p) = price {
            r.price = Decimal::from_str(p).unwrap();
            r.price_known = true;
        }
        r.status = String::new();
        r
    }

    fn batch(records: Vec<InventoryRecord>) -> DocumentBatch {
        DocumentBatch {
            document: "invoice.txt".to_string(),
            records,
            metadata: BatchMetadata::new(Some("05/14/2024".into()), None),
            ..Default::default()
        }
    }

    #[test]
    fn test_insert_then_update() {
        let engine = ReconciliationEngine::new();
        let (inv, report) =
            engine.reconcile(Inventory::new(), &batch(vec![item("Tito's Vodka", 5, Some("21.99"))]));
        assert_eq!(report.inserted, 1);
        assert_eq!(inv.get("tito's vodka").unwrap().status, CONFIRMED);

        let (inv, report) =
            engine.reconcile(inv, &batch(vec![item("TITO'S  VODKA", 3, Some("22.49"))]));
        assert_eq!(report.updated, 1);
        assert_eq!(report.outcomes[0].ordered_quantity, 8);

        let r = inv.get("tito's vodka").unwrap();
        assert_eq!(r.ordered_quantity, 8);
        assert_eq!(r.price, Decimal::from_str("22.49").unwrap());
        assert_eq!(r.extended_value(), Decimal::from_str("179.92").unwrap());
        assert_eq!(inv.len(), 1);
    }

    #[test]
    fn test_unknown_price_keeps_existing() {
        let engine = ReconciliationEngine::new();
        let (inv, _) = engine.reconcile(Inventory::new(), &batch(vec![item("Merlot", 1, Some("9.00"))]));
        let (inv, _) = engine.reconcile(inv, &batch(vec![item("Merlot", 2, None)]));

        let r = inv.get("merlot").unwrap();
        assert_eq!(r.price, Decimal::from_str("9.00").unwrap());
        assert_eq!(r.ordered_quantity, 3);
    }

    #[test]
    fn test_empty_fields_do_not_erase() {
        let engine = ReconciliationEngine::new();
        let mut first = item("Corona Extra", 1, Some("27.50"));
        first.brand = Some("Modelo".into());
        first.pack_size = Some("24/12 oz".into());
        first.unit = Some("oz".into());
        first.unit_cost_normalized = Decimal::from_str("0.0295735").unwrap();
        first.category = Category::Beer;
        first.status = "Short".into();
        let (inv, _) = engine.reconcile(Inventory::new(), &batch(vec![first]));

        let (inv, _) = engine.reconcile(inv, &batch(vec![item("Corona Extra", 2, Some("28.00"))]));
        let r = inv.get("corona extra").unwrap();
        assert_eq!(r.brand.as_deref(), Some("Modelo"));
        assert_eq!(r.pack_size.as_deref(), Some("24/12 oz"));
        assert_eq!(r.unit.as_deref(), Some("oz"));
        assert_eq!(r.category, Category::Beer);
        assert_eq!(r.status, "Short");

        let mut third = item("Corona Extra", 0, None);
        third.brand = Some("Constellation".into());
        third.status = "Confirmed".into();
        let (inv, _) = engine.reconcile(inv, &batch(vec![third]));
        let r = inv.get("corona extra").unwrap();
        assert_eq!(r.brand.as_deref(), Some("Constellation"));
        assert_eq!(r.status, "Confirmed");
    }

    #[test]
    fn test_duplicates_within_batch_apply_in_order() {
        let engine = ReconciliationEngine::new();
        let (inv, report) = engine.reconcile(
            Inventory::new(),
            &batch(vec![item("Merlot", 1, Some("9.00")), item("merlot", 2, Some("9.50"))]),
        );
        assert_eq!(report.inserted, 1);
        assert_eq!(report.updated, 1);
        let r = inv.get("merlot").unwrap();
        assert_eq!(r.ordered_quantity, 3);
        assert_eq!(r.price, Decimal::from_str("9.50").unwrap());
    }

    #[test]
    fn test_empty_batch_is_a_noop() {
        let engine = ReconciliationEngine::new();
        let (inv, _) = engine.reconcile(Inventory::new(), &batch(vec![item("Merlot", 1, None)]));

        let empty = DocumentBatch {
            document: "blank.txt".into(),
            metadata: BatchMetadata::new(Some("06/01/2024".into()), Some("$0.00".into())),
            ..Default::default()
        };
        let (after, report) = engine.reconcile(inv.clone(), &empty);
        assert_eq!(after, inv);
        assert!(report.outcomes.is_empty());
        assert_eq!(
            after.last_batch().unwrap().delivery_date.as_deref(),
            Some("05/14/2024")
        );
    }

    #[test]
    fn test_quantity_saturates() {
        let engine = ReconciliationEngine::new();
        let (inv, _) = engine.reconcile(Inventory::new(), &batch(vec![item("Ice", u64::MAX, None)]));
        let (inv, _) = engine.reconcile(inv, &batch(vec![item("Ice", 10, None)]));
        assert_eq!(inv.get("ice").unwrap().ordered_quantity, u64::MAX);
    }
}
