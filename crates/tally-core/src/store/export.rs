//! Tabular CSV export of the inventory.

use std::fs::{self, File};
use std::io;
use std::path::Path;

use tracing::info;

use super::{Inventory, Result};
use crate::error::StoreError;
use crate::normalize::format_amount;

/// Header row of the export.
pub const EXPORT_HEADER: [&str; 7] = [
    "Item#",
    "Item Name",
    "Brand",
    "Pack Size",
    "Price",
    "Ordered",
    "Confirmed Status",
];

/// Write the export: header, one row per record in store order, then the
/// delivery date and invoice total footers of the most recent batch.
pub fn write_export<W: io::Write>(inventory: &Inventory, writer: W) -> Result<()> {
    let mut wtr = csv::Writer::from_writer(writer);

    wtr.write_record(EXPORT_HEADER)?;

    for record in inventory.iter() {
        wtr.write_record([
            record.item_number.as_deref().unwrap_or(""),
            &record.item_name,
            record.brand.as_deref().unwrap_or(""),
            record.pack_size.as_deref().unwrap_or(""),
            &format_amount(record.price),
            &record.ordered_quantity.to_string(),
            &record.status,
        ])?;
    }

    let last = inventory.last_batch().cloned().unwrap_or_default();
    wtr.write_record(footer("Delivery Date", last.delivery_date.as_deref()))?;
    wtr.write_record(footer("Invoice Total", last.invoice_total.as_deref()))?;

    wtr.flush().map_err(|e| StoreError::Export(e.into()))?;
    Ok(())
}

fn footer<'a>(label: &'a str, value: Option<&'a str>) -> [&'a str; 7] {
    [label, value.unwrap_or(""), "", "", "", "", ""]
}

/// Write the export to a file, creating parent directories as needed.
pub fn export_to_path(inventory: &Inventory, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| StoreError::io(parent, e))?;
    }
    let file = File::create(path).map_err(|e| StoreError::io(path, e))?;
    write_export(inventory, file)?;
    info!("Exported {} records to {}", inventory.len(), path.display());
    Ok(())
}
