//! Column schemas and per-document schema inference.

use std::collections::HashMap;

use serde::Serialize;
use tracing::debug;

/// Prefix of placeholder columns appended when rows are wider than expected.
pub const EXTRA_PREFIX: &str = "Extra_";

/// The record field a column feeds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum FieldRole {
    ItemNumber,
    ItemName,
    Brand,
    PackSize,
    Unit,
    Price,
    Quantity,
    Status,
    Category,
    /// Unrecognized or placeholder column; carried but not mapped.
    Extra,
}

impl FieldRole {
    /// Resolve a column name to a role. Matching ignores case, spaces and punctuation
    /// other than `#`.
    pub fn from_column(name: &str) -> Self {
        let folded: String = name
            .chars()
            .filter(|c| c.is_alphanumeric() || *c == '#')
            .flat_map(|c| c.to_lowercase())
            .collect();

        match folded.as_str() {
            "item#" | "itemno" | "itemnumber" | "#" | "sku" | "code" | "productcode" => {
                FieldRole::ItemNumber
            }
            "itemname" | "item" | "name" | "description" | "product" | "itemdescription" => {
                FieldRole::ItemName
            }
            "brand" | "vendor" | "supplier" | "manufacturer" => FieldRole::Brand,
            "packsize" | "pack" | "size" | "pk" => FieldRole::PackSize,
            "unit" | "uom" | "units" => FieldRole::Unit,
            "price" | "unitcost" | "unitprice" | "cost" | "priceperbottle" => FieldRole::Price,
            "ordered" | "quantity" | "qty" | "orderedqty" | "shipped" => FieldRole::Quantity,
            "status" | "confirmedstatus" => FieldRole::Status,
            "category" | "class" | "type" => FieldRole::Category,
            _ => FieldRole::Extra,
        }
    }
}

/// An ordered list of named columns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ColumnSchema {
    columns: Vec<String>,
    #[serde(skip)]
    roles: Vec<FieldRole>,
}

impl ColumnSchema {
    pub fn new(columns: Vec<String>) -> Self {
        let roles = columns.iter().map(|c| FieldRole::from_column(c)).collect();
        Self { columns, roles }
    }

    /// The invoice layout used when no schema is configured.
    pub fn default_names() -> Vec<String> {
        ["Item#", "Item Name", "Brand", "Pack Size", "Price", "Ordered", "Status"]
            .iter()
            .map(|s| s.to_string())
            .collect()
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    pub fn role(&self, index: usize) -> FieldRole {
        self.roles.get(index).copied().unwrap_or(FieldRole::Extra)
    }

    /// Index of the first column with the given role.
    pub fn position(&self, role: FieldRole) -> Option<usize> {
        self.roles.iter().position(|r| *r == role)
    }

    /// Adapt this schema to rows of `n` tokens.
    ///
    /// Equal widths map one to one, wider rows get `Extra_k` placeholders appended and
    /// narrower rows keep only the first `n` names.
    pub fn adapt(&self, n: usize) -> ColumnSchema {
        let e = self.columns.len();
        let columns = if n <= e {
            self.columns[..n].to_vec()
        } else {
            let mut columns = self.columns.clone();
            columns.extend((0..n - e).map(|k| format!("{EXTRA_PREFIX}{k}")));
            columns
        };
        ColumnSchema::new(columns)
    }

    /// Whether a row of tokens is the table's own column header line.
    pub fn is_header_row(tokens: &[String]) -> bool {
        let named = tokens
            .iter()
            .filter(|t| FieldRole::from_column(t) != FieldRole::Extra)
            .count();
        named >= 2 && named * 2 >= tokens.len()
    }
}

impl Default for ColumnSchema {
    fn default() -> Self {
        Self::new(Self::default_names())
    }
}

/// Picks the working column list for one document.
#[derive(Debug, Clone)]
pub struct SchemaInferencer {
    expected: ColumnSchema,
    min_fields: usize,
}

impl SchemaInferencer {
    pub fn new(expected: ColumnSchema, min_fields: usize) -> Self {
        Self {
            expected,
            min_fields,
        }
    }

    /// Most common token count among rows wide enough to be data.
    /// Ties go to the wider count.
    pub fn dominant_count<I>(&self, counts: I) -> Option<usize>
    where
        I: IntoIterator<Item = usize>,
    {
        let mut histogram: HashMap<usize, usize> = HashMap::new();
        for n in counts.into_iter().filter(|n| *n >= self.min_fields) {
            *histogram.entry(n).or_default() += 1;
        }

        histogram
            .into_iter()
            .max_by(|(n_a, freq_a), (n_b, freq_b)| freq_a.cmp(freq_b).then(n_a.cmp(n_b)))
            .map(|(n, _)| n)
    }

    /// Infer the document schema from the token counts of its candidate rows.
    ///
    /// Returns `None` when no row reaches the minimum field count.
    pub fn infer<I>(&self, counts: I) -> Option<ColumnSchema>
    where
        I: IntoIterator<Item = usize>,
    {
        let n = self.dominant_count(counts)?;
        let schema = self.expected.adapt(n);
        debug!(
            "Inferred {} columns (expected {}): {:?}",
            n,
            self.expected.len(),
            schema.columns()
        );
        Some(schema)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn inferencer() -> SchemaInferencer {
        SchemaInferencer::new(ColumnSchema::default(), 6)
    }

    #[test]
    fn test_identity_mapping() {
        let schema = ColumnSchema::default().adapt(7);
        assert_eq!(schema, ColumnSchema::default());
    }

    #[test]
    fn test_wider_rows_get_extra_columns() {
        let schema = inferencer().infer([8, 8, 7, 8]).unwrap();
        assert_eq!(
            schema.columns(),
            &[
                "Item#", "Item Name", "Brand", "Pack Size", "Price", "Ordered", "Status",
                "Extra_0"
            ]
        );
        assert_eq!(schema.role(7), FieldRole::Extra);

        let schema = ColumnSchema::default().adapt(10);
        assert_eq!(schema.columns()[9], "Extra_2");
    }

    #[test]
    fn test_narrower_rows_truncate() {
        let schema = inferencer().infer([6, 6, 6]).unwrap();
        assert_eq!(
            schema.columns(),
            &["Item#", "Item Name", "Brand", "Pack Size", "Price", "Ordered"]
        );
        assert_eq!(schema.position(FieldRole::Status), None);
    }

    #[test]
    fn test_short_documents_have_no_schema() {
        assert_eq!(inferencer().infer([5, 5, 5, 2]), None);
    }

    #[test]
    fn test_dominant_count_ignores_short_rows_and_breaks_ties_wide() {
        let inf = inferencer();
        assert_eq!(inf.dominant_count([3, 3, 3, 3, 7, 7, 6]), Some(7));
        assert_eq!(inf.dominant_count([6, 6, 8, 8]), Some(8));
    }

    #[test]
    fn test_roles_from_column_names() {
        assert_eq!(FieldRole::from_column("Item #"), FieldRole::ItemNumber);
        assert_eq!(FieldRole::from_column("ITEM NAME"), FieldRole::ItemName);
        assert_eq!(FieldRole::from_column("Pack-Size"), FieldRole::PackSize);
        assert_eq!(FieldRole::from_column("Unit Cost"), FieldRole::Price);
        assert_eq!(FieldRole::from_column("Qty"), FieldRole::Quantity);
        assert_eq!(FieldRole::from_column("Extra_0"), FieldRole::Extra);
    }

    #[test]
    fn test_header_row_detection() {
        let header: Vec<String> = ColumnSchema::default_names();
        assert!(ColumnSchema::is_header_row(&header));

        let row: Vec<String> = ["1001", "Merlot", "Barefoot", "750 ml", "7.99", "2"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        assert!(!ColumnSchema::is_header_row(&row));
    }
}
