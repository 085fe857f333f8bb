//! Positional mapping of tokenized rows onto a column schema.

use serde::Serialize;

use super::schema::{ColumnSchema, FieldRole};

/// One mapped field of a candidate row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Field {
    pub column: String,
    pub role: FieldRole,
    pub value: String,
}

/// A data row mapped onto the document schema, before normalization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CandidateRecord {
    /// 1-based line number in the source text.
    pub line: usize,
    /// Fields in column order.
    pub fields: Vec<Field>,
    /// Section header in effect for this row.
    pub section: Option<String>,
    /// Whether the row was compacted to recover a lost leading column.
    pub realigned: bool,
}

impl CandidateRecord {
    /// First non-empty value for a role.
    pub fn value(&self, role: FieldRole) -> Option<&str> {
        self.fields
            .iter()
            .filter(|f| f.role == role)
            .map(|f| f.value.as_str())
            .find(|v| !v.is_empty())
    }

    /// Field values in column order.
    pub fn values(&self) -> Vec<&str> {
        self.fields.iter().map(|f| f.value.as_str()).collect()
    }
}

/// Why a row produced no candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    /// Fewer fields than the minimum viable invoice row.
    TooFewFields { found: usize, required: usize },
    /// No item name even after realignment.
    MissingName,
}

/// Maps tokenized rows of one document onto its inferred schema.
#[derive(Debug, Clone)]
pub struct RecordParser<'a> {
    schema: &'a ColumnSchema,
    min_fields: usize,
    name_index: Option<usize>,
}

impl<'a> RecordParser<'a> {
    pub fn new(schema: &'a ColumnSchema, min_fields: usize) -> Self {
        Self {
            schema,
            min_fields,
            name_index: schema.position(FieldRole::ItemName),
        }
    }

    /// Map one row. Tokens past the schema width are dropped and missing trailing
    /// columns are left empty.
    pub fn parse(
        &self,
        line: usize,
        tokens: &[String],
        section: Option<&str>,
    ) -> Result<CandidateRecord, Rejection> {
        if tokens.len() < self.min_fields {
            return Err(Rejection::TooFewFields {
                found: tokens.len(),
                required: self.min_fields,
            });
        }

        let name_index = self.name_index.ok_or(Rejection::MissingName)?;

        let (slots, realigned) = match realign(tokens, name_index) {
            Some(shifted) => (shifted, true),
            None => (tokens.to_vec(), false),
        };

        if slots.get(name_index).is_none_or(|v| v.is_empty()) {
            return Err(Rejection::MissingName);
        }

        let fields = self
            .schema
            .columns()
            .iter()
            .enumerate()
            .map(|(i, column)| Field {
                column: column.clone(),
                role: self.schema.role(i),
                value: slots.get(i).cloned().unwrap_or_default(),
            })
            .collect();

        Ok(CandidateRecord {
            line,
            fields,
            section: section.map(str::to_string),
            realigned,
        })
    }
}

/// Compact a shifted row.
///
/// When the item-name slot is empty but a later slot is filled, the extraction lost a
/// leading blank column: every non-empty value moves left and the freed slots are
/// appended empty at the end. Returns `None` when the row needs no realignment.
pub fn realign(tokens: &[String], name_index: usize) -> Option<Vec<String>> {
    let name_empty = tokens.get(name_index).is_none_or(|v| v.is_empty());
    let later_filled = tokens.iter().skip(name_index + 1).any(|v| !v.is_empty());
    if !name_empty || !later_filled {
        return None;
    }

    let mut compacted: Vec<String> = tokens.iter().filter(|v| !v.is_empty()).cloned().collect();
    compacted.resize(tokens.len(), String::new());
    Some(compacted)
}
