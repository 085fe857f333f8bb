//! Line-oriented parsing of extracted document text into candidate records.

mod parser;
mod patterns;
pub mod schema;
pub mod tokenizer;

pub use parser::{realign, CandidateRecord, Field, RecordParser, Rejection};
pub use schema::{ColumnSchema, FieldRole, SchemaInferencer, EXTRA_PREFIX};
pub use tokenizer::{tokenize, LineKind, LineTokenizer};

use serde::Serialize;
use tracing::{debug, trace};

use crate::models::config::ParsingConfig;
use crate::models::record::BatchMetadata;
use patterns::{DELIVERY_DATE, INVOICE_TOTAL};

/// Line counters for one document.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ParseStats {
    pub lines: usize,
    pub blank: usize,
    pub noise: usize,
    pub section_headers: usize,
    pub column_headers: usize,
    pub too_few_fields: usize,
    pub missing_name: usize,
    pub realigned: usize,
    pub records: usize,
}

impl ParseStats {
    /// Rows that looked like data but were rejected.
    pub fn rejected(&self) -> usize {
        self.too_few_fields + self.missing_name
    }
}

/// Output of parsing one document.
#[derive(Debug, Clone, Default)]
pub struct ParsedDocument {
    /// Schema inferred for the document, if any row was wide enough.
    pub schema: Option<ColumnSchema>,
    /// Candidate records in line order.
    pub records: Vec<CandidateRecord>,
    /// Delivery date and invoice total found on discarded lines.
    pub harvested: BatchMetadata,
    pub stats: ParseStats,
}

struct TokenizedLine {
    line: usize,
    tokens: Vec<String>,
    section: Option<String>,
}

/// Parses the text of a single document.
///
/// Holds no per-document state, so one parser can serve many documents concurrently.
#[derive(Debug, Clone)]
pub struct DocumentParser {
    tokenizer: LineTokenizer,
    inferencer: SchemaInferencer,
    min_fields: usize,
}

impl DocumentParser {
    pub fn new(config: &ParsingConfig) -> Self {
        let expected = ColumnSchema::new(config.expected_schema.clone());
        Self {
            tokenizer: LineTokenizer::new(config.noise_markers.clone(), config.min_fields),
            inferencer: SchemaInferencer::new(expected, config.min_fields),
            min_fields: config.min_fields,
        }
    }

    pub fn min_fields(&self) -> usize {
        self.min_fields
    }

    /// Parse a document.
    ///
    /// The first pass classifies lines and tracks the section context, the schema is
    /// then inferred once from the surviving rows, and the second pass maps each row.
    pub fn parse(&self, text: &str) -> ParsedDocument {
        let mut stats = ParseStats::default();
        let mut harvested = BatchMetadata::default();
        let mut section: Option<String> = None;
        let mut rows: Vec<TokenizedLine> = Vec::new();

        for (idx, raw) in text.lines().enumerate() {
            let line = idx + 1;
            stats.lines += 1;

            match self.tokenizer.classify(raw) {
                LineKind::Blank => stats.blank += 1,
                LineKind::Noise => {
                    stats.noise += 1;
                    harvest(raw, &mut harvested);
                    trace!("Line {}: noise", line);
                }
                LineKind::SectionHeader(header) => {
                    stats.section_headers += 1;
                    debug!("Line {}: section header {:?}", line, header);
                    section = Some(header);
                }
                LineKind::Fields(tokens) => {
                    if ColumnSchema::is_header_row(&tokens) {
                        stats.column_headers += 1;
                        debug!("Line {}: column header row skipped", line);
                        continue;
                    }
                    rows.push(TokenizedLine {
                        line,
                        tokens,
                        section: section.clone(),
                    });
                }
            }
        }

        let schema = self.inferencer.infer(rows.iter().map(|r| r.tokens.len()));
        let mut records = Vec::new();

        match &schema {
            Some(schema) => {
                let parser = RecordParser::new(schema, self.min_fields);
                for row in &rows {
                    match parser.parse(row.line, &row.tokens, row.section.as_deref()) {
                        Ok(record) => {
                            if record.realigned {
                                stats.realigned += 1;
                            }
                            trace!("Line {}: {:?}", row.line, record.values());
                            records.push(record);
                        }
                        Err(Rejection::TooFewFields { found, required }) => {
                            stats.too_few_fields += 1;
                            debug!("Line {}: {} fields, need {}", row.line, found, required);
                        }
                        Err(Rejection::MissingName) => {
                            stats.missing_name += 1;
                            debug!("Line {}: no item name", row.line);
                        }
                    }
                }
            }
            None => {
                stats.too_few_fields += rows.len();
                debug!(
                    "No row reached {} fields; document yields no records",
                    self.min_fields
                );
            }
        }

        stats.records = records.len();

        ParsedDocument {
            schema,
            records,
            harvested,
            stats,
        }
    }
}

impl Default for DocumentParser {
    fn default() -> Self {
        Self::new(&ParsingConfig::default())
    }
}

fn harvest(line: &str, metadata: &mut BatchMetadata) {
    if metadata.delivery_date.is_none() {
        if let Some(caps) = DELIVERY_DATE.captures(line) {
            metadata.delivery_date = Some(caps[1].trim().to_string());
        }
    }
    if metadata.invoice_total.is_none() {
        if let Some(caps) = INVOICE_TOTAL.captures(line) {
            metadata.invoice_total = Some(caps[1].replace(' ', ""));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const INVOICE: &str = r#"
        ACME BEVERAGE DISTRIBUTORS
        Customer: Joe's Tavern          Invoice # 88812
        Delivery Date: 05/14/2024

        Item#   Item Name   Brand   Pack Size   Price   Ordered   Status

        IMPORT BEER
        1001   Corona Extra   Modelo   24/12 oz   27.50   3   Confirmed
        1002   Heineken   Heineken USA   24/12 oz   29.99   2   Confirmed
        1003   Stella Artois   AB InBev   24/11.2 oz   31.25   1   Confirmed

        VODKA
        2001   Tito's Vodka   Fifth Generation   12/750 ml   21.99   5   Confirmed
        2002   Ice  bucket
        Invoice Total: $379.40
    "#;

    #[test]
    fn test_parse_invoice() {
        let doc = DocumentParser::default().parse(INVOICE);

        assert_eq!(doc.schema, Some(ColumnSchema::default()));
        assert_eq!(doc.records.len(), 4);
        assert_eq!(doc.stats.records, 4);
        assert_eq!(doc.stats.section_headers, 3);
        assert_eq!(doc.stats.column_headers, 1);
        assert_eq!(doc.stats.too_few_fields, 1);
        assert_eq!(doc.stats.noise, 3);
        assert_eq!(doc.harvested.delivery_date.as_deref(), Some("05/14/2024"));
        assert_eq!(doc.harvested.invoice_total.as_deref(), Some("$379.40"));
    }

    #[test]
    fn test_section_header_propagates() {
        let doc = DocumentParser::default().parse(INVOICE);
        let sections: Vec<Option<&str>> =
            doc.records.iter().map(|r| r.section.as_deref()).collect();
        assert_eq!(
            sections,
            vec![Some("IMPORT BEER"), Some("IMPORT BEER"), Some("IMPORT BEER"), Some("VODKA")]
        );
    }

    #[test]
    fn test_five_field_document_is_rejected() {
        let text = "1  Merlot  Barefoot  7.99  2\n2  Chablis  Barefoot  7.99  4\n";
        let doc = DocumentParser::default().parse(text);
        assert_eq!(doc.schema, None);
        assert!(doc.records.is_empty());
        assert_eq!(doc.stats.too_few_fields, 2);
    }

    #[test]
    fn test_wide_document_gets_extra_column() {
        let text = "1  Merlot  Barefoot  750 ml  7.99  2  Confirmed  A12\n\
                    2  Chablis  Barefoot  750 ml  7.99  4  Confirmed  A13\n";
        let doc = DocumentParser::default().parse(text);
        let schema = doc.schema.unwrap();
        assert_eq!(schema.len(), 8);
        assert_eq!(schema.columns()[7], "Extra_0");
        assert_eq!(doc.records[0].values().last(), Some(&"A12"));
    }

    #[test]
    fn test_empty_text() {
        let doc = DocumentParser::default().parse("");
        assert!(doc.records.is_empty());
        assert_eq!(doc.stats, ParseStats::default());
    }
}
