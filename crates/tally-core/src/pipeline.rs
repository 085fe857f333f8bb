//! Text-to-batch pipeline for a single document.

use std::sync::Arc;

use tracing::{debug, info};

use crate::models::config::ParsingConfig;
use crate::models::record::{BatchMetadata, DocumentBatch};
use crate::normalize::{CategoryClassifier, Normalizer};
use crate::parse::DocumentParser;

/// Parses and normalizes documents. Shareable across threads.
#[derive(Debug, Clone, Default)]
pub struct Pipeline {
    parser: DocumentParser,
    normalizer: Normalizer,
}

impl Pipeline {
    pub fn new(config: &ParsingConfig) -> Self {
        Self {
            parser: DocumentParser::new(config),
            normalizer: Normalizer::new(),
        }
    }

    /// Use an external classifier ahead of the keyword rules.
    pub fn with_classifier(mut self, classifier: Arc<dyn CategoryClassifier>) -> Self {
        self.normalizer = self.normalizer.with_classifier(classifier);
        self
    }

    /// Turn the raw text of one document into a batch.
    ///
    /// Explicit metadata wins over values harvested from the document's own lines.
    pub fn process(&self, document: &str, text: &str, metadata: BatchMetadata) -> DocumentBatch {
        let parsed = self.parser.parse(text);
        let mut warnings = Vec::new();
        let mut records = Vec::with_capacity(parsed.records.len());

        if parsed.schema.is_none() && parsed.stats.too_few_fields > 0 {
            warnings.push(format!(
                "no row has at least {} fields, document yields no records",
                self.parser.min_fields()
            ));
        }

        for candidate in &parsed.records {
            let Some(normalized) = self.normalizer.normalize(candidate) else {
                continue;
            };
            for field in &normalized.parse_failed {
                warnings.push(format!(
                    "line {}: unreadable {} for {:?}, using 0",
                    candidate.line, field, normalized.record.item_name
                ));
            }
            records.push(normalized.record);
        }

        let metadata = metadata.or(parsed.harvested);

        info!(
            "{}: {} records from {} lines ({} rejected)",
            document,
            records.len(),
            parsed.stats.lines,
            parsed.stats.rejected()
        );
        debug!("{}: {:?}", document, parsed.stats);

        DocumentBatch {
            document: document.to_string(),
            records,
            metadata,
            stats: parsed.stats,
            warnings,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::record::Category;
    use pretty_assertions::assert_eq;

    const INVOICE: &str = "\
ACME BEVERAGE DISTRIBUTORS
Delivery Date: 05/14/2024
Item#  Item Name  Brand  Pack Size  Price  Ordered  Status
IMPORT BEER
1001  Corona Extra  Modelo  24/12 oz  27.50  3  Confirmed
1002  Heineken  Heineken USA  24/12 oz  n/a  2  Confirmed
Invoice Total: $82.50
";

    #[test]
    fn test_process_document() {
        let batch = Pipeline::default().process("acme.txt", INVOICE, BatchMetadata::default());

        assert_eq!(batch.document, "acme.txt");
        assert_eq!(batch.records.len(), 2);
        assert!(batch.records.iter().all(|r| r.category == Category::Beer));
        assert_eq!(batch.metadata.delivery_date.as_deref(), Some("05/14/2024"));
        assert_eq!(batch.metadata.invoice_total.as_deref(), Some("$82.50"));
        assert_eq!(batch.warnings.len(), 1);
        assert!(batch.warnings[0].contains("price"));
        assert_eq!(batch.total_quantity(), 5);
    }

    #[test]
    fn test_explicit_metadata_wins() {
        let metadata = BatchMetadata::new(Some("2024-05-15".into()), None);
        let batch = Pipeline::default().process("acme.txt", INVOICE, metadata);
        assert_eq!(batch.metadata.delivery_date.as_deref(), Some("2024-05-15"));
        assert_eq!(batch.metadata.invoice_total.as_deref(), Some("$82.50"));
    }

    #[test]
    fn test_narrow_document_warns() {
        let batch = Pipeline::default().process(
            "short.txt",
            "1  Merlot  Barefoot  7.99  2\n",
            BatchMetadata::default(),
        );
        assert!(batch.is_empty());
        assert_eq!(batch.warnings.len(), 1);
    }

    #[test]
    fn test_upper_case_noise_keeps_section_context() {
        let text = "\
IMPORT BEER
3001  Hoegaarden White  AB InBev  24/12 oz  30.00  1  Confirmed
PAGE 2
3002  Hoegaarden Rosee  AB InBev  24/12 oz  31.00  2  Confirmed
DELIVERY DATE: 05/14/2024
";
        let batch = Pipeline::default().process("paged.txt", text, BatchMetadata::default());

        assert_eq!(batch.records.len(), 2);
        assert!(batch.records.iter().all(|r| r.category == Category::Beer));
        assert_eq!(batch.stats.section_headers, 1);
        assert_eq!(batch.stats.noise, 2);
        assert_eq!(batch.metadata.delivery_date.as_deref(), Some("05/14/2024"));
    }

    #[test]
    fn test_csv_row_with_comma_and_empty_cell() {
        let csv = "1001,Merlot,Barefoot,750 ml,7.99,2,Confirmed\n\
                   1002,\"Bud Light, 12oz\",,24/12 oz,18.99,5,Confirmed\n";
        let text = crate::source::csv_to_text(csv.as_bytes()).unwrap();
        let batch = Pipeline::default().process("order.csv", &text, BatchMetadata::default());

        assert_eq!(batch.records.len(), 2);
        assert_eq!(batch.stats.rejected(), 0);
        let bud = &batch.records[1];
        assert_eq!(bud.item_name, "Bud Light 12oz");
        assert_eq!(bud.brand, None);
        assert_eq!(bud.ordered_quantity, 5);
    }
}
