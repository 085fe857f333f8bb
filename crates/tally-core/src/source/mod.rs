//! Source document adapters: turn a file into the raw text the parser consumes.
//!
//! OCR is not done here. Images and scanned documents must be converted to text
//! upstream; only formats with a text layer are read.

#[cfg(feature = "pdf")]
mod pdf;

#[cfg(feature = "pdf")]
pub use pdf::PdfExtractor;

use std::fs;
use std::path::Path;

use tracing::{debug, info};

use crate::error::ExtractError;
use crate::normalize::parse_amount;

/// Supported source formats, by file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentKind {
    Text,
    Csv,
    Json,
    Pdf,
}

impl DocumentKind {
    /// Detect the kind from a path's extension (case-insensitive).
    pub fn from_path(path: &Path) -> Result<Self, ExtractError> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase)
            .unwrap_or_default();

        match ext.as_str() {
            "txt" | "text" => Ok(DocumentKind::Text),
            "csv" => Ok(DocumentKind::Csv),
            "json" => Ok(DocumentKind::Json),
            "pdf" => Ok(DocumentKind::Pdf),
            "" => Err(ExtractError::Unsupported(path.display().to_string())),
            other => Err(ExtractError::Unsupported(format!(".{other}"))),
        }
    }
}

/// Read a document and return its text.
pub fn extract_text(path: &Path) -> Result<String, ExtractError> {
    let kind = DocumentKind::from_path(path)?;
    debug!("Reading {} as {:?}", path.display(), kind);

    let text = match kind {
        DocumentKind::Text => fs::read_to_string(path)?,
        DocumentKind::Csv => csv_to_text(fs::read(path)?.as_slice())?,
        DocumentKind::Json => json_to_text(&fs::read_to_string(path)?)?,
        DocumentKind::Pdf => pdf_to_text(path)?,
    };

    info!("Extracted {} lines from {}", text.lines().count(), path.display());
    Ok(text)
}

/// One line per CSV row.
pub fn csv_to_text<R: std::io::Read>(reader: R) -> Result<String, ExtractError> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(reader);

    let mut lines = Vec::new();
    for row in rdr.records() {
        let row = row?;
        lines.push(join_cells(row.iter()));
    }
    Ok(lines.join("\n"))
}

/// Join cells into one line the tokenizer splits back into the same cells.
///
/// Cells are whitespace-folded and joined by commas so that empty cells survive
/// tokenization. A comma inside a cell would split it, so numeric cells are rewritten
/// as plain decimals and other cells get a space in its place.
fn join_cells<'a>(cells: impl Iterator<Item = &'a str>) -> String {
    cells.map(fold_cell).collect::<Vec<_>>().join(",")
}

fn fold_cell(cell: &str) -> String {
    let folded = collapse(cell);
    if !folded.contains(',') {
        return folded;
    }

    let numeric = folded.chars().any(|c| c.is_ascii_digit())
        && folded
            .chars()
            .all(|c| c.is_ascii_digit() || ",.$-() ".contains(c));
    if numeric {
        if let Some(amount) = parse_amount(&folded) {
            return amount.to_string();
        }
    }

    collapse(&folded.replace(',', " "))
}

fn collapse(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Render JSON as text. An array of arrays becomes one line per inner array, cells
/// joined as for CSV; anything else is pretty-printed.
pub fn json_to_text(content: &str) -> Result<String, ExtractError> {
    let value: serde_json::Value = serde_json::from_str(content)?;

    if let Some(rows) = value.as_array().filter(|rows| rows.iter().all(|r| r.is_array())) {
        let lines: Vec<String> = rows
            .iter()
            .filter_map(|row| row.as_array())
            .map(|cells| {
                let cells: Vec<String> = cells
                    .iter()
                    .map(|cell| match cell {
                        serde_json::Value::String(s) => s.clone(),
                        serde_json::Value::Null => String::new(),
                        other => other.to_string(),
                    })
                    .collect();
                join_cells(cells.iter().map(String::as_str))
            })
            .collect();
        return Ok(lines.join("\n"));
    }

    Ok(serde_json::to_string_pretty(&value)?)
}

#[cfg(feature = "pdf")]
fn pdf_to_text(path: &Path) -> Result<String, ExtractError> {
    let data = fs::read(path)?;
    let mut extractor = PdfExtractor::new();
    extractor.load(&data)?;

    let text = extractor.extract_text()?;
    if text.trim().is_empty() {
        return Err(ExtractError::Empty(path.display().to_string()));
    }

    debug!("{}: {} pages of text", path.display(), extractor.page_count());
    Ok(text)
}

#[cfg(not(feature = "pdf"))]
fn pdf_to_text(_path: &Path) -> Result<String, ExtractError> {
    Err(ExtractError::Unsupported(
        "PDF support is disabled (build with the `pdf` feature)".to_string(),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse::tokenize;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_kind_from_extension() {
        assert_eq!(DocumentKind::from_path(Path::new("a/INV.TXT")).unwrap(), DocumentKind::Text);
        assert_eq!(DocumentKind::from_path(Path::new("a.csv")).unwrap(), DocumentKind::Csv);
        assert_eq!(DocumentKind::from_path(Path::new("a.pdf")).unwrap(), DocumentKind::Pdf);
        assert!(matches!(
            DocumentKind::from_path(Path::new("scan.png")),
            Err(ExtractError::Unsupported(_))
        ));
        assert!(DocumentKind::from_path(Path::new("README")).is_err());
    }

    #[test]
    fn test_csv_keeps_empty_cells() {
        let csv = "1001,Merlot,,750 ml,7.99,2\n1002,\"Bud Light, 12oz\",AB InBev,24/12 oz,18.99,5\n";
        let text = csv_to_text(csv.as_bytes()).unwrap();
        assert_eq!(
            text,
            "1001,Merlot,,750 ml,7.99,2\n1002,Bud Light 12oz,AB InBev,24/12 oz,18.99,5"
        );
    }

    #[test]
    fn test_cell_commas_do_not_shift_columns() {
        let csv = "1002,\"Bud Light, 12oz\",,24/12 oz,\"1,234.50\",5,Confirmed\n\
                   1003,Chablis,Barefoot,750 ml,\"12,50\",,Confirmed\n";
        let text = csv_to_text(csv.as_bytes()).unwrap();
        let rows: Vec<Vec<String>> = text.lines().map(tokenize).collect();

        assert_eq!(
            rows[0],
            vec!["1002", "Bud Light 12oz", "", "24/12 oz", "1234.50", "5", "Confirmed"]
        );
        assert_eq!(
            rows[1],
            vec!["1003", "Chablis", "Barefoot", "750 ml", "12.50", "", "Confirmed"]
        );
    }

    #[test]
    fn test_json_rows() {
        let json = r#"[["1001", "Merlot", "Barefoot", "750 ml", 7.99, 2, null]]"#;
        assert_eq!(
            json_to_text(json).unwrap(),
            "1001,Merlot,Barefoot,750 ml,7.99,2,"
        );
    }

    #[test]
    fn test_json_object_is_pretty_printed() {
        let text = json_to_text(r#"{"vendor":"ACME"}"#).unwrap();
        assert!(text.contains("\"vendor\": \"ACME\""));
        assert!(matches!(json_to_text("{oops"), Err(ExtractError::Json(_))));
    }

    #[test]
    fn test_extract_text_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("invoice.txt");
        fs::write(&path, "1001  Merlot  Barefoot  750 ml  7.99  2\n").unwrap();
        assert_eq!(extract_text(&path).unwrap().lines().count(), 1);
    }
}
