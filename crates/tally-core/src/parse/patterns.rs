//! Regex patterns shared by the line parser.

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    // Field delimiter: a run of two or more whitespace characters
    pub static ref MULTI_SPACE: Regex = Regex::new(r"\s{2,}").unwrap();

    // Labeled delivery date on a header/footer line
    pub static ref DELIVERY_DATE: Regex = Regex::new(
        r"(?i)\b(?:delivery|ship(?:ping)?|invoice|order)\s+date\b\s*[:#]?\s*(\d{1,4}[./\-]\d{1,2}[./\-]\d{1,4}|[A-Za-z]{3,9}\.?\s+\d{1,2},?\s+\d{4})"
    ).unwrap();

    // Labeled invoice total on a footer line
    pub static ref INVOICE_TOTAL: Regex = Regex::new(
        r"(?i)\b(?:invoice\s+total|total\s+due|amount\s+due|grand\s+total|balance\s+due)\b\s*[:#]?\s*(\$?\s*\d[\d,]*(?:\.\d{1,2})?)"
    ).unwrap();
}
