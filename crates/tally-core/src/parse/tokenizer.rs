//! Line classification and field splitting.

use super::patterns::MULTI_SPACE;

/// What a single line of extracted text turned out to be.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineKind {
    /// Nothing left after trimming.
    Blank,
    /// Contains a denylisted marker (document chrome, totals, dates).
    Noise,
    /// An upper-case label that sets the category context for following rows.
    SectionHeader(String),
    /// Candidate data row split into fields.
    Fields(Vec<String>),
}

/// Splits lines into fields and filters out noise and section headers.
#[derive(Debug, Clone)]
pub struct LineTokenizer {
    noise_markers: Vec<String>,
    min_fields: usize,
}

impl LineTokenizer {
    pub fn new(noise_markers: Vec<String>, min_fields: usize) -> Self {
        Self {
            noise_markers: noise_markers
                .into_iter()
                .filter(|m| !m.is_empty())
                .map(|m| m.to_lowercase())
                .collect(),
            min_fields,
        }
    }

    /// Whether the line contains any denylisted marker, ignoring case.
    pub fn is_noise(&self, line: &str) -> bool {
        let line = line.to_lowercase();
        self.noise_markers
            .iter()
            .any(|marker| line.contains(marker.as_str()))
    }

    /// Classify one raw line.
    ///
    /// Noise filtering runs before header detection, so upper-case chrome such as
    /// "INVOICE" or "PAGE 2" never becomes a category header.
    pub fn classify(&self, line: &str) -> LineKind {
        let line = line.trim();
        if line.is_empty() {
            return LineKind::Blank;
        }
        if self.is_noise(line) {
            return LineKind::Noise;
        }

        let fields = tokenize(line);
        if is_upper_case_label(line) && fields.len() < self.min_fields {
            return LineKind::SectionHeader(collapse_whitespace(line));
        }

        LineKind::Fields(fields)
    }
}

/// Split a line on the first delimiter rule that applies: a run of two or more
/// whitespace characters, then a tab, then a comma.
///
/// Commas are tried last because they show up inside free-text fields of
/// space- and tab-delimited sources.
pub fn tokenize(line: &str) -> Vec<String> {
    let line = line.trim();
    if line.is_empty() {
        return Vec::new();
    }

    let parts: Vec<&str> = if MULTI_SPACE.is_match(line) {
        MULTI_SPACE.split(line).collect()
    } else if line.contains('\t') {
        line.split('\t').collect()
    } else if line.contains(',') {
        line.split(',').collect()
    } else {
        vec![line]
    };

    parts.into_iter().map(|p| p.trim().to_string()).collect()
}

/// Fully upper-case text with at least one letter, excluding total lines.
pub fn is_upper_case_label(line: &str) -> bool {
    let has_letter = line.chars().any(|c| c.is_alphabetic());
    let has_lower = line.chars().any(|c| c.is_lowercase());
    has_letter && !has_lower && !line.contains("TOTAL")
}

fn collapse_whitespace(line: &str) -> String {
    line.split_whitespace().collect::<Vec<_>>().join(" ")
}
