//! Error types for the tally-core library.

use std::path::PathBuf;

use thiserror::Error;

/// Main error type for the tally library.
#[derive(Error, Debug)]
pub enum TallyError {
    /// Document text extraction error.
    #[error("extraction error: {0}")]
    Extraction(#[from] ExtractError),

    /// Inventory persistence error.
    #[error("store error: {0}")]
    Store(#[from] StoreError),

    /// A batch could not be committed to the inventory.
    #[error("reconciliation failed for {document}: {source}")]
    Reconcile {
        document: String,
        #[source]
        source: StoreError,
    },

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),
}

/// Errors raised while turning a source document into raw text.
#[derive(Error, Debug)]
pub enum ExtractError {
    /// The file type has no text adapter.
    #[error("unsupported document format: {0}")]
    Unsupported(String),

    /// The document produced no text at all.
    #[error("no text extracted from {0}")]
    Empty(String),

    /// Failed to open/parse a PDF.
    #[error("failed to parse PDF: {0}")]
    Pdf(String),

    /// The PDF is encrypted and cannot be processed.
    #[error("PDF is encrypted")]
    Encrypted,

    /// Failed to read a CSV document.
    #[error("failed to read CSV: {0}")]
    Csv(#[from] csv::Error),

    /// Failed to read a JSON document.
    #[error("failed to read JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// I/O error while reading the document.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors related to inventory persistence and export.
#[derive(Error, Debug)]
pub enum StoreError {
    /// Reading or writing the store file failed.
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The store file is not a valid inventory snapshot.
    #[error("corrupt inventory file {path}: {source}")]
    Corrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// Serializing the inventory failed.
    #[error("failed to serialize inventory: {0}")]
    Serialize(#[from] serde_json::Error),

    /// Writing the tabular export failed.
    #[error("export failed: {0}")]
    Export(#[from] csv::Error),

    /// Every save attempt failed.
    #[error("save failed after {attempts} attempts: {last}")]
    SaveExhausted { attempts: u32, last: Box<StoreError> },

    /// The store lock was poisoned by a panicking writer.
    #[error("inventory lock poisoned")]
    Poisoned,
}

impl StoreError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

/// Result type for the tally library.
pub type Result<T> = std::result::Result<T, TallyError>;
