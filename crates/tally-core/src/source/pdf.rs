//! PDF text layer extraction using lopdf and pdf-extract.

use lopdf::Document;
use tracing::debug;

use crate::error::ExtractError;

/// Reads the embedded text layer of a PDF. Scanned PDFs without a text layer
/// produce no text; OCR happens upstream.
#[derive(Default)]
pub struct PdfExtractor {
    raw_data: Vec<u8>,
    pages: usize,
}

impl PdfExtractor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a PDF from bytes, decrypting documents protected by an empty password.
    pub fn load(&mut self, data: &[u8]) -> Result<(), ExtractError> {
        let mut doc = Document::load_mem(data).map_err(|e| ExtractError::Pdf(e.to_string()))?;

        if doc.is_encrypted() {
            if doc.decrypt("").is_err() {
                return Err(ExtractError::Encrypted);
            }
            debug!("Decrypted PDF with empty password");

            // pdf-extract needs the decrypted bytes
            let mut decrypted = Vec::new();
            doc.save_to(&mut decrypted)
                .map_err(|e| ExtractError::Pdf(format!("failed to save decrypted PDF: {e}")))?;
            self.raw_data = decrypted;
        } else {
            self.raw_data = data.to_vec();
        }

        self.pages = doc.get_pages().len();
        if self.pages == 0 {
            return Err(ExtractError::Pdf("document has no pages".to_string()));
        }

        debug!("Loaded PDF with {} pages", self.pages);
        Ok(())
    }

    pub fn page_count(&self) -> usize {
        self.pages
    }

    /// Text of every page, in page order.
    pub fn extract_text(&self) -> Result<String, ExtractError> {
        pdf_extract::extract_text_from_mem(&self.raw_data).map_err(|e| ExtractError::Pdf(e.to_string()))
    }
}
