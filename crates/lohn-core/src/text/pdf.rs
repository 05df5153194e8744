//! PDF text extraction using lopdf.

use lopdf::Document;
use tracing::{debug, trace};

use super::{ExtractedText, PAGE_DELIMITER, Result, TextExtractor};
use crate::error::TextError;

/// Extracts per-page text from raw PDF bytes.
///
/// Produces the same page-delimited layout an extraction service returns,
/// with the declared page count taken from the PDF page tree.
#[derive(Debug, Default, Clone, Copy)]
pub struct PdfTextExtractor;

impl PdfTextExtractor {
    pub fn new() -> Self {
        Self
    }

    fn load(&self, data: &[u8]) -> Result<Document> {
        let mut doc = Document::load_mem(data).map_err(|e| TextError::Pdf(e.to_string()))?;

        // Handle PDFs with empty password encryption
        if doc.is_encrypted() {
            if doc.decrypt("").is_err() {
                return Err(TextError::Encrypted);
            }
            debug!("Decrypted PDF with empty password");
        }

        Ok(doc)
    }
}

impl TextExtractor for PdfTextExtractor {
    fn extract(&self, data: &[u8]) -> Result<ExtractedText> {
        let doc = self.load(data)?;
        let pages = doc.get_pages();
        let page_count = pages.len() as u32;

        let mut content = format!(
            r#"<html><head><meta name="xmpTPg:NPages" content="{page_count}"/></head><body>"#
        );

        for page_num in pages.keys() {
            let text = doc
                .extract_text(&[*page_num])
                .map_err(|e| TextError::Pdf(format!("page {page_num}: {e}")))?;
            trace!("Page {} has {} chars of text", page_num, text.len());

            content.push_str(PAGE_DELIMITER);
            content.push_str(&text);
            content.push_str("</div>");
        }
        content.push_str("</body></html>");

        debug!("Extracted text from PDF with {} pages", page_count);
        Ok(ExtractedText {
            page_count,
            content,
        })
    }
}
