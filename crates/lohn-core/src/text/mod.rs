//! Text-extraction boundary and page segmentation.
//!
//! Turning raw document bytes into text is delegated to a [`TextExtractor`].
//! The extractor returns marked-up text together with the page count the
//! source document declares; [`segment`] splits that text into pages and
//! refuses to continue when the two disagree.

#[cfg(feature = "native")]
mod pdf;
mod segmenter;
mod xhtml;

#[cfg(feature = "native")]
pub use pdf::PdfTextExtractor;
pub use segmenter::{PAGE_DELIMITER, segment};
pub use xhtml::XhtmlExtractor;

use crate::error::TextError;

/// Result type for text extraction.
pub type Result<T> = std::result::Result<T, TextError>;

/// Marked-up text of a whole document plus its declared page count.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedText {
    /// Page count reported by the document metadata.
    pub page_count: u32,
    /// Text with `<div class="page">` delimiters and inline markup.
    pub content: String,
}

/// Trait for text-extraction collaborators.
pub trait TextExtractor {
    /// Extract marked-up text from raw document bytes.
    fn extract(&self, data: &[u8]) -> Result<ExtractedText>;
}

impl<T: TextExtractor + ?Sized> TextExtractor for &T {
    fn extract(&self, data: &[u8]) -> Result<ExtractedText> {
        (**self).extract(data)
    }
}

/// Text of one physical page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawPage {
    /// Page number (1-indexed).
    pub number: usize,
    /// Page text without markup.
    pub text: String,
    /// `text` split at newlines.
    pub lines: Vec<String>,
}

impl RawPage {
    pub fn new(number: usize, text: impl Into<String>) -> Self {
        let text = text.into();
        let lines = text.split('\n').map(str::to_string).collect();
        Self {
            number,
            text,
            lines,
        }
    }

    pub fn contains(&self, marker: &str) -> bool {
        self.text.contains(marker)
    }
}

/// Extractor that picks PDF or XHTML handling from the content itself.
#[derive(Debug, Default)]
pub struct AutoExtractor {
    xhtml: XhtmlExtractor,
    #[cfg(feature = "native")]
    pdf: PdfTextExtractor,
}

impl AutoExtractor {
    pub fn new() -> Self {
        Self::default()
    }
}

impl TextExtractor for AutoExtractor {
    fn extract(&self, data: &[u8]) -> Result<ExtractedText> {
        #[cfg(feature = "native")]
        if data.starts_with(b"%PDF-") {
            return self.pdf.extract(data);
        }
        self.xhtml.extract(data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_raw_page_lines_split_at_newline() {
        let page = RawPage::new(1, "a b\n\nc\r");
        assert_eq!(page.lines, vec!["a b", "", "c\r"]);
        assert!(page.contains("a b"));
    }

    #[test]
    fn test_auto_extractor_falls_back_to_xhtml() {
        let xhtml = br#"<html><head><meta name="xmpTPg:NPages" content="1"/></head><body><div class="page"><p>x</p></div></body></html>"#;
        let text = AutoExtractor::new().extract(xhtml).unwrap();
        assert_eq!(text.page_count, 1);
    }
}
