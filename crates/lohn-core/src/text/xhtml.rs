//! XHTML produced by a Tika-style text-extraction service.

use tracing::debug;

use super::{ExtractedText, Result, TextExtractor};
use crate::error::TextError;
use crate::extract::rules::XHTML_PAGE_COUNT;

/// Reads already-extracted XHTML (`tika --xml document.pdf`).
///
/// The declared page count comes from the `xmpTPg:NPages` meta element.
#[derive(Debug, Default, Clone, Copy)]
pub struct XhtmlExtractor;

impl XhtmlExtractor {
    pub fn new() -> Self {
        Self
    }
}

impl TextExtractor for XhtmlExtractor {
    fn extract(&self, data: &[u8]) -> Result<ExtractedText> {
        let content = String::from_utf8(data.to_vec())?;
        let content = content
            .strip_prefix('\u{feff}')
            .unwrap_or(content.as_str())
            .to_string();

        let page_count = XHTML_PAGE_COUNT
            .captures(&content)
            .and_then(|caps| caps[1].parse::<u32>().ok())
            .ok_or(TextError::MissingPageCount)?;

        debug!("XHTML declares {} pages", page_count);
        Ok(ExtractedText {
            page_count,
            content,
        })
    }
}
