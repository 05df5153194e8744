//! Split extracted text into pages.

use tracing::{debug, error};

use super::{ExtractedText, RawPage};
use crate::error::SegmentError;

/// Marker that opens every page in extracted content.
pub const PAGE_DELIMITER: &str = r#"<div class="page">"#;

/// Inline markup removed before splitting. `</div>` is among them, so page
/// closing tags vanish and only the opening delimiters remain.
const INLINE_MARKUP: [&str; 5] = ["<p>", "</p>", "<div>", "</div>", "<p />"];

/// Split extracted content into pages.
///
/// The segment before the first delimiter is front matter and is dropped.
/// Fails with [`SegmentError::PageCountMismatch`] when the number of pages
/// differs from the declared count, which signals that text extraction
/// degraded silently.
pub fn segment(text: &ExtractedText) -> Result<Vec<RawPage>, SegmentError> {
    let body = body_of(&text.content);

    let stripped = INLINE_MARKUP
        .iter()
        .fold(body.to_string(), |acc, tag| acc.replace(tag, ""));

    let pages: Vec<RawPage> = stripped
        .split(PAGE_DELIMITER)
        .skip(1)
        .enumerate()
        .map(|(idx, page)| RawPage::new(idx + 1, page))
        .collect();

    if pages.len() != text.page_count as usize {
        error!(
            "Page number crosscheck failed: declared {}, found {}",
            text.page_count,
            pages.len()
        );
        return Err(SegmentError::PageCountMismatch {
            declared: text.page_count,
            actual: pages.len(),
        });
    }

    debug!("Segmented document into {} pages", pages.len());
    Ok(pages)
}

/// Text between `<body>` and `</body>`, or everything if there is no body.
fn body_of(content: &str) -> &str {
    let after_open = content
        .split_once("<body>")
        .map(|(_, rest)| rest)
        .unwrap_or(content);

    after_open
        .split_once("</body>")
        .map(|(body, _)| body)
        .unwrap_or(after_open)
}
