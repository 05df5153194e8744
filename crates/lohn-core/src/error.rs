//! Error types for the lohn-core library.

use thiserror::Error;

/// Main error type for the lohn library.
#[derive(Error, Debug)]
pub enum LohnError {
    /// The text-extraction collaborator could not produce text.
    #[error("text extraction error: {0}")]
    Text(#[from] TextError),

    /// Page segmentation of a document failed.
    #[error("{document}: {source}")]
    Segment {
        document: String,
        #[source]
        source: SegmentError,
    },

    /// A page could not be parsed into a record.
    #[error("{document}, page {page}: {source}")]
    Page {
        document: String,
        page: usize,
        #[source]
        source: ExtractionError,
    },

    /// The burden ledger could not be parsed.
    #[error("{document}: {source}")]
    Ledger {
        document: String,
        #[source]
        source: ExtractionError,
    },

    /// The payroll journal could not be parsed.
    #[error("{document}: {source}")]
    Journal {
        document: String,
        #[source]
        source: ExtractionError,
    },

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),
}

/// Errors raised at the text-extraction boundary.
#[derive(Error, Debug)]
pub enum TextError {
    /// Failed to open/parse the PDF file.
    #[error("failed to parse PDF: {0}")]
    Pdf(String),

    /// The PDF is encrypted and cannot be processed.
    #[error("PDF is encrypted")]
    Encrypted,

    /// The extracted content carries no page-count metadata.
    #[error("page count metadata missing")]
    MissingPageCount,

    /// The extracted content is not valid UTF-8.
    #[error("extracted content is not UTF-8: {0}")]
    Encoding(#[from] std::string::FromUtf8Error),
}

/// Errors raised while splitting extracted text into pages.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum SegmentError {
    /// Declared and actual page counts disagree.
    #[error("page count mismatch: metadata declares {declared}, text has {actual}")]
    PageCountMismatch { declared: u32, actual: usize },
}

/// Errors raised while pulling fields out of page or ledger lines.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ExtractionError {
    /// No line contains the required marker.
    #[error("anchor not found: {marker:?}")]
    AnchorNotFound { marker: String },

    /// The anchor line does not have the requested token.
    #[error("anchor line for {marker:?} has no token {index}")]
    MissingToken { marker: String, index: usize },

    /// The line at a fixed offset from the anchor does not exist.
    #[error("no line at offset {offset} from anchor {marker:?}")]
    LineOutOfRange { marker: String, offset: isize },

    /// A numeric token does not parse.
    #[error("invalid number: {value:?}")]
    Format { value: String },

    /// A period token is not of the form `MM.YYYY`.
    #[error("invalid period: {value:?}")]
    InvalidPeriod { value: String },

    /// The salary group line carries an unexpected discriminator.
    #[error("unknown salary group discriminator: {discriminator:?}")]
    UnknownSalaryGroup { discriminator: String },

    /// A ledger line matches no known category.
    #[error("unable to process unknown line {index}: {line:?}")]
    UnrecognizedLine { index: usize, line: String },

    /// A field of a ledger or journal line failed to parse.
    #[error("line {index}: {source}")]
    AtLine {
        index: usize,
        #[source]
        source: Box<ExtractionError>,
    },
}

impl ExtractionError {
    pub(crate) fn anchor(marker: &str) -> Self {
        Self::AnchorNotFound {
            marker: marker.to_string(),
        }
    }

    pub(crate) fn token(marker: &str, index: usize) -> Self {
        Self::MissingToken {
            marker: marker.to_string(),
            index,
        }
    }

    /// Attach the index of the offending line.
    pub(crate) fn at_line(self, index: usize) -> Self {
        Self::AtLine {
            index,
            source: Box::new(self),
        }
    }
}

/// Result type for the lohn library.
pub type Result<T> = std::result::Result<T, LohnError>;
