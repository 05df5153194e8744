//! Record parsers for the four payroll document families.
//!
//! Payroll and reimbursement slips are parsed page by page through
//! [`PageParser`]; the employer burden ledger and the payroll journal are
//! flat line sequences cut out of every page and scanned sequentially.

pub mod anchor;
pub mod journal;
pub mod ledger;
pub mod payroll;
pub mod reimbursement;
pub mod rules;

pub use journal::JournalParser;
pub use ledger::{LedgerBlock, LedgerParser, LedgerState};
pub use payroll::PayrollParser;
pub use reimbursement::{ReimbursementPage, ReimbursementParser};

use crate::error::ExtractionError;
use crate::text::RawPage;

/// Result type for extraction operations.
pub type Result<T> = std::result::Result<T, ExtractionError>;

/// Trait for parsers that turn one page into one record.
pub trait PageParser {
    /// What a single page yields.
    type Output;

    /// Parse one page.
    fn parse_page(&self, page: &RawPage) -> Result<Self::Output>;
}
