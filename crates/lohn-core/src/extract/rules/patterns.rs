//! Common regex patterns for payroll document extraction.

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    // German amount at the start of a ledger token (1.234,56 or -12,00)
    pub static ref LEDGER_AMOUNT: Regex = Regex::new(
        r"^-?\d+\.?\d*,\d{2}"
    ).unwrap();

    // Retroactive value line following a ledger category line
    pub static ref LEDGER_RETROACTIVE: Regex = Regex::new(
        r"^aus RR: -?\d+\.?\d*,\d{2}"
    ).unwrap();

    // Six-digit personnel code as a whole token
    pub static ref PERSONNEL_CODE: Regex = Regex::new(
        r"^\d{6}$"
    ).unwrap();

    // Journal line opening with a personnel code
    pub static ref PERSONNEL_CODE_PREFIX: Regex = Regex::new(
        r"^\d{6}"
    ).unwrap();

    // First amount on a journal name line
    pub static ref JOURNAL_AMOUNT: Regex = Regex::new(
        r"\b\d{1,3}(?:\.\d{3})*,\d+\b"
    ).unwrap();

    // Weekly hours followed by a second hours figure
    pub static ref WEEKLY_HOURS: Regex = Regex::new(
        r"(\d+,\d+) \d+,\d+"
    ).unwrap();

    // Tika-style XHTML page count metadata
    pub static ref XHTML_PAGE_COUNT: Regex = Regex::new(
        r#"<meta\s+name="xmpTPg:NPages"\s+content="(\d+)"\s*/?>"#
    ).unwrap();
}
