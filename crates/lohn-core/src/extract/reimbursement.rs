//! Employer reimbursement slip (AAG Erstattung) parser.

use tracing::{debug, warn};

use super::anchor::{AnchorField, FieldRule, first_line_containing};
use super::rules::parse_german_decimal;
use super::{PageParser, Result};
use crate::error::ExtractionError;
use crate::models::{CorrectionFlags, ReimbursementKind, ReimbursementRecord};
use crate::text::RawPage;

const RETROACTIVE: &str = "Rückrechnung";
const CANCELLATION: &str = "X Stornierung";

const FIRST_NAME: AnchorField = AnchorField::new(
    "Vorname Rentenversicherungsnummer",
    FieldRule::LineRelative(2),
);
const LAST_NAME: AnchorField = AnchorField::new("Name Pers.Nr.", FieldRule::LineRelative(2));

/// Page-type markers, checked in order.
const KINDS: [(&str, ReimbursementKind); 3] = [
    ("Arbeitsunfähigkeit - U1", ReimbursementKind::Incapacity),
    ("Mutterschaft - U2", ReimbursementKind::Maternity),
    ("Beschäftigungsverbot - U2", ReimbursementKind::EmploymentBan),
];

/// Maternity pages state the amount after this phrase.
const MATERNITY: &str = "Mutterschaft - U2";
const MONTHLY_AMOUNT: &str = " im Monat ";
const TOTAL_AMOUNT: AnchorField =
    AnchorField::new("Summe Erstattungsbetrag", FieldRule::TokensFrom(2));
const CURRENCY_SUFFIX: &str = " €";

/// What a reimbursement page yields.
#[derive(Debug, Clone, PartialEq)]
pub enum ReimbursementPage {
    Record(ReimbursementRecord),
    /// Retroactive recalculation pages are not accumulated.
    Retroactive,
    /// The page matches no type marker.
    Unclassified { name: String },
}

/// Parses reimbursement slip pages of one source document.
#[derive(Debug, Clone)]
pub struct ReimbursementParser {
    document: String,
}

impl ReimbursementParser {
    /// Parser for pages of the document labelled `document`.
    pub fn new(document: impl Into<String>) -> Self {
        Self {
            document: document.into(),
        }
    }
}

impl PageParser for ReimbursementParser {
    type Output = ReimbursementPage;

    fn parse_page(&self, page: &RawPage) -> Result<ReimbursementPage> {
        if page.contains(RETROACTIVE) {
            debug!("Skipping retroactive page {}", page.number);
            return Ok(ReimbursementPage::Retroactive);
        }

        let first = FIRST_NAME.extract(&page.lines)?;
        let last = LAST_NAME.extract(&page.lines)?;
        let name = format!("{} {}", without_last_token(&first), without_last_token(&last));

        let Some(kind) = KINDS
            .iter()
            .find(|(marker, _)| page.contains(marker))
            .map(|(_, kind)| *kind)
        else {
            warn!("Unable to find type of page {}", page.number);
            return Ok(ReimbursementPage::Unclassified { name });
        };

        let raw = if page.contains(MATERNITY) {
            monthly_amount(&page.lines)?.to_string()
        } else {
            TOTAL_AMOUNT.extract(&page.lines)?.into_owned()
        };
        let mut amount = parse_german_decimal(&raw.replace(CURRENCY_SUFFIX, ""))?;

        let flags = CorrectionFlags {
            retroactive: false,
            cancellation: page.contains(CANCELLATION),
        };
        if flags.cancellation {
            amount = -amount;
        }

        Ok(ReimbursementPage::Record(ReimbursementRecord {
            name,
            document: self.document.clone(),
            kind,
            flags,
            amount,
        }))
    }
}

/// Text after the first " im Monat " on the first line carrying it.
fn monthly_amount(lines: &[String]) -> Result<&str> {
    let line = first_line_containing(lines, MONTHLY_AMOUNT)?;
    line.split(MONTHLY_AMOUNT)
        .nth(1)
        .ok_or_else(|| ExtractionError::token(MONTHLY_AMOUNT, 1))
}

fn without_last_token(line: &str) -> &str {
    line.rsplit_once(' ').map_or("", |(head, _)| head)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rust_decimal::Decimal;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn slip(body: &[&str]) -> RawPage {
        let mut lines = vec![
            "Erstattungsantrag nach dem AAG",
            "Vorname Rentenversicherungsnummer",
            "",
            "Anna 12010190M123",
            "Name Pers.Nr.",
            "",
            "Muster 004711",
        ];
        lines.extend_from_slice(body);
        RawPage::new(1, lines.join("\n"))
    }

    fn record(page: &RawPage) -> ReimbursementRecord {
        match ReimbursementParser::new("file_1").parse_page(page).unwrap() {
            ReimbursementPage::Record(record) => record,
            other => panic!("expected a record, got {other:?}"),
        }
    }

    #[test]
    fn test_incapacity_page() {
        let page = slip(&[
            "Arbeitsunfähigkeit - U1",
            "Summe Erstattungsbetrag 1.234,56 €",
        ]);
        let record = record(&page);

        assert_eq!(record.name, "Anna Muster");
        assert_eq!(record.document, "file_1");
        assert_eq!(record.kind, ReimbursementKind::Incapacity);
        assert_eq!(record.amount, dec("1234.56"));
        assert!(!record.flags.cancellation);
    }

    #[test]
    fn test_maternity_page_uses_monthly_amount() {
        let page = slip(&[
            "Mutterschaft - U2",
            "Zuschuss im Monat 812,40 €",
            "Summe Erstattungsbetrag 999,99 €",
        ]);
        let record = record(&page);

        assert_eq!(record.kind, ReimbursementKind::Maternity);
        assert_eq!(record.amount, dec("812.40"));
    }

    #[test]
    fn test_employment_ban_page_uses_total() {
        let page = slip(&[
            "Beschäftigungsverbot - U2",
            "Zuschuss im Monat 1,00 €",
            "Summe Erstattungsbetrag 2.000,00 €",
        ]);
        let record = record(&page);

        assert_eq!(record.kind, ReimbursementKind::EmploymentBan);
        assert_eq!(record.amount, dec("2000.00"));
    }

    #[test]
    fn test_cancellation_negates() {
        let page = slip(&[
            "X Stornierung",
            "Arbeitsunfähigkeit - U1",
            "Summe Erstattungsbetrag 100,00 €",
        ]);
        let record = record(&page);
        assert!(record.flags.cancellation);
        assert_eq!(record.amount, dec("-100.00"));
    }

    #[test]
    fn test_retroactive_page_is_skipped() {
        let page = slip(&["Rückrechnung", "Summe Erstattungsbetrag kaputt"]);
        assert_eq!(
            ReimbursementParser::new("file_1").parse_page(&page).unwrap(),
            ReimbursementPage::Retroactive
        );
    }

    #[test]
    fn test_unclassified_page() {
        let page = slip(&["Summe Erstattungsbetrag 10,00 €"]);
        assert_eq!(
            ReimbursementParser::new("file_1").parse_page(&page).unwrap(),
            ReimbursementPage::Unclassified {
                name: "Anna Muster".to_string()
            }
        );
    }

    #[test]
    fn test_missing_name_anchor() {
        let page = RawPage::new(1, "Arbeitsunfähigkeit - U1");
        assert_eq!(
            ReimbursementParser::new("file_1").parse_page(&page),
            Err(ExtractionError::AnchorNotFound {
                marker: "Vorname Rentenversicherungsnummer".to_string()
            })
        );
    }
}
