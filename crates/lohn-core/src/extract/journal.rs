//! Payroll journal (Lohnjournal) parser.
//!
//! Each journal record spans two lines: the personnel code line with the
//! gross amounts at fixed token positions, then the name line with the
//! employer social-security share as its first amount. The line after a
//! record must open the next record or the subtotals.

use rust_decimal::Decimal;
use tracing::{debug, warn};

use super::Result;
use super::anchor::tokens;
use super::rules::{JOURNAL_AMOUNT, PERSONNEL_CODE, PERSONNEL_CODE_PREFIX, parse_german_decimal};
use crate::models::{JournalAmounts, JournalEntry};

const GROSS_TOTAL_TOKEN: usize = 7;
const TAX_GROSS_TOKEN: usize = 8;
const MISSING_AMOUNT: &str = "0";

/// Scans journal lines for personnel records.
#[derive(Debug, Clone)]
pub struct JournalParser {
    subtotal_marker: String,
}

impl JournalParser {
    /// Parser that accepts `subtotal_marker` as a record terminator.
    pub fn new(subtotal_marker: impl Into<String>) -> Self {
        Self {
            subtotal_marker: subtotal_marker.into(),
        }
    }

    /// Parse the body lines of a journal, in order.
    ///
    /// Records whose terminator line is not as expected are returned without
    /// amounts.
    pub fn parse<S: AsRef<str>>(&self, lines: &[S]) -> Result<Vec<JournalEntry>> {
        let mut entries = Vec::new();
        let mut index = 0;

        while let Some(code_line) = line_at(lines, index) {
            let fields = tokens(code_line);
            if !PERSONNEL_CODE.is_match(fields[0]) {
                index += 1;
                continue;
            }
            let personnel_code = fields[0].to_string();
            let gross_total = fields.get(GROSS_TOTAL_TOKEN).copied().unwrap_or(MISSING_AMOUNT);
            let tax_gross = fields.get(TAX_GROSS_TOKEN).copied().unwrap_or(MISSING_AMOUNT);

            let Some(name_line) = line_at(lines, index + 1) else {
                warn!("Journal ends after personnel code line {}", index);
                entries.push(JournalEntry {
                    name: personnel_code.clone(),
                    personnel_code,
                    amounts: None,
                });
                break;
            };
            let (name, social_security) = split_name_line(name_line);

            let terminated = line_at(lines, index + 2).is_none_or(|next| {
                PERSONNEL_CODE_PREFIX.is_match(next) || next.contains(&self.subtotal_marker)
            });
            if !terminated {
                warn!("Unexpected journal layout after line {}", index + 1);
                entries.push(JournalEntry {
                    personnel_code,
                    name,
                    amounts: None,
                });
                index += 3;
                continue;
            }

            debug!("Journal record {} at line {}", personnel_code, index);
            entries.push(JournalEntry {
                personnel_code,
                name,
                amounts: Some(JournalAmounts {
                    tax_gross: amount_at(tax_gross, index)?,
                    gross_total: amount_at(gross_total, index)?,
                    employer_social_security: amount_at(
                        social_security.unwrap_or(MISSING_AMOUNT),
                        index + 1,
                    )?,
                }),
            });
            index += 2;
        }

        Ok(entries)
    }
}

fn amount_at(value: &str, index: usize) -> Result<Decimal> {
    parse_german_decimal(value).map_err(|e| e.at_line(index))
}

fn line_at<S: AsRef<str>>(lines: &[S], index: usize) -> Option<&str> {
    lines.get(index).map(|line| line.as_ref())
}

/// Split a name line at its first amount.
fn split_name_line(line: &str) -> (String, Option<&str>) {
    let (head, amount) = match JOURNAL_AMOUNT.find(line) {
        Some(m) => (&line[..m.start()], Some(m.as_str())),
        None => (line, None),
    };
    let name = head.trim().trim_matches(&[' ', '*', ')'][..]).to_string();
    (name, amount)
}
