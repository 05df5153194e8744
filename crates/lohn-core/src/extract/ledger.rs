//! Employer burden ledger (AG Belastung) line parser.
//!
//! The ledger is a flat sequence of lines grouped into employee blocks.
//! A block opens with a line starting with the personnel number, collects
//! contribution lines by their leading phrase and closes at the subtotal
//! line. A contribution line may be followed by a retroactive value line
//! ("aus RR: ...") that is merged into it and never processed on its own.

use rust_decimal::Decimal;
use tracing::{debug, trace};

use super::Result;
use super::anchor::{token_from_end, tokens};
use super::rules::{LEDGER_RETROACTIVE, is_german_amount, parse_german_decimal};
use crate::error::ExtractionError;
use crate::models::{BurdenCategory, BurdenLine};

const SUBTOTAL: &str = "Zwischensummen";

/// Leading phrases of contribution lines.
const CATEGORY_PREFIXES: [(&str, BurdenCategory); 16] = [
    ("SV-AG Anteil (Pflicht)", BurdenCategory::EmployerSocialSecurity),
    ("SV-AG Anteil (Pauschal)", BurdenCategory::EmployerSocialSecurity),
    ("Umlage 1/2", BurdenCategory::EmployerSocialSecurity),
    ("Insolvenzgeldumlage", BurdenCategory::EmployerSocialSecurity),
    ("aus RR: Umlage 1/2", BurdenCategory::EmployerSocialSecurity),
    ("aus RR: SV-AG Anteil (Pflicht)", BurdenCategory::EmployerSocialSecurity),
    ("aus RR: Insolvenzgeldumlage", BurdenCategory::EmployerSocialSecurity),
    ("geringf. p. Steuer", BurdenCategory::EmployerSocialSecurity),
    ("Erst. Entg. AU", BurdenCategory::U1),
    ("aus RR: Erst. Entg. AU", BurdenCategory::U1),
    ("Erst. Entg. B.Verbot", BurdenCategory::U2),
    ("aus RR: Erst. Entg. B.Verbot", BurdenCategory::U2),
    ("Erst. SV-AG B.Verbot", BurdenCategory::U2),
    ("aus RR: Erst. SV-AG B.Verbot", BurdenCategory::U2),
    ("Erst. Mutterschutz", BurdenCategory::U2),
    ("aus RR: Erst. Mutterschutz", BurdenCategory::U2),
];

/// Position of the parser relative to employee blocks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LedgerState {
    /// No block has been opened yet.
    AwaitingEmployeeStart,
    /// Contribution lines belong to the last opened block.
    InEmployeeBlock,
    /// The subtotal line was seen; lines are ignored until the next block.
    EmployeeBlockDone,
}

/// The contributions of one employee block.
#[derive(Debug, Clone, PartialEq)]
pub struct LedgerBlock {
    pub subject: String,
    /// Index of the line that opened the block.
    pub line: usize,
    pub contributions: Vec<BurdenLine>,
}

impl LedgerBlock {
    /// Summed monthly and total amounts of one category.
    pub fn amounts(&self, category: BurdenCategory) -> (Decimal, Decimal) {
        self.contributions
            .iter()
            .filter(|c| c.category == category)
            .fold((Decimal::ZERO, Decimal::ZERO), |(monthly, total), c| {
                (monthly + c.monthly, total + c.total)
            })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LineKind {
    EmployeeStart,
    Subtotal,
    Contribution(BurdenCategory),
    Unrecognized,
}

fn classify(line: &str) -> LineKind {
    if line.starts_with(|c: char| c.is_ascii_digit()) {
        return LineKind::EmployeeStart;
    }
    if line.starts_with(SUBTOTAL) {
        return LineKind::Subtotal;
    }
    CATEGORY_PREFIXES
        .iter()
        .find(|(prefix, _)| line.starts_with(prefix))
        .map_or(LineKind::Unrecognized, |(_, category)| {
            LineKind::Contribution(*category)
        })
}

/// Line-by-line ledger state machine.
#[derive(Debug)]
pub struct LedgerParser {
    state: LedgerState,
    blocks: Vec<LedgerBlock>,
}

impl Default for LedgerParser {
    fn default() -> Self {
        Self::new()
    }
}

impl LedgerParser {
    pub fn new() -> Self {
        Self {
            state: LedgerState::AwaitingEmployeeStart,
            blocks: Vec::new(),
        }
    }

    /// Parse a complete ledger line sequence.
    pub fn parse<S: AsRef<str>>(lines: &[S]) -> Result<Vec<LedgerBlock>> {
        let mut parser = Self::new();
        let mut lines = lines.iter().map(|line| line.as_ref()).enumerate().peekable();

        while let Some((index, line)) = lines.next() {
            let next = lines.peek().map(|(_, next)| *next);
            if parser.step(index, line, next)? {
                lines.next();
            }
        }

        Ok(parser.finish())
    }

    pub fn state(&self) -> LedgerState {
        self.state
    }

    /// Process one line given the line after it.
    ///
    /// Returns whether the following line was merged and must be skipped.
    pub fn step(&mut self, index: usize, line: &str, next: Option<&str>) -> Result<bool> {
        let retroactive = next.filter(|next| LEDGER_RETROACTIVE.is_match(next));
        trace!("Ledger line {} in state {:?}", index, self.state);

        match (classify(line), self.state) {
            (LineKind::EmployeeStart, _) => {
                let subject = employee_name(index, line)?;
                debug!("Employee block opens at line {}", index);
                let gross =
                    contribution(&subject, BurdenCategory::GrossPay, index, line, retroactive)
                        .map_err(|e| e.at_line(index))?;
                self.blocks.push(LedgerBlock {
                    subject,
                    line: index,
                    contributions: vec![gross],
                });
                self.state = LedgerState::InEmployeeBlock;
                Ok(retroactive.is_some())
            }
            (LineKind::Subtotal, _) => {
                debug!("Employee block closes at line {}", index);
                self.state = LedgerState::EmployeeBlockDone;
                Ok(false)
            }
            (_, LedgerState::EmployeeBlockDone) => Ok(false),
            (LineKind::Contribution(category), LedgerState::InEmployeeBlock) => {
                let Some(block) = self.blocks.last_mut() else {
                    return Err(unrecognized(index, line));
                };
                let entry = contribution(&block.subject, category, index, line, retroactive)
                    .map_err(|e| e.at_line(index))?;
                block.contributions.push(entry);
                Ok(retroactive.is_some())
            }
            _ => Err(unrecognized(index, line)),
        }
    }

    pub fn finish(self) -> Vec<LedgerBlock> {
        self.blocks
    }
}

fn unrecognized(index: usize, line: &str) -> ExtractionError {
    ExtractionError::UnrecognizedLine {
        index,
        line: line.to_string(),
    }
}

/// Name between the personnel number and the one or two trailing amounts.
fn employee_name(index: usize, line: &str) -> Result<String> {
    let tokens = tokens(line);
    let has_monthly = tokens.len() >= 2 && is_german_amount(tokens[tokens.len() - 2]);
    let end = tokens.len().saturating_sub(if has_monthly { 2 } else { 1 });

    let name = tokens.get(1..end).unwrap_or_default().join(" ");
    if name.is_empty() {
        return Err(unrecognized(index, line));
    }
    Ok(name)
}

/// Signed contribution of `line`, merged with its retroactive follow-up.
///
/// Without a follow-up the last token is the total and the token before it,
/// if it is an amount, the monthly value. With a follow-up its last token is
/// the total and its second-to-last token plus this line's last token the
/// monthly value.
fn contribution(
    subject: &str,
    category: BurdenCategory,
    index: usize,
    line: &str,
    retroactive: Option<&str>,
) -> Result<BurdenLine> {
    let last = parse_german_decimal(token_from_end(line, 1, line)?)?;

    let (monthly, total) = match retroactive {
        Some(next) => {
            debug!("Merging retroactive line {} into line {}", index + 1, index);
            let total = parse_german_decimal(token_from_end(next, 1, next)?)?;
            let monthly = parse_german_decimal(token_from_end(next, 2, next)?)? + last;
            (monthly, total)
        }
        None => {
            let previous = token_from_end(line, 2, line)?;
            let monthly = if is_german_amount(previous) {
                parse_german_decimal(previous)?
            } else {
                Decimal::ZERO
            };
            (monthly, last)
        }
    };

    let sign = category.sign();
    Ok(BurdenLine {
        subject: subject.to_string(),
        category,
        monthly: sign * monthly,
        total: sign * total,
        line: index,
    })
}
