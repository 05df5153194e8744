//! German decimal amounts ("1.234,56").

use rust_decimal::{Decimal, RoundingStrategy};
use std::str::FromStr;

use super::patterns::LEDGER_AMOUNT;
use crate::error::ExtractionError;

/// Parse a German-formatted amount (e.g., "1.234,56" or "-12,50").
///
/// Thousands-separator dots are dropped and the decimal comma becomes a
/// decimal point before parsing.
pub fn parse_german_decimal(s: &str) -> Result<Decimal, ExtractionError> {
    let normalized = s.trim().replace('.', "").replace(',', ".");

    Decimal::from_str(&normalized).map_err(|_| ExtractionError::Format {
        value: s.to_string(),
    })
}

/// Format an amount with two decimals and a decimal comma ("1234,56").
///
/// No thousands separators are inserted.
pub fn format_german_decimal(amount: Decimal) -> String {
    let rounded = amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    // avoid "-0,00" after a cancellation nets an amount out
    let rounded = if rounded.is_zero() { Decimal::ZERO } else { rounded };

    format!("{:.2}", rounded).replace('.', ",")
}

/// Whether a ledger token looks like a German amount.
pub fn is_german_amount(token: &str) -> bool {
    LEDGER_AMOUNT.is_match(token)
}
