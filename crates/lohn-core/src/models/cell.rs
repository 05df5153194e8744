//! Table cell values.

use std::fmt;

use rust_decimal::Decimal;
use serde::Serialize;

use crate::extract::rules::format_german_decimal;

/// A single value in an aggregation table or report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Cell {
    /// A numeric amount.
    Amount(Decimal),
    /// A categorical value (e.g. a salary group).
    Text(String),
    /// The source record was malformed; rendered as "?".
    Unknown,
}

impl Cell {
    pub fn zero() -> Self {
        Cell::Amount(Decimal::ZERO)
    }

    pub fn is_numeric(&self) -> bool {
        matches!(self, Cell::Amount(_))
    }

    /// Sum two cells. Unknown or text on either side yields unknown.
    pub fn sum(&self, other: &Cell) -> Cell {
        match (self, other) {
            (Cell::Amount(a), Cell::Amount(b)) => Cell::Amount(a + b),
            _ => Cell::Unknown,
        }
    }
}

impl From<Decimal> for Cell {
    fn from(amount: Decimal) -> Self {
        Cell::Amount(amount)
    }
}

impl From<String> for Cell {
    fn from(text: String) -> Self {
        Cell::Text(text)
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cell::Amount(amount) => f.write_str(&format_german_decimal(*amount)),
            Cell::Text(text) => f.write_str(text),
            Cell::Unknown => f.write_str("?"),
        }
    }
}
