//! Locale and pattern rules shared by the record parsers.

pub mod amounts;
pub mod patterns;

pub use amounts::{format_german_decimal, is_german_amount, parse_german_decimal};
pub use patterns::*;
