//! Payroll slip (Gehaltsabrechnung) parser.

use rust_decimal::Decimal;
use tracing::{debug, info};

use super::anchor::{
    AnchorField, FieldRule, first_index_containing, first_line_containing, region_contains,
    tokens_from,
};
use super::rules::{WEEKLY_HOURS, parse_german_decimal};
use super::{PageParser, Result};
use crate::error::ExtractionError;
use crate::models::{CorrectionFlags, PayrollMetric, PayrollRecord, Period, UNKNOWN_WEEKLY_HOURS};
use crate::text::RawPage;

const PERIOD: AnchorField = AnchorField::new("Gehaltsabrechnung", FieldRule::TokenFromEnd(1));
const DEPARTMENT: &str = " Abteilung";
const RETROACTIVE: &str = "Rückrechnung";
const CANCELLATION: &str = "X Stornierung";

const WAGE_TABLE_HEADER: &str = "Kosten- Kosten- Lohn";
const GROSS_TOTAL: &str = "GESAMTBRUTTO";
/// Wage lines carrying this suffix are taxable.
const TAXABLE_SUFFIX: &str = "* *";

const WORKING_TIME: AnchorField = AnchorField::new("Arb.Zeit", FieldRule::LineRelative(3));

const SALARY_GROUP: &str = "TVöD";
const BASE_PAY: &str = "Grundvergütung";

const DEFERRED_COMPENSATION: AnchorField =
    AnchorField::new("Entgeltumw.Altersv.lfd", FieldRule::TokenFromEnd(1));
const MATERNITY_PAY: &str = "Mutterschaftsgeld";
const MATERNITY_PROTECTION: AnchorField =
    AnchorField::new("Mutterschutzfrist", FieldRule::Token(1));

/// Where an allowance marker has to appear for the allowance to count.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Scope {
    /// Inside the wage-line region.
    WageRegion,
    /// Anywhere on the page.
    Page,
}

#[derive(Debug, Clone, Copy)]
struct Allowance {
    metric: PayrollMetric,
    field: AnchorField,
    scope: Scope,
}

const ALLOWANCES: [Allowance; 3] = [
    Allowance {
        metric: PayrollMetric::LabourMarketAllowance,
        field: AnchorField::new("Arbeitsmarktzulage", FieldRule::Token(2)),
        scope: Scope::WageRegion,
    },
    Allowance {
        metric: PayrollMetric::MunichAllowance,
        field: AnchorField::new("Münchenzulage", FieldRule::Token(2)),
        scope: Scope::WageRegion,
    },
    Allowance {
        metric: PayrollMetric::CommuterAllowance,
        field: AnchorField::new("Fahrten zw.", FieldRule::Token(7)),
        scope: Scope::Page,
    },
];

/// Parses one payroll slip page into a [`PayrollRecord`].
#[derive(Debug, Default, Clone, Copy)]
pub struct PayrollParser;

impl PayrollParser {
    pub fn new() -> Self {
        Self
    }
}

impl PageParser for PayrollParser {
    type Output = PayrollRecord;

    fn parse_page(&self, page: &RawPage) -> Result<PayrollRecord> {
        let lines = &page.lines;

        let period = Period::parse(&PERIOD.extract(lines)?)?;
        let name_line = first_line_containing(lines, DEPARTMENT)?;
        let name = name_line
            .split_once(DEPARTMENT)
            .map_or(name_line, |(name, _)| name)
            .to_string();

        let flags = CorrectionFlags {
            retroactive: page.contains(RETROACTIVE),
            cancellation: page.contains(CANCELLATION),
        };

        let wages = wage_lines(lines)?;

        let mut labour_market_allowance = Decimal::ZERO;
        let mut munich_allowance = Decimal::ZERO;
        let mut commuter_allowance = Decimal::ZERO;
        for allowance in &ALLOWANCES {
            let present = match allowance.scope {
                Scope::WageRegion => region_contains(&wages, allowance.field.marker),
                Scope::Page => page.contains(allowance.field.marker),
            };
            if !present {
                continue;
            }
            let value = parse_german_decimal(&allowance.field.extract(lines)?)?;
            match allowance.metric {
                PayrollMetric::LabourMarketAllowance => labour_market_allowance = value,
                PayrollMetric::MunichAllowance => munich_allowance = value,
                _ => commuter_allowance = value,
            }
        }

        let salary_group = if page.contains(SALARY_GROUP) {
            salary_group(first_line_containing(lines, SALARY_GROUP)?)?
        } else {
            "-".to_string()
        };

        let weekly_hours = weekly_hours(&WORKING_TIME.extract(lines)?)?;

        let tax_free_wages = wages
            .iter()
            .filter(|line| !line.ends_with(TAXABLE_SUFFIX))
            .map(|line| tax_free_amount(line))
            .sum::<Result<Decimal>>()?;

        let deferred = deferred_compensation(page, period)?;

        debug!(
            "Parsed payroll page {} for period {} (retroactive: {})",
            page.number, period, flags.retroactive
        );

        Ok(PayrollRecord {
            period,
            name,
            flags,
            labour_market_allowance,
            munich_allowance,
            commuter_allowance,
            tax_free: commuter_allowance + tax_free_wages + deferred,
            weekly_hours,
            salary_group,
        })
    }
}

/// Non-blank lines from two below the wage table header up to the gross
/// total line.
fn wage_lines(lines: &[String]) -> Result<Vec<&str>> {
    let start = first_index_containing(lines, WAGE_TABLE_HEADER)? + 2;
    let end = first_index_containing(lines, GROSS_TOTAL)?;

    Ok(lines
        .get(start..end)
        .unwrap_or_default()
        .iter()
        .map(String::as_str)
        .filter(|line| !line.trim().is_empty())
        .collect())
}

/// Amount of a wage line: the last token before the first " *".
fn tax_free_amount(line: &str) -> Result<Decimal> {
    let before_marker = line.split(" *").next().unwrap_or(line);
    let amount = before_marker.rsplit(' ').next().unwrap_or(before_marker);
    parse_german_decimal(amount)
}

/// Salary group and step from the TVöD line.
///
/// Groups of the social and educational service ("S") carry the step one
/// token further out than general groups.
fn salary_group(line: &str) -> Result<String> {
    let segment = line
        .split(BASE_PAY)
        .nth(2)
        .ok_or_else(|| ExtractionError::token(BASE_PAY, 2))?;
    let parts: Vec<&str> = segment.trim().split(' ').collect();
    let part = |index: usize| {
        parts
            .get(index)
            .copied()
            .ok_or_else(|| ExtractionError::token(SALARY_GROUP, index))
    };

    let discriminator = part(0)?;
    if discriminator == "S" {
        return Ok(format!("S{}/{}", part(1)?, part(3)?));
    }

    let mut chars = discriminator.chars();
    if let (Some(letter), None) = (chars.next(), chars.next()) {
        if letter.is_alphabetic() {
            return Err(ExtractionError::UnknownSalaryGroup {
                discriminator: discriminator.to_string(),
            });
        }
    }

    Ok(format!("{}/{}", discriminator, part(2)?))
}

/// Weekly hours from the working-time table row; unknown if the row holds
/// no pair of decimal numbers.
fn weekly_hours(row: &str) -> Result<Decimal> {
    let values = tokens_from(row, 1);
    match WEEKLY_HOURS.captures(&values) {
        Some(caps) => parse_german_decimal(&caps[1]),
        None => Ok(UNKNOWN_WEEKLY_HOURS),
    }
}

/// Untaxed deferred compensation, negated.
///
/// Zero once maternity protection has started: its start day is the first
/// of a month or its month precedes the record's month.
fn deferred_compensation(page: &RawPage, period: Period) -> Result<Decimal> {
    if !page.contains(DEFERRED_COMPENSATION.marker) {
        return Ok(Decimal::ZERO);
    }
    let amount = -parse_german_decimal(&DEFERRED_COMPENSATION.extract(&page.lines)?)?;

    if page.contains(MATERNITY_PAY) {
        let start = MATERNITY_PROTECTION.extract(&page.lines)?;
        let (day, month) = day_and_month(&start)?;
        if day == 1 || month < period.month {
            info!(
                "Maternity protection started {} so month {} has no untaxed deferred compensation",
                start, period.month
            );
            return Ok(Decimal::ZERO);
        }
    }

    Ok(amount)
}

/// Day and month of a `DD.MM.YYYY` date token.
fn day_and_month(date: &str) -> Result<(u32, u32)> {
    let invalid = || ExtractionError::Format {
        value: date.to_string(),
    };
    let mut fields = date.split('.');
    let day = fields.next().and_then(|d| d.parse().ok()).ok_or_else(invalid)?;
    let month = fields.next().and_then(|m| m.parse().ok()).ok_or_else(invalid)?;
    Ok((day, month))
}
