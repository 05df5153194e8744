//! Structured records produced by the page and ledger parsers.

use std::fmt;

use rust_decimal::Decimal;
use serde::Serialize;

use super::cell::Cell;
use crate::error::ExtractionError;

/// A payroll month, parsed from a `MM.YYYY` token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct Period {
    /// Month (1-12).
    pub month: u32,
    pub year: i32,
}

impl Period {
    /// Parse a `MM.YYYY` token such as "03.2024".
    pub fn parse(token: &str) -> Result<Self, ExtractionError> {
        let invalid = || ExtractionError::InvalidPeriod {
            value: token.to_string(),
        };

        let (month, year) = token.trim().split_once('.').ok_or_else(invalid)?;
        let month: u32 = month.parse().map_err(|_| invalid())?;
        let year: i32 = year.parse().map_err(|_| invalid())?;

        // validates the month number
        chrono::Month::try_from(u8::try_from(month).map_err(|_| invalid())?)
            .map_err(|_| invalid())?;

        Ok(Self { month, year })
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}.{}", self.month, self.year)
    }
}

/// The period an observation belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PeriodKey {
    /// A payroll month.
    Month(Period),
    /// A source document (reimbursement runs compare documents).
    Document(String),
    /// The whole run (ledger and journal documents cover one period).
    Whole,
}

impl fmt::Display for PeriodKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PeriodKey::Month(period) => period.fmt(f),
            PeriodKey::Document(name) => f.write_str(name),
            PeriodKey::Whole => f.write_str("Gesamt"),
        }
    }
}

/// Correction markers carried by payroll and reimbursement pages.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CorrectionFlags {
    /// The page is a retroactive recalculation of a prior period.
    pub retroactive: bool,
    /// The page reverses an earlier observation.
    pub cancellation: bool,
}

/// Payroll metrics, one report sheet each.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum PayrollMetric {
    LabourMarketAllowance,
    MunichAllowance,
    CommuterAllowance,
    TaxFree,
    WeeklyHours,
    SalaryGroup,
}

impl PayrollMetric {
    pub const ALL: [PayrollMetric; 6] = [
        PayrollMetric::LabourMarketAllowance,
        PayrollMetric::MunichAllowance,
        PayrollMetric::CommuterAllowance,
        PayrollMetric::TaxFree,
        PayrollMetric::WeeklyHours,
        PayrollMetric::SalaryGroup,
    ];

    /// Sheet name and metric key.
    pub fn label(self) -> &'static str {
        match self {
            PayrollMetric::LabourMarketAllowance => "Arbeitsmarktzulage",
            PayrollMetric::MunichAllowance => "Münchenzulage",
            PayrollMetric::CommuterAllowance => "Fahrtkostenzuschuss",
            PayrollMetric::TaxFree => "Steuerfrei (inkl. FKZ)",
            PayrollMetric::WeeklyHours => "Wochenarbeitszeit",
            PayrollMetric::SalaryGroup => "Gehaltsgruppe-Stufe",
        }
    }
}

/// Weekly hours value used when the working-time table has no figure.
pub const UNKNOWN_WEEKLY_HOURS: Decimal = Decimal::NEGATIVE_ONE;

/// One payroll slip page.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PayrollRecord {
    pub period: Period,
    /// Employee full name.
    pub name: String,
    pub flags: CorrectionFlags,
    pub labour_market_allowance: Decimal,
    pub munich_allowance: Decimal,
    pub commuter_allowance: Decimal,
    /// Commuter allowance plus tax-free wage lines plus deferred compensation.
    pub tax_free: Decimal,
    /// Weekly working hours, [`UNKNOWN_WEEKLY_HOURS`] if not found.
    pub weekly_hours: Decimal,
    /// Salary group and step (e.g. "S11b/4"), "-" without a TVöD line.
    pub salary_group: String,
}

impl PayrollRecord {
    pub fn value(&self, metric: PayrollMetric) -> Cell {
        match metric {
            PayrollMetric::LabourMarketAllowance => self.labour_market_allowance.into(),
            PayrollMetric::MunichAllowance => self.munich_allowance.into(),
            PayrollMetric::CommuterAllowance => self.commuter_allowance.into(),
            PayrollMetric::TaxFree => self.tax_free.into(),
            PayrollMetric::WeeklyHours => self.weekly_hours.into(),
            PayrollMetric::SalaryGroup => Cell::Text(self.salary_group.clone()),
        }
    }
}

/// Reimbursement category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ReimbursementCategory {
    /// Sick-pay reimbursement.
    U1,
    /// Maternity / protected-leave reimbursement.
    U2,
}

impl ReimbursementCategory {
    pub const ALL: [ReimbursementCategory; 2] =
        [ReimbursementCategory::U1, ReimbursementCategory::U2];

    pub fn label(self) -> &'static str {
        match self {
            ReimbursementCategory::U1 => "U1",
            ReimbursementCategory::U2 => "U2",
        }
    }
}

/// Page type of a reimbursement slip.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ReimbursementKind {
    /// "Arbeitsunfähigkeit - U1".
    Incapacity,
    /// "Mutterschaft - U2".
    Maternity,
    /// "Beschäftigungsverbot - U2".
    EmploymentBan,
}

impl ReimbursementKind {
    pub fn category(self) -> ReimbursementCategory {
        match self {
            ReimbursementKind::Incapacity => ReimbursementCategory::U1,
            ReimbursementKind::Maternity | ReimbursementKind::EmploymentBan => {
                ReimbursementCategory::U2
            }
        }
    }
}

/// One reimbursement slip page.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReimbursementRecord {
    /// "Vorname Nachname".
    pub name: String,
    /// Label of the source document.
    pub document: String,
    pub kind: ReimbursementKind,
    pub flags: CorrectionFlags,
    /// Reimbursed amount, negated for cancellations.
    pub amount: Decimal,
}

/// Ledger contribution categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum BurdenCategory {
    GrossPay,
    EmployerSocialSecurity,
    U1,
    U2,
}

impl BurdenCategory {
    pub const ALL: [BurdenCategory; 4] = [
        BurdenCategory::GrossPay,
        BurdenCategory::EmployerSocialSecurity,
        BurdenCategory::U1,
        BurdenCategory::U2,
    ];

    pub fn monthly_label(self) -> &'static str {
        match self {
            BurdenCategory::GrossPay => "Brutto (Monat)",
            BurdenCategory::EmployerSocialSecurity => "SV-AG (Monat)",
            BurdenCategory::U1 => "U1 (Monat)",
            BurdenCategory::U2 => "U2 (Monat)",
        }
    }

    pub fn total_label(self) -> &'static str {
        match self {
            BurdenCategory::GrossPay => "Brutto (Gesamt)",
            BurdenCategory::EmployerSocialSecurity => "SV-AG (Gesamt)",
            BurdenCategory::U1 => "U1 (Gesamt)",
            BurdenCategory::U2 => "U2 (Gesamt)",
        }
    }

    /// Reimbursements reduce the employer burden.
    pub fn sign(self) -> Decimal {
        match self {
            BurdenCategory::GrossPay | BurdenCategory::EmployerSocialSecurity => Decimal::ONE,
            BurdenCategory::U1 | BurdenCategory::U2 => Decimal::NEGATIVE_ONE,
        }
    }

    /// Report column order: all monthly metrics, then all totals.
    pub fn column_labels() -> Vec<&'static str> {
        Self::ALL
            .iter()
            .map(|c| c.monthly_label())
            .chain(Self::ALL.iter().map(|c| c.total_label()))
            .collect()
    }
}

/// One contribution of a ledger line (or a line merged with its
/// retroactive follow-up) to an employee block.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BurdenLine {
    pub subject: String,
    pub category: BurdenCategory,
    /// Signed monthly contribution.
    pub monthly: Decimal,
    /// Signed year-to-date contribution.
    pub total: Decimal,
    /// Index of the ledger line that produced this contribution.
    pub line: usize,
}

/// Payroll journal metrics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum JournalMetric {
    TaxGross,
    GrossTotal,
    EmployerSocialSecurity,
}

impl JournalMetric {
    pub const ALL: [JournalMetric; 3] = [
        JournalMetric::TaxGross,
        JournalMetric::GrossTotal,
        JournalMetric::EmployerSocialSecurity,
    ];

    pub fn label(self) -> &'static str {
        match self {
            JournalMetric::TaxGross => "Steuerbrutto",
            JournalMetric::GrossTotal => "Gesamtbrutto",
            JournalMetric::EmployerSocialSecurity => "SV-AG Anteil",
        }
    }
}

/// Amounts of a well-formed journal record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct JournalAmounts {
    pub tax_gross: Decimal,
    pub gross_total: Decimal,
    pub employer_social_security: Decimal,
}

/// One payroll journal record.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct JournalEntry {
    /// Six-digit personnel code.
    pub personnel_code: String,
    pub name: String,
    /// `None` when the record layout was not as expected.
    pub amounts: Option<JournalAmounts>,
}

impl JournalEntry {
    pub fn value(&self, metric: JournalMetric) -> Cell {
        let Some(amounts) = &self.amounts else {
            return Cell::Unknown;
        };
        match metric {
            JournalMetric::TaxGross => amounts.tax_gross.into(),
            JournalMetric::GrossTotal => amounts.gross_total.into(),
            JournalMetric::EmployerSocialSecurity => amounts.employer_social_security.into(),
        }
    }
}

/// A parsed record of any document family.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "family", rename_all = "snake_case")]
pub enum ParsedRecord {
    Payroll(PayrollRecord),
    Reimbursement(ReimbursementRecord),
    Burden(BurdenLine),
    Journal(JournalEntry),
}

impl ParsedRecord {
    /// Employee name the record belongs to.
    pub fn subject(&self) -> &str {
        match self {
            ParsedRecord::Payroll(r) => &r.name,
            ParsedRecord::Reimbursement(r) => &r.name,
            ParsedRecord::Burden(r) => &r.subject,
            ParsedRecord::Journal(r) => &r.name,
        }
    }

    pub fn period(&self) -> PeriodKey {
        match self {
            ParsedRecord::Payroll(r) => PeriodKey::Month(r.period),
            ParsedRecord::Reimbursement(r) => PeriodKey::Document(r.document.clone()),
            ParsedRecord::Burden(_) | ParsedRecord::Journal(_) => PeriodKey::Whole,
        }
    }

    /// Named metric values carried by the record.
    pub fn metrics(&self) -> Vec<(&'static str, Cell)> {
        match self {
            ParsedRecord::Payroll(r) => PayrollMetric::ALL
                .iter()
                .map(|m| (m.label(), r.value(*m)))
                .collect(),
            ParsedRecord::Reimbursement(r) => {
                vec![(r.kind.category().label(), r.amount.into())]
            }
            ParsedRecord::Burden(r) => vec![
                (r.category.monthly_label(), r.monthly.into()),
                (r.category.total_label(), r.total.into()),
            ],
            ParsedRecord::Journal(r) => JournalMetric::ALL
                .iter()
                .map(|m| (m.label(), r.value(*m)))
                .collect(),
        }
    }
}
