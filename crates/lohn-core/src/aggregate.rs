//! Employee × period × metric aggregation.

use indexmap::{IndexMap, IndexSet};
use serde::Serialize;
use tracing::trace;

use crate::models::{Cell, ParsedRecord};

/// How a second observation of the same (subject, period, metric) is merged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MergePolicy {
    /// The most recent observation replaces the stored one.
    LastWriteWins,
    /// Observations are added.
    Sum,
}

/// What an insert did to the stored value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MergeOutcome {
    /// First observation for the key.
    Inserted,
    /// Same value observed again.
    Unchanged,
    /// A different value replaced the stored one.
    Replaced { previous: Cell },
    /// The value was added to the stored one.
    Summed,
}

type MetricValues = IndexMap<String, Cell>;

/// Values keyed by subject, then period, then metric.
///
/// Subjects and periods keep their first-insertion order. Totals are
/// computed from the stored values on every call.
#[derive(Debug, Clone, Serialize)]
pub struct AggregationTable {
    policy: MergePolicy,
    periods: IndexSet<String>,
    subjects: IndexMap<String, IndexMap<String, MetricValues>>,
}

impl AggregationTable {
    pub fn new(policy: MergePolicy) -> Self {
        Self {
            policy,
            periods: IndexSet::new(),
            subjects: IndexMap::new(),
        }
    }

    /// Store one observation according to the merge policy.
    pub fn insert(&mut self, subject: &str, period: &str, metric: &str, value: Cell) -> MergeOutcome {
        self.periods.insert(period.to_string());
        let metrics = self
            .subjects
            .entry(subject.to_string())
            .or_default()
            .entry(period.to_string())
            .or_default();

        let Some(stored) = metrics.get_mut(metric) else {
            metrics.insert(metric.to_string(), value);
            return MergeOutcome::Inserted;
        };

        match self.policy {
            MergePolicy::Sum => {
                *stored = stored.sum(&value);
                MergeOutcome::Summed
            }
            MergePolicy::LastWriteWins if *stored == value => MergeOutcome::Unchanged,
            MergePolicy::LastWriteWins => MergeOutcome::Replaced {
                previous: std::mem::replace(stored, value),
            },
        }
    }

    /// Store every metric of a parsed record.
    pub fn fold(&mut self, record: &ParsedRecord) -> Vec<(&'static str, MergeOutcome)> {
        let period = record.period().to_string();
        trace!("Folding record into period {}", period);

        record
            .metrics()
            .into_iter()
            .map(|(metric, value)| {
                let outcome = self.insert(record.subject(), &period, metric, value);
                (metric, outcome)
            })
            .collect()
    }

    /// Start a subject with zero values for `metrics`.
    ///
    /// Returns false and leaves the table untouched if the subject exists.
    pub fn seed(&mut self, subject: &str, period: &str, metrics: &[&str]) -> bool {
        if self.contains(subject) {
            return false;
        }
        for metric in metrics {
            self.insert(subject, period, metric, Cell::zero());
        }
        true
    }

    pub fn contains(&self, subject: &str) -> bool {
        self.subjects.contains_key(subject)
    }

    pub(crate) fn len(&self) -> usize {
        self.subjects.len()
    }

    pub fn subjects(&self) -> impl Iterator<Item = &str> {
        self.subjects.keys().map(String::as_str)
    }

    pub fn periods(&self) -> impl Iterator<Item = &str> {
        self.periods.iter().map(String::as_str)
    }

    pub fn get(&self, subject: &str, period: &str, metric: &str) -> Option<&Cell> {
        self.subjects.get(subject)?.get(period)?.get(metric)
    }

    /// Whether the subject has a value for `metric` in any period.
    pub fn has_metric(&self, subject: &str, metric: &str) -> bool {
        self.subjects
            .get(subject)
            .is_some_and(|periods| periods.values().any(|m| m.contains_key(metric)))
    }

    /// Sum of a subject's values for `metric` over all periods.
    pub fn subject_total(&self, subject: &str, metric: &str) -> Cell {
        self.subjects
            .get(subject)
            .into_iter()
            .flat_map(|periods| periods.values())
            .filter_map(|metrics| metrics.get(metric))
            .fold(Cell::zero(), |total, cell| total.sum(cell))
    }

    /// Sum of all subjects' values for (`period`, `metric`); absent cells
    /// count as zero.
    pub fn column_total(&self, period: &str, metric: &str) -> Cell {
        self.subjects()
            .filter_map(|subject| self.get(subject, period, metric))
            .fold(Cell::zero(), |total, cell| total.sum(cell))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{
        CorrectionFlags, JournalAmounts, JournalEntry, ReimbursementKind, ReimbursementRecord,
    };
    use pretty_assertions::assert_eq;
    use rust_decimal::Decimal;
    use std::str::FromStr;

    fn amount(s: &str) -> Cell {
        Cell::Amount(Decimal::from_str(s).unwrap())
    }

    fn journal(name: &str, gross_total: &str) -> ParsedRecord {
        ParsedRecord::Journal(JournalEntry {
            personnel_code: "004711".into(),
            name: name.into(),
            amounts: Some(JournalAmounts {
                tax_gross: Decimal::ZERO,
                gross_total: Decimal::from_str(gross_total).unwrap(),
                employer_social_security: Decimal::ZERO,
            }),
        })
    }

    fn reimbursement(document: &str, amount: &str) -> ParsedRecord {
        ParsedRecord::Reimbursement(ReimbursementRecord {
            name: "Anna Muster".into(),
            document: document.into(),
            kind: ReimbursementKind::Incapacity,
            flags: CorrectionFlags::default(),
            amount: Decimal::from_str(amount).unwrap(),
        })
    }

    #[test]
    fn test_last_write_wins() {
        let mut table = AggregationTable::new(MergePolicy::LastWriteWins);
        assert_eq!(
            table.insert("Anna", "03.2024", "Münchenzulage", amount("100")),
            MergeOutcome::Inserted
        );
        assert_eq!(
            table.insert("Anna", "03.2024", "Münchenzulage", amount("100.00")),
            MergeOutcome::Unchanged
        );
        assert_eq!(
            table.insert("Anna", "03.2024", "Münchenzulage", amount("120")),
            MergeOutcome::Replaced {
                previous: amount("100")
            }
        );
        assert_eq!(
            table.get("Anna", "03.2024", "Münchenzulage"),
            Some(&amount("120"))
        );
    }

    #[test]
    fn test_journal_duplicate_subject_sums() {
        let mut table = AggregationTable::new(MergePolicy::Sum);
        table.fold(&journal("Muster, Anna", "1000.00"));
        let outcomes = table.fold(&journal("Muster, Anna", "500.50"));

        assert!(outcomes.iter().all(|(_, o)| *o == MergeOutcome::Summed));
        let total = table.get("Muster, Anna", "Gesamt", "Gesamtbrutto").unwrap();
        assert_eq!(total.to_string(), "1500,50");
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn test_unknown_absorbs_sum() {
        let mut table = AggregationTable::new(MergePolicy::Sum);
        table.insert("Anna", "Gesamt", "Steuerbrutto", amount("10"));
        table.insert("Anna", "Gesamt", "Steuerbrutto", Cell::Unknown);
        table.insert("Bernd", "Gesamt", "Steuerbrutto", amount("5"));

        assert_eq!(table.get("Anna", "Gesamt", "Steuerbrutto"), Some(&Cell::Unknown));
        assert_eq!(table.column_total("Gesamt", "Steuerbrutto"), Cell::Unknown);
    }

    #[test]
    fn test_cancellation_nets_to_zero() {
        let mut table = AggregationTable::new(MergePolicy::Sum);
        table.fold(&reimbursement("file_1", "100.00"));
        table.fold(&reimbursement("file_2", "-100.00"));

        assert_eq!(table.subject_total("Anna Muster", "U1").to_string(), "0,00");
        assert!(table.has_metric("Anna Muster", "U1"));
        assert!(!table.has_metric("Anna Muster", "U2"));
        assert_eq!(table.periods().collect::<Vec<_>>(), vec!["file_1", "file_2"]);
    }

    #[test]
    fn test_insertion_order_and_totals() {
        let mut table = AggregationTable::new(MergePolicy::LastWriteWins);
        table.insert("Zora", "02.2024", "m", amount("1"));
        table.insert("Anna", "01.2024", "m", amount("2"));
        table.insert("Zora", "01.2024", "m", amount("3"));

        assert_eq!(table.subjects().collect::<Vec<_>>(), vec!["Zora", "Anna"]);
        assert_eq!(table.periods().collect::<Vec<_>>(), vec!["02.2024", "01.2024"]);
        assert_eq!(table.subject_total("Zora", "m"), amount("4"));
        assert_eq!(table.column_total("01.2024", "m"), amount("5"));
        assert_eq!(table.subject_total("Nobody", "m"), Cell::zero());
    }

    #[test]
    fn test_seed_only_new_subjects() {
        let mut table = AggregationTable::new(MergePolicy::Sum);
        assert!(table.seed("Anna", "Gesamt", &["a", "b"]));
        assert_eq!(table.get("Anna", "Gesamt", "b"), Some(&Cell::zero()));
        assert!(!table.seed("Anna", "Gesamt", &["a", "b"]));
    }
}
