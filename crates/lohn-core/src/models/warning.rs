//! Recoverable conditions reported alongside a finished run.

use serde::Serialize;
use thiserror::Error;

/// A condition that was logged and skipped without aborting the run.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ParseWarning {
    /// Reimbursement page matches neither the U1 nor the U2 marker.
    #[error("{document}, page {page}: page type for {subject} is neither U1 nor U2, page skipped")]
    ClassificationAmbiguous {
        document: String,
        page: usize,
        subject: String,
    },

    /// Journal record lookahead failed; the subject's values are unknown.
    #[error("{document}: unexpected record format for {subject}, values marked unknown")]
    MalformedRecord { document: String, subject: String },

    /// The same subject occurs in more than one block; values were summed.
    #[error("{document}: {subject} appears more than once, values summed")]
    DuplicateSubject { document: String, subject: String },

    /// A later observation replaced a different earlier value.
    #[error("changed {metric} for employee in period {period} (retroactive: {retroactive})")]
    ValueChanged {
        metric: String,
        period: String,
        retroactive: bool,
    },

    /// A payroll page belongs to another year than the target year.
    #[error("{document}, page {page}: period {period} is not in target year {year}, page skipped")]
    PeriodSkipped {
        document: String,
        page: usize,
        period: String,
        year: i32,
    },
}
