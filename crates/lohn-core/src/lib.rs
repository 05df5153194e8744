//! Core library for German payroll document evaluation.
//!
//! This crate provides:
//! - Text extraction boundary and page segmentation with page-count crosscheck
//! - Anchor-based field extraction for payroll slips, reimbursement slips,
//!   the employer burden ledger and the payroll journal
//! - Employee × period aggregation with merge policies and totals
//! - Report assembly into sheets and delimited sections

pub mod aggregate;
pub mod error;
pub mod extract;
pub mod models;
pub mod pipeline;
pub mod report;
pub mod text;

pub use aggregate::{AggregationTable, MergeOutcome, MergePolicy};
pub use error::{ExtractionError, LohnError, Result, SegmentError, TextError};
pub use models::{Cell, LohnConfig, ParseWarning, ParsedRecord};
pub use pipeline::{DocumentFamily, Processor, RunOutput, SourceDocument};
pub use report::{DelimitedReport, Report, ReportAssembler, Section, Sheet, Workbook};
pub use text::{AutoExtractor, ExtractedText, RawPage, TextExtractor, XhtmlExtractor};

#[cfg(feature = "native")]
pub use text::PdfTextExtractor;
