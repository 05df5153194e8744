//! Processing pipelines, one per document family.
//!
//! Every pipeline reads its documents strictly in the given order, parses
//! all of them before assembling a report and aborts on the first fatal
//! error. Recoverable conditions are logged and returned as warnings.

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::aggregate::{AggregationTable, MergeOutcome, MergePolicy};
use crate::error::{ExtractionError, LohnError, Result};
use crate::extract::anchor::lines_between;
use crate::extract::{
    JournalParser, LedgerParser, PageParser, PayrollParser, ReimbursementPage,
    ReimbursementParser,
};
use crate::models::{
    BurdenCategory, JournalMetric, LohnConfig, ParseWarning, ParsedRecord, PayrollMetric,
    PeriodKey, ReimbursementCategory,
};
use crate::report::{DelimitedReport, Report, ReportAssembler, Workbook};
use crate::text::{RawPage, TextExtractor, segment};

/// Raw bytes of one input document.
#[derive(Debug, Clone, Copy)]
pub struct SourceDocument<'a> {
    /// Name used in warnings and errors (usually the file name).
    pub name: &'a str,
    pub data: &'a [u8],
}

impl<'a> SourceDocument<'a> {
    pub fn new(name: &'a str, data: &'a [u8]) -> Self {
        Self { name, data }
    }
}

/// The four supported document families.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentFamily {
    /// Payroll slips (Gehaltsabrechnungen).
    Payroll,
    /// Employer reimbursement slips (AAG Erstattungen).
    Reimbursement,
    /// Employer burden ledger (AG Belastung).
    BurdenLedger,
    /// Payroll journal (Lohnjournal).
    PayrollJournal,
}

/// Report and warnings of a finished run.
#[derive(Debug, Clone, Serialize)]
pub struct RunOutput {
    pub report: Report,
    pub warnings: Vec<ParseWarning>,
}

/// Runs the pipelines with one configuration and one text extractor.
#[derive(Debug)]
pub struct Processor<'c, E> {
    config: &'c LohnConfig,
    extractor: E,
}

impl<'c, E: TextExtractor> Processor<'c, E> {
    pub fn new(config: &'c LohnConfig, extractor: E) -> Self {
        Self { config, extractor }
    }

    pub fn run(&self, family: DocumentFamily, documents: &[SourceDocument]) -> Result<RunOutput> {
        match family {
            DocumentFamily::Payroll => self.payroll(documents),
            DocumentFamily::Reimbursement => self.reimbursement(documents),
            DocumentFamily::BurdenLedger => self.burden_ledger(documents),
            DocumentFamily::PayrollJournal => self.payroll_journal(documents),
        }
    }

    /// One sheet per payroll metric, employees × months.
    pub fn payroll(&self, documents: &[SourceDocument]) -> Result<RunOutput> {
        let year = self.config.run.year;
        let parser = PayrollParser::new();
        let mut table = AggregationTable::new(MergePolicy::LastWriteWins);
        let mut warnings = Vec::new();

        for document in documents {
            for page in self.pages(document)? {
                let record = parser
                    .parse_page(&page)
                    .map_err(|source| page_error(document, &page, source))?;

                if record.period.year != year {
                    let warning = ParseWarning::PeriodSkipped {
                        document: document.name.to_string(),
                        page: page.number,
                        period: record.period.to_string(),
                        year,
                    };
                    info!("{} (retroactive: {})", warning, record.flags.retroactive);
                    warnings.push(warning);
                    continue;
                }

                let retroactive = record.flags.retroactive;
                let record = ParsedRecord::Payroll(record);
                for (metric, outcome) in table.fold(&record) {
                    if let MergeOutcome::Replaced { .. } = outcome {
                        let warning = ParseWarning::ValueChanged {
                            metric: metric.to_string(),
                            period: record.period().to_string(),
                            retroactive,
                        };
                        info!("{}", warning);
                        warnings.push(warning);
                    }
                }
            }
        }

        info!(
            "Creating {} payroll tables for {} periods and {} employees",
            PayrollMetric::ALL.len(),
            table.periods().count(),
            table.len()
        );

        let assembler = ReportAssembler::new(&self.config.report);
        let sheets = PayrollMetric::ALL
            .iter()
            .map(|metric| assembler.period_pivot(&table, metric.label()))
            .collect();

        Ok(RunOutput {
            report: Report::Workbook(Workbook { sheets }),
            warnings,
        })
    }

    /// U1 and U2 sections, employees × documents.
    pub fn reimbursement(&self, documents: &[SourceDocument]) -> Result<RunOutput> {
        let mut table = AggregationTable::new(MergePolicy::Sum);
        let mut warnings = Vec::new();
        let mut labels = Vec::with_capacity(documents.len());

        for (idx, document) in documents.iter().enumerate() {
            let label = format!("file_{}", idx + 1);
            info!("{} is labelled {}", document.name, label);
            let parser = ReimbursementParser::new(label.clone());

            for page in self.pages(document)? {
                let parsed = parser
                    .parse_page(&page)
                    .map_err(|source| page_error(document, &page, source))?;

                match parsed {
                    ReimbursementPage::Record(record) => {
                        table.fold(&ParsedRecord::Reimbursement(record));
                    }
                    ReimbursementPage::Retroactive => {}
                    ReimbursementPage::Unclassified { name } => {
                        let warning = ParseWarning::ClassificationAmbiguous {
                            document: document.name.to_string(),
                            page: page.number,
                            subject: name,
                        };
                        warn!("{}", warning);
                        warnings.push(warning);
                    }
                }
            }
            labels.push(label);
        }

        info!("Processed {} files", documents.len());

        let assembler = ReportAssembler::new(&self.config.report);
        let sections = ReimbursementCategory::ALL
            .iter()
            .map(|category| assembler.document_section(&table, category.label(), &labels))
            .collect();

        Ok(RunOutput {
            report: Report::Delimited(DelimitedReport { sections }),
            warnings,
        })
    }

    /// One sheet of monthly and year-to-date employer burden per employee.
    pub fn burden_ledger(&self, documents: &[SourceDocument]) -> Result<RunOutput> {
        let ledger = &self.config.ledger;
        let metrics = BurdenCategory::column_labels();
        let period = PeriodKey::Whole.to_string();
        let mut table = AggregationTable::new(MergePolicy::Sum);
        let mut warnings = Vec::new();

        for document in documents {
            let lines = self.body_lines(document, &ledger.header_end, &ledger.footer_start)?;
            debug!("{} has {} ledger lines", document.name, lines.len());

            let blocks = LedgerParser::parse(&lines).map_err(|source| LohnError::Ledger {
                document: document.name.to_string(),
                source,
            })?;

            for block in blocks {
                if !table.seed(&block.subject, &period, &metrics) {
                    let warning = ParseWarning::DuplicateSubject {
                        document: document.name.to_string(),
                        subject: block.subject.clone(),
                    };
                    warn!("{}", warning);
                    warnings.push(warning);
                }
                for line in block.contributions {
                    table.fold(&ParsedRecord::Burden(line));
                }
            }
        }

        info!("Finished reading {} employees", table.len());

        let title = match &self.config.run.month {
            Some(month) => format!("{} {} {}", ledger.title, month, self.config.run.year),
            None => format!("{} {}", ledger.title, self.config.run.year),
        };
        let sheet = ReportAssembler::new(&self.config.report).metric_grid(
            &table,
            &period,
            &ledger.title,
            &title,
            &metrics,
        );

        Ok(RunOutput {
            report: Report::Workbook(Workbook {
                sheets: vec![sheet],
            }),
            warnings,
        })
    }

    /// One sheet of tax gross, gross total and employer social security.
    pub fn payroll_journal(&self, documents: &[SourceDocument]) -> Result<RunOutput> {
        let journal = &self.config.journal;
        let parser = JournalParser::new(journal.subtotal_marker.as_str());
        let metrics: Vec<&str> = JournalMetric::ALL.iter().map(|m| m.label()).collect();
        let mut table = AggregationTable::new(MergePolicy::Sum);
        let mut warnings = Vec::new();

        for document in documents {
            let lines = self.body_lines(document, &journal.header_end, &journal.footer_start)?;
            let entries = parser.parse(&lines).map_err(|source| LohnError::Journal {
                document: document.name.to_string(),
                source,
            })?;

            for entry in entries {
                if entry.amounts.is_none() {
                    let warning = ParseWarning::MalformedRecord {
                        document: document.name.to_string(),
                        subject: entry.name.clone(),
                    };
                    warn!("{}", warning);
                    warnings.push(warning);
                }
                if table.contains(&entry.name) {
                    let warning = ParseWarning::DuplicateSubject {
                        document: document.name.to_string(),
                        subject: entry.name.clone(),
                    };
                    warn!("{}", warning);
                    warnings.push(warning);
                }
                table.fold(&ParsedRecord::Journal(entry));
            }
        }

        info!("Finished processing {} journal records", table.len());

        let sheet = ReportAssembler::new(&self.config.report).metric_grid(
            &table,
            &PeriodKey::Whole.to_string(),
            &journal.title,
            &journal.title,
            &metrics,
        );

        Ok(RunOutput {
            report: Report::Workbook(Workbook {
                sheets: vec![sheet],
            }),
            warnings,
        })
    }

    /// Extract and segment one document.
    fn pages(&self, document: &SourceDocument) -> Result<Vec<RawPage>> {
        info!("Reading {}", document.name);
        let text = self.extractor.extract(document.data)?;
        segment(&text).map_err(|source| LohnError::Segment {
            document: document.name.to_string(),
            source,
        })
    }

    /// Lines between header and footer of every page, in page order.
    fn body_lines(
        &self,
        document: &SourceDocument,
        header_end: &str,
        footer_start: &str,
    ) -> Result<Vec<String>> {
        let mut lines = Vec::new();
        for page in self.pages(document)? {
            let body = lines_between(&page.lines, header_end, footer_start)
                .map_err(|source| page_error(document, &page, source))?;
            lines.extend(body.into_iter().map(str::to_string));
        }
        Ok(lines)
    }
}

fn page_error(document: &SourceDocument, page: &RawPage, source: ExtractionError) -> LohnError {
    LohnError::Page {
        document: document.name.to_string(),
        page: page.number,
        source,
    }
}
