//! Report layouts handed to the output writers.
//!
//! Payroll, burden-ledger and journal runs produce a [`Workbook`] of sheets
//! with a title cell, a header row and an indexed first column.
//! Reimbursement runs produce a [`DelimitedReport`] of titled sections.

use serde::Serialize;

use crate::aggregate::AggregationTable;
use crate::models::{Cell, ReportConfig};

/// Value written for a missing reimbursement cell.
const MISSING_CELL: &str = "0";

/// One table row: the index label and its cells.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Row {
    pub label: String,
    pub cells: Vec<Cell>,
}

/// A named sheet.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Sheet {
    pub name: String,
    /// Written alone into the first row.
    pub title: String,
    /// Column headers, without the index column.
    pub columns: Vec<String>,
    pub rows: Vec<Row>,
    /// Width of the index column.
    pub index_width: u16,
    /// Width of every value column, if fixed.
    pub value_width: Option<u16>,
}

impl Sheet {
    /// Positional layout: title row, blank row, header row with an empty
    /// index header, then the data rows.
    pub fn grid(&self) -> Vec<Vec<String>> {
        let mut grid = Vec::with_capacity(self.rows.len() + 3);
        grid.push(vec![self.title.clone()]);
        grid.push(Vec::new());

        let mut header = vec![String::new()];
        header.extend(self.columns.iter().cloned());
        grid.push(header);

        for row in &self.rows {
            let mut cells = vec![row.label.clone()];
            cells.extend(row.cells.iter().map(Cell::to_string));
            grid.push(cells);
        }
        grid
    }

    pub fn column(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    pub fn row(&self, label: &str) -> Option<&Row> {
        self.rows.iter().find(|r| r.label == label)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Workbook {
    pub sheets: Vec<Sheet>,
}

impl Workbook {
    pub fn sheet(&self, name: &str) -> Option<&Sheet> {
        self.sheets.iter().find(|s| s.name == name)
    }
}

/// A titled block of a delimited report.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Section {
    pub title: String,
    pub header: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DelimitedReport {
    pub sections: Vec<Section>,
}

impl DelimitedReport {
    /// All records in output order, sections separated by an empty record.
    pub fn records(&self) -> Vec<Vec<String>> {
        let mut records = Vec::new();
        for (idx, section) in self.sections.iter().enumerate() {
            if idx > 0 {
                records.push(Vec::new());
            }
            records.push(vec![section.title.clone()]);
            records.push(section.header.clone());
            records.extend(section.rows.iter().cloned());
        }
        records
    }
}

/// An assembled report.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Report {
    Workbook(Workbook),
    Delimited(DelimitedReport),
}

/// Shapes aggregation tables into report layouts.
#[derive(Debug, Clone, Copy)]
pub struct ReportAssembler<'a> {
    config: &'a ReportConfig,
}

impl<'a> ReportAssembler<'a> {
    pub fn new(config: &'a ReportConfig) -> Self {
        Self { config }
    }

    /// Subjects × periods for one metric.
    ///
    /// Missing cells are zero. A total column is appended only when every
    /// cell is numeric.
    pub fn period_pivot(&self, table: &AggregationTable, metric: &str) -> Sheet {
        let periods: Vec<&str> = table.periods().collect();

        let mut rows: Vec<Row> = table
            .subjects()
            .map(|subject| Row {
                label: subject.to_string(),
                cells: periods
                    .iter()
                    .map(|period| {
                        table
                            .get(subject, period, metric)
                            .cloned()
                            .unwrap_or_else(Cell::zero)
                    })
                    .collect(),
            })
            .collect();

        let mut columns: Vec<String> = periods.iter().map(|p| p.to_string()).collect();
        let numeric = rows.iter().all(|row| row.cells.iter().all(Cell::is_numeric));
        if numeric {
            columns.push(self.config.total_label.clone());
            for row in &mut rows {
                let total = row.cells.iter().fold(Cell::zero(), |acc, c| acc.sum(c));
                row.cells.push(total);
            }
        }

        Sheet {
            name: metric.to_string(),
            title: metric.to_string(),
            columns,
            rows,
            index_width: self.config.index_width,
            value_width: None,
        }
    }

    /// Subjects × metrics of one period, followed by a totals row.
    pub fn metric_grid(
        &self,
        table: &AggregationTable,
        period: &str,
        name: &str,
        title: &str,
        metrics: &[&str],
    ) -> Sheet {
        let mut rows: Vec<Row> = table
            .subjects()
            .map(|subject| Row {
                label: subject.to_string(),
                cells: metrics
                    .iter()
                    .map(|metric| {
                        table
                            .get(subject, period, metric)
                            .cloned()
                            .unwrap_or_else(Cell::zero)
                    })
                    .collect(),
            })
            .collect();

        rows.push(Row {
            label: self.config.total_label.clone(),
            cells: metrics
                .iter()
                .map(|metric| table.column_total(period, metric))
                .collect(),
        });

        Sheet {
            name: name.to_string(),
            title: title.to_string(),
            columns: metrics.iter().map(|m| m.to_string()).collect(),
            rows,
            index_width: self.config.index_width,
            value_width: Some(self.config.value_width),
        }
    }

    /// Subjects carrying `metric` × documents, with a per-subject total.
    pub fn document_section(
        &self,
        table: &AggregationTable,
        metric: &str,
        documents: &[String],
    ) -> Section {
        let mut header = vec!["Name".to_string()];
        header.extend(documents.iter().cloned());
        header.push(self.config.total_label.clone());

        let rows = table
            .subjects()
            .filter(|subject| table.has_metric(subject, metric))
            .map(|subject| {
                let mut row = vec![subject.to_string()];
                row.extend(documents.iter().map(|document| {
                    table
                        .get(subject, document, metric)
                        .map_or_else(|| MISSING_CELL.to_string(), Cell::to_string)
                }));
                row.push(table.subject_total(subject, metric).to_string());
                row
            })
            .collect();

        Section {
            title: metric.to_string(),
            header,
            rows,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::MergePolicy;
    use pretty_assertions::assert_eq;
    use rust_decimal::Decimal;

    fn amount(units: i64) -> Cell {
        Cell::Amount(Decimal::new(units, 0))
    }

    #[test]
    fn test_period_pivot_with_total() {
        let config = ReportConfig::default();
        let mut table = AggregationTable::new(MergePolicy::LastWriteWins);
        table.insert("Anna", "01.2024", "Münchenzulage", amount(120));
        table.insert("Bernd", "02.2024", "Münchenzulage", amount(60));
        table.insert("Anna", "02.2024", "Münchenzulage", amount(120));

        let sheet = ReportAssembler::new(&config).period_pivot(&table, "Münchenzulage");

        assert_eq!(sheet.columns, vec!["01.2024", "02.2024", "Summe"]);
        assert_eq!(
            sheet.grid(),
            vec![
                vec!["Münchenzulage".to_string()],
                vec![],
                vec!["".into(), "01.2024".into(), "02.2024".into(), "Summe".into()],
                vec!["Anna".into(), "120,00".into(), "120,00".into(), "240,00".into()],
                vec!["Bernd".into(), "0,00".into(), "60,00".into(), "60,00".into()],
            ]
        );
        assert_eq!(sheet.index_width, 30);
    }

    #[test]
    fn test_period_pivot_text_has_no_total() {
        let config = ReportConfig::default();
        let mut table = AggregationTable::new(MergePolicy::LastWriteWins);
        table.insert("Anna", "01.2024", "Gehaltsgruppe-Stufe", Cell::Text("S11b/4".into()));

        let sheet = ReportAssembler::new(&config).period_pivot(&table, "Gehaltsgruppe-Stufe");
        assert_eq!(sheet.columns, vec!["01.2024"]);
        assert_eq!(sheet.rows[0].cells, vec![Cell::Text("S11b/4".into())]);
    }

    #[test]
    fn test_metric_grid_totals_row() {
        let config = ReportConfig::default();
        let mut table = AggregationTable::new(MergePolicy::Sum);
        table.insert("Anna", "Gesamt", "a", amount(1));
        table.insert("Anna", "Gesamt", "b", Cell::Unknown);
        table.insert("Bernd", "Gesamt", "a", amount(2));

        let sheet =
            ReportAssembler::new(&config).metric_grid(&table, "Gesamt", "T", "T 2024", &["a", "b"]);

        assert_eq!(sheet.value_width, Some(15));
        assert_eq!(sheet.rows[1].cells, vec![amount(2), Cell::zero()]);
        let totals = sheet.row("Summe").unwrap();
        assert_eq!(totals.cells, vec![amount(3), Cell::Unknown]);
    }

    #[test]
    fn test_document_section() {
        let config = ReportConfig::default();
        let mut table = AggregationTable::new(MergePolicy::Sum);
        table.insert("Anna", "file_2", "U1", amount(100));
        table.insert("Bernd", "file_1", "U2", amount(5));
        let documents = vec!["file_1".to_string(), "file_2".to_string()];

        let report = DelimitedReport {
            sections: vec![
                ReportAssembler::new(&config).document_section(&table, "U1", &documents),
                ReportAssembler::new(&config).document_section(&table, "U2", &documents),
            ],
        };

        let records = report.records();
        assert_eq!(records[0], vec!["U1"]);
        assert_eq!(records[1], vec!["Name", "file_1", "file_2", "Summe"]);
        assert_eq!(records[2], vec!["Anna", "0", "100,00", "100,00"]);
        assert!(records[3].is_empty());
        assert_eq!(records[4], vec!["U2"]);
        assert_eq!(records[6], vec!["Bernd", "5,00", "0", "5,00"]);
        assert_eq!(records.len(), 7);
    }
}
