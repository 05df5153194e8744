//! Rendering of run output to delimited text or JSON.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use csv::WriterBuilder;
use tracing::debug;

use lohn_core::{Report, RunOutput, Sheet};

const DELIMITER: u8 = b';';
const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    /// Semicolon-delimited text, one file per sheet
    Csv,
    /// JSON with report and warnings
    Json,
}

/// Write the run output and return the files written.
///
/// Without a target the output goes to stdout. A workbook with more than
/// one sheet needs a directory target and gets one file per sheet.
pub fn write(
    output: &RunOutput,
    format: OutputFormat,
    target: Option<&Path>,
) -> anyhow::Result<Vec<PathBuf>> {
    match format {
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(output)?;
            match target {
                Some(path) => {
                    fs::write(path, json)?;
                    Ok(vec![path.to_path_buf()])
                }
                None => {
                    println!("{}", json);
                    Ok(Vec::new())
                }
            }
        }
        OutputFormat::Csv => write_csv(&output.report, target),
    }
}

fn write_csv(report: &Report, target: Option<&Path>) -> anyhow::Result<Vec<PathBuf>> {
    let Some(target) = target else {
        let mut stdout = std::io::stdout().lock();
        for (idx, records) in report_tables(report).iter().enumerate() {
            if idx > 0 {
                stdout.write_all(b"\n")?;
            }
            stdout.write_all(&delimited(records)?)?;
        }
        return Ok(Vec::new());
    };

    match report {
        Report::Workbook(workbook) if workbook.sheets.len() > 1 => {
            fs::create_dir_all(target)?;
            workbook
                .sheets
                .iter()
                .map(|sheet| {
                    let path = target.join(sheet_file_name(sheet));
                    write_with_bom(&path, &sheet.grid())?;
                    Ok(path)
                })
                .collect()
        }
        _ => {
            let records = report_tables(report).concat();
            write_with_bom(target, &records)?;
            Ok(vec![target.to_path_buf()])
        }
    }
}

/// Record tables of a report: one per sheet, or one for all sections.
fn report_tables(report: &Report) -> Vec<Vec<Vec<String>>> {
    match report {
        Report::Workbook(workbook) => workbook.sheets.iter().map(Sheet::grid).collect(),
        Report::Delimited(delimited) => vec![delimited.records()],
    }
}

fn sheet_file_name(sheet: &Sheet) -> String {
    let stem: String = sheet
        .name
        .chars()
        .map(|c| if c == '/' || c == '\\' { '-' } else { c })
        .collect();
    format!("{}.csv", stem)
}

fn write_with_bom(path: &Path, records: &[Vec<String>]) -> anyhow::Result<()> {
    let mut content = UTF8_BOM.to_vec();
    content.extend(delimited(records)?);
    fs::write(path, content)?;
    debug!("Wrote output to {}", path.display());
    Ok(())
}

/// Semicolon-delimited records; an empty record becomes an empty line.
fn delimited(records: &[Vec<String>]) -> anyhow::Result<Vec<u8>> {
    let mut content = Vec::new();
    for record in records {
        if record.is_empty() {
            content.push(b'\n');
            continue;
        }
        let mut wtr = WriterBuilder::new()
            .delimiter(DELIMITER)
            .flexible(true)
            .from_writer(Vec::new());
        wtr.write_record(record)?;
        content.extend(wtr.into_inner()?);
    }
    Ok(content)
}
