//! Run command - evaluate one document family.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

use clap::Args;
use console::style;
use glob::glob;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{debug, info};

use lohn_core::{AutoExtractor, DocumentFamily, LohnConfig, Processor, SourceDocument};

use super::config::load_config;
use crate::output::{self, OutputFormat};

/// Arguments shared by the four evaluation commands.
#[derive(Args)]
pub struct RunArgs {
    /// Input files or glob patterns, processed in the given order
    #[arg(required = true)]
    inputs: Vec<String>,

    /// Target year (default: from config, else the current year)
    #[arg(short, long)]
    year: Option<i32>,

    /// Month label shown in the ledger title (e.g. AUGUST)
    #[arg(short, long)]
    month: Option<String>,

    /// Output file; a directory when the report has more than one sheet
    /// (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "csv")]
    format: OutputFormat,
}

/// One input file read into memory.
struct InputFile {
    name: String,
    data: Vec<u8>,
}

pub fn run(family: DocumentFamily, args: RunArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let start = Instant::now();

    let mut config = load_config(config_path)?;
    apply_overrides(&mut config, &args);
    debug!("Target year {}", config.run.year);

    let files = expand_inputs(&args.inputs)?;
    info!("Evaluating {} files as {:?}", files.len(), family);

    let pb = ProgressBar::new(files.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] {bar:40.cyan/blue} {msg}")?
            .progress_chars("##-"),
    );

    let mut inputs = Vec::with_capacity(files.len());
    for path in &files {
        pb.set_message(format!("Reading {}", path.display()));
        inputs.push(InputFile {
            name: file_name(path),
            data: fs::read(path)?,
        });
        pb.inc(1);
    }

    pb.set_message("Evaluating...");
    let documents: Vec<SourceDocument> = inputs
        .iter()
        .map(|input| SourceDocument::new(&input.name, &input.data))
        .collect();

    let result = Processor::new(&config, AutoExtractor::new()).run(family, &documents);
    pb.finish_and_clear();
    let run_output = result?;

    for warning in &run_output.warnings {
        eprintln!("{} {}", style("⚠").yellow(), warning);
    }

    let written = output::write(&run_output, args.format, args.output.as_deref())?;
    for path in &written {
        println!(
            "{} Output written to {}",
            style("✓").green(),
            path.display()
        );
    }

    debug!("Total processing time: {:?}", start.elapsed());

    Ok(())
}

fn apply_overrides(config: &mut LohnConfig, args: &RunArgs) {
    if let Some(year) = args.year {
        config.run.year = year;
    }
    if let Some(month) = &args.month {
        config.run.month = Some(month.clone());
    }
}

/// Expand every pattern in order; matches of one pattern are sorted.
fn expand_inputs(patterns: &[String]) -> anyhow::Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for pattern in patterns {
        let before = files.len();
        for entry in glob(pattern)? {
            let path = entry?;
            if path.is_file() {
                files.push(path);
            }
        }
        if files.len() == before {
            anyhow::bail!("No matching files found for pattern: {}", pattern);
        }
    }
    Ok(files)
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .and_then(|s| s.to_str())
        .map_or_else(|| path.display().to_string(), str::to_string)
}
