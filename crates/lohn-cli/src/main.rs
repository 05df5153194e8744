//! CLI application for German payroll document evaluation.

mod commands;
mod output;

use clap::{Parser, Subcommand};
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

use commands::{config, run};
use lohn_core::DocumentFamily;

/// Lohn - Evaluate payroll slips, reimbursement slips, the employer burden
/// ledger and the payroll journal
#[derive(Parser)]
#[command(name = "lohn")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Path to config file
    #[arg(short, long, global = true)]
    config: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Evaluate payroll slips (Gehaltsabrechnungen)
    Payroll(run::RunArgs),

    /// Evaluate employer reimbursement slips (AAG Erstattungen)
    Reimbursement(run::RunArgs),

    /// Evaluate the employer burden ledger (AG Belastung)
    Ledger(run::RunArgs),

    /// Evaluate the payroll journal (Lohnjournal)
    Journal(run::RunArgs),

    /// Manage configuration
    Config(config::ConfigArgs),
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Set up logging based on verbosity
    let level = match cli.verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;

    let config_path = cli.config.as_deref();
    match cli.command {
        Commands::Payroll(args) => run::run(DocumentFamily::Payroll, args, config_path),
        Commands::Reimbursement(args) => run::run(DocumentFamily::Reimbursement, args, config_path),
        Commands::Ledger(args) => run::run(DocumentFamily::BurdenLedger, args, config_path),
        Commands::Journal(args) => run::run(DocumentFamily::PayrollJournal, args, config_path),
        Commands::Config(args) => config::run(args, config_path),
    }
}
