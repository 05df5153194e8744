//! Data models: records, table cells, warnings and run configuration.

pub mod cell;
pub mod config;
pub mod record;
pub mod warning;

pub use cell::Cell;
pub use config::{JournalConfig, LedgerConfig, LohnConfig, ReportConfig, RunConfig};
pub use record::*;
pub use warning::ParseWarning;
