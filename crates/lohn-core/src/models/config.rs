//! Configuration structures for a processing run.

use chrono::Datelike;
use serde::{Deserialize, Serialize};

/// Main configuration for a lohn run.
///
/// Built once per run and passed by reference into every pipeline.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LohnConfig {
    /// Target period of the run.
    pub run: RunConfig,

    /// Employer burden ledger layout.
    pub ledger: LedgerConfig,

    /// Payroll journal layout.
    pub journal: JournalConfig,

    /// Report layout.
    pub report: ReportConfig,
}

/// Target period configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    /// Payroll pages of other years are skipped.
    pub year: i32,

    /// Month label shown in the ledger title (e.g. "AUGUST").
    pub month: Option<String>,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            year: chrono::Local::now().year(),
            month: None,
        }
    }
}

/// Employer burden ledger ("AG Belastung") configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LedgerConfig {
    /// Last header line on each page; ledger lines start below it.
    pub header_end: String,

    /// First footer line on each page; ledger lines end above it.
    pub footer_start: String,

    /// Sheet and title name.
    pub title: String,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            header_end: "Pers.Nr. Einheiten".to_string(),
            footer_start: "Lohnservice Wendel eG".to_string(),
            title: "AG Belastung".to_string(),
        }
    }
}

/// Payroll journal ("Lohnjournal") configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct JournalConfig {
    /// Last header line on each page.
    pub header_end: String,

    /// First footer line on each page.
    pub footer_start: String,

    /// Marker of the subtotal line closing a page.
    pub subtotal_marker: String,

    /// Sheet and title name.
    pub title: String,
}

impl Default for JournalConfig {
    fn default() -> Self {
        Self {
            header_end: "Name E Kl".to_string(),
            footer_start: "Negative Werte sind".to_string(),
            subtotal_marker: "Summen".to_string(),
            title: "Lohnjournal".to_string(),
        }
    }
}

/// Report layout configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportConfig {
    /// Label of total rows and columns.
    pub total_label: String,

    /// Width of the name column.
    pub index_width: u16,

    /// Width of value columns in ledger and journal sheets.
    pub value_width: u16,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            total_label: "Summe".to_string(),
            index_width: 30,
            value_width: 15,
        }
    }
}

impl LohnConfig {
    /// Configuration for a given target year, everything else default.
    pub fn for_year(year: i32) -> Self {
        Self {
            run: RunConfig { year, month: None },
            ..Self::default()
        }
    }

    /// Load configuration from a JSON file.
    pub fn from_file(path: &std::path::Path) -> Result<Self, std::io::Error> {
        let content = std::fs::read_to_string(path)?;
        serde_json::from_str(&content).map_err(|e| {
            std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string())
        })
    }

    /// Save configuration to a JSON file.
    pub fn save(&self, path: &std::path::Path) -> Result<(), std::io::Error> {
        let content = serde_json::to_string_pretty(self).map_err(|e| {
            std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string())
        })?;
        std::fs::write(path, content)
    }
}
