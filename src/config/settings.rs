//! User settings for spendlens
//!
//! Persisted as `config.json` in the base directory. Unknown or missing fields
//! fall back to their defaults so older files keep loading.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::paths::SpendPaths;
use crate::error::SpendError;

/// Which month reports default to when none is given
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ReportMonth {
    /// The month before the current one
    #[default]
    Previous,
    /// The current calendar month
    Current,
    /// The month of the most recent expense on record
    Latest,
}

impl fmt::Display for ReportMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReportMonth::Previous => write!(f, "previous"),
            ReportMonth::Current => write!(f, "current"),
            ReportMonth::Latest => write!(f, "latest"),
        }
    }
}

impl FromStr for ReportMonth {
    type Err = SpendError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "previous" | "prev" => Ok(ReportMonth::Previous),
            "current" => Ok(ReportMonth::Current),
            "latest" => Ok(ReportMonth::Latest),
            other => Err(SpendError::Config(format!(
                "Unknown report month '{}' (expected previous, current or latest)",
                other
            ))),
        }
    }
}

/// User settings for spendlens
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    /// Schema version for migration support
    #[serde(default = "default_schema_version")]
    pub schema_version: u32,

    /// Currency symbol used when rendering amounts
    #[serde(default = "default_currency")]
    pub currency_symbol: String,

    /// Default log filter when neither `SPENDLENS_LOG` nor `-v` is given
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Month the dashboard and top reports use by default
    #[serde(default)]
    pub report_month: ReportMonth,

    /// Delimiter written by CSV export
    #[serde(default = "default_csv_delimiter")]
    pub csv_delimiter: char,
}

fn default_schema_version() -> u32 {
    1
}

fn default_currency() -> String {
    "$".to_string()
}

fn default_log_level() -> String {
    "warn".to_string()
}

fn default_csv_delimiter() -> char {
    ';'
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            schema_version: default_schema_version(),
            currency_symbol: default_currency(),
            log_level: default_log_level(),
            report_month: ReportMonth::default(),
            csv_delimiter: default_csv_delimiter(),
        }
    }
}

impl Settings {
    /// Load settings from disk, or return defaults if the file doesn't exist
    pub fn load_or_create(paths: &SpendPaths) -> Result<Self, SpendError> {
        let settings_path = paths.settings_file();

        if !settings_path.exists() {
            // Caller decides when to persist
            return Ok(Settings::default());
        }

        let contents = std::fs::read_to_string(&settings_path)
            .map_err(|e| SpendError::Io(format!("Failed to read settings file: {}", e)))?;

        serde_json::from_str(&contents)
            .map_err(|e| SpendError::Config(format!("Failed to parse settings file: {}", e)))
    }

    /// Save settings to disk
    pub fn save(&self, paths: &SpendPaths) -> Result<(), SpendError> {
        paths.ensure_directories()?;

        let contents = serde_json::to_string_pretty(self)
            .map_err(|e| SpendError::Config(format!("Failed to serialize settings: {}", e)))?;

        std::fs::write(paths.settings_file(), contents)
            .map_err(|e| SpendError::Io(format!("Failed to write settings file: {}", e)))?;

        Ok(())
    }

    /// Set a single setting by key, validating the new value
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), SpendError> {
        match key {
            "currency_symbol" => {
                if value.is_empty() {
                    return Err(SpendError::Validation(
                        "currency_symbol cannot be empty".into(),
                    ));
                }
                self.currency_symbol = value.to_string();
            }
            "log_level" => {
                tracing_subscriber::EnvFilter::try_new(value).map_err(|e| {
                    SpendError::Validation(format!("Invalid log level '{}': {}", value, e))
                })?;
                self.log_level = value.to_string();
            }
            "report_month" => self.report_month = value.parse()?,
            "csv_delimiter" => {
                let mut chars = value.chars();
                match (chars.next(), chars.next()) {
                    (Some(c), None) if c == ';' || c == ',' => self.csv_delimiter = c,
                    _ => {
                        return Err(SpendError::Validation(format!(
                            "csv_delimiter must be ';' or ',', got '{}'",
                            value
                        )))
                    }
                }
            }
            other => {
                return Err(SpendError::Config(format!("Unknown setting '{}'", other)));
            }
        }
        Ok(())
    }
}
