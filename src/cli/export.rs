//! CLI command for data export

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;

use clap::ValueEnum;

use crate::config::Settings;
use crate::error::{SpendError, SpendResult};
use crate::export::{export_expenses_csv, export_full_json};
use crate::storage::Storage;

/// Export format options
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ExportFormat {
    /// CSV in the import layout
    Csv,
    /// JSON with every field and export metadata
    Json,
}

/// Handle the export command
///
/// Without an output path the export goes to stdout.
pub fn handle_export_command(
    storage: &Storage,
    settings: &Settings,
    format: ExportFormat,
    output: Option<PathBuf>,
) -> SpendResult<()> {
    let writer: Box<dyn Write> = match &output {
        Some(path) => {
            let file = File::create(path).map_err(|e| {
                SpendError::Export(format!("Failed to create file {}: {}", path.display(), e))
            })?;
            Box::new(BufWriter::new(file))
        }
        None => Box::new(io::stdout().lock()),
    };

    match format {
        ExportFormat::Csv => {
            let expenses = storage.expenses.get_all()?;
            export_expenses_csv(&expenses, writer, settings.csv_delimiter)?;
        }
        ExportFormat::Json => {
            let mut writer = writer;
            export_full_json(storage, &mut writer, true)?;
            writeln!(writer).map_err(|e| SpendError::Export(e.to_string()))?;
            writer.flush().map_err(|e| SpendError::Export(e.to_string()))?;
        }
    }

    if let Some(path) = output {
        let count = storage.expenses.count()?;
        println!("Exported {} expenses to: {}", count, path.display());
    }

    Ok(())
}
