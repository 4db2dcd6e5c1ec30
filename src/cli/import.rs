//! CLI command handler for CSV import
//!
//! Parses the file, flags expenses that are already stored, and imports the
//! rest unless this is a dry run.

use std::fs::File;
use std::path::Path;

use crate::config::Settings;
use crate::error::{SpendError, SpendResult};
use crate::services::{read_expenses_csv, ImportService, ImportStatus};
use crate::storage::Storage;

const PREVIEW_ROWS: usize = 5;

/// Handle the import command
pub fn handle_import_command(
    storage: &Storage,
    settings: &Settings,
    file: &Path,
    dry_run: bool,
) -> SpendResult<()> {
    let import_service = ImportService::new(storage);

    let reader = File::open(file).map_err(|e| {
        SpendError::Io(format!("Failed to open {}: {}", file.display(), e))
    })?;
    let parsed = read_expenses_csv(reader)?;

    let preview = import_service.generate_preview(parsed)?;

    let new_count = preview.iter().filter(|e| e.status == ImportStatus::New).count();
    let dup_count = preview.len() - new_count;

    println!("Import Preview for '{}'", file.display());
    println!("{}", "=".repeat(40));
    println!("  New expenses:       {}", new_count);
    println!("  Duplicates (skip):  {}", dup_count);
    println!();

    if new_count == 0 {
        println!("No new expenses to import.");
        return Ok(());
    }

    println!("First expenses to import:");
    for entry in preview
        .iter()
        .filter(|e| e.status == ImportStatus::New)
        .take(PREVIEW_ROWS)
    {
        let expense = &entry.expense;
        println!(
            "  {} {:<16} {:<16} {:>12}",
            expense.date,
            expense.category,
            expense.subcategory,
            expense.amount.format_with_symbol(&settings.currency_symbol)
        );
    }
    if new_count > PREVIEW_ROWS {
        println!("  ... and {} more", new_count - PREVIEW_ROWS);
    }
    println!();

    if dry_run {
        println!("Dry run: nothing was imported.");
        return Ok(());
    }

    let result = import_service.import_from_preview(preview)?;

    println!("Import Complete!");
    println!("  Imported:    {}", result.imported);
    println!("  Skipped:     {}", result.duplicates_skipped);

    Ok(())
}
