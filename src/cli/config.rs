//! Setup, configuration and history commands

use crate::audit::EntityType;
use crate::config::{Settings, SpendPaths};
use crate::error::{SpendError, SpendResult};
use crate::storage::Storage;

/// Create the data directories and write default settings
pub fn handle_init_command(storage: &Storage, settings: &Settings) -> SpendResult<()> {
    let paths = storage.paths();
    println!("Initializing spendlens at: {}", paths.base_dir().display());

    let already = storage.is_initialized();
    paths.ensure_directories()?;
    settings.save(paths)?;
    storage.save_all()?;

    if already {
        println!("Already initialized; settings were rewritten.");
    } else {
        println!("Initialization complete!");
    }
    println!();
    println!("Run 'spendlens import <file.csv>' to load expenses.");
    Ok(())
}

/// Show paths and settings, or change one setting
pub fn handle_config_command(
    storage: &Storage,
    paths: &SpendPaths,
    settings: &mut Settings,
    key: Option<String>,
    value: Option<String>,
) -> SpendResult<()> {
    match (key, value) {
        (Some(key), Some(value)) => {
            let before = settings.clone();
            settings.set(&key, &value)?;
            settings.save(paths)?;
            storage.log_update(
                EntityType::Settings,
                "settings",
                Some(key.clone()),
                &before,
                &*settings,
            )?;
            tracing::info!(%key, %value, "setting changed");
            println!("Set {} = {}", key, value);
        }
        (Some(key), None) => {
            let current = serde_json::to_value(&*settings)?;
            match current.get(&key) {
                Some(value) => println!("{}", value),
                None => return Err(SpendError::Config(format!("Unknown setting '{}'", key))),
            }
        }
        _ => {
            println!("spendlens Configuration");
            println!("=======================");
            println!("Base directory:   {}", paths.base_dir().display());
            println!("Data file:        {}", paths.expenses_file().display());
            println!("Audit log:        {}", paths.audit_log().display());
            println!();
            println!("Settings:");
            println!("  currency_symbol: {}", settings.currency_symbol);
            println!("  log_level:       {}", settings.log_level);
            println!("  report_month:    {}", settings.report_month);
            println!("  csv_delimiter:   {}", settings.csv_delimiter);
        }
    }

    Ok(())
}

/// Print the most recent audit entries
pub fn handle_history_command(storage: &Storage, limit: usize) -> SpendResult<()> {
    let entries = storage.audit().read_recent(limit)?;

    if entries.is_empty() {
        println!("No changes recorded.");
        return Ok(());
    }

    for entry in entries {
        println!("{}", entry.format_human_readable());
    }

    Ok(())
}
