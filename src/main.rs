use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};

use spendlens::cli::{
    handle_config_command, handle_expense_command, handle_export_command, handle_history_command,
    handle_import_command, handle_init_command, handle_receipt_command, handle_report_command,
    ExpenseCommands, ExportFormat, ReceiptCommands, ReportCommands,
};
use spendlens::config::{Settings, SpendPaths};
use spendlens::logging::init_logging;
use spendlens::storage::Storage;

#[derive(Parser)]
#[command(
    name = "spendlens",
    version,
    about = "Track expenses and see where the money goes",
    long_about = "spendlens imports expense CSV files, keeps them in a local store, \
                  groups them by the receipts they came from, and reports monthly \
                  totals per category, month-over-month trends and the biggest \
                  subcategories of a month."
)]
struct Cli {
    /// Increase log output (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Create the data directory and default settings
    Init,

    /// Show configuration, or read or change one setting
    Config {
        /// Setting name (currency_symbol, log_level, report_month, csv_delimiter)
        key: Option<String>,
        /// New value
        value: Option<String>,
    },

    /// Import expenses from a CSV file (date, amount, category, subcategory)
    Import {
        /// Path to CSV file
        file: PathBuf,
        /// Show what would be imported without storing anything
        #[arg(long)]
        dry_run: bool,
    },

    /// Expense management commands
    #[command(subcommand, alias = "exp")]
    Expense(ExpenseCommands),

    /// Receipt ledger commands
    #[command(subcommand, alias = "rcp")]
    Receipt(ReceiptCommands),

    /// Spending reports
    #[command(subcommand)]
    Report(ReportCommands),

    /// Export stored expenses
    Export {
        #[arg(short, long, value_enum, default_value = "csv")]
        format: ExportFormat,
        /// Output file (stdout when omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Show recent changes from the audit log
    History {
        /// Number of entries to show
        #[arg(short = 'n', long, default_value = "20")]
        limit: usize,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize paths and settings
    let paths = SpendPaths::new()?;
    let mut settings = Settings::load_or_create(&paths)?;
    init_logging(cli.verbose, &settings.log_level);

    // Initialize storage
    let mut storage = Storage::new(paths.clone())?;
    storage.load_all()?;

    match cli.command {
        Some(Commands::Init) => handle_init_command(&storage, &settings)?,
        Some(Commands::Config { key, value }) => {
            handle_config_command(&storage, &paths, &mut settings, key, value)?
        }
        Some(Commands::Import { file, dry_run }) => {
            handle_import_command(&storage, &settings, &file, dry_run)?
        }
        Some(Commands::Expense(cmd)) => handle_expense_command(&storage, &settings, cmd)?,
        Some(Commands::Receipt(cmd)) => handle_receipt_command(&storage, &settings, cmd)?,
        Some(Commands::Report(cmd)) => handle_report_command(&storage, &settings, cmd)?,
        Some(Commands::Export { format, output }) => {
            handle_export_command(&storage, &settings, format, output)?
        }
        Some(Commands::History { limit }) => handle_history_command(&storage, limit)?,
        None => {
            println!("spendlens - expense tracking and spending reports");
            println!();
            println!("Run 'spendlens --help' for usage information.");
            println!("Run 'spendlens init' to get started.");
        }
    }

    Ok(())
}
