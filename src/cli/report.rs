//! CLI commands for reports

use std::fs::File;
use std::path::{Path, PathBuf};

use clap::{Subcommand, ValueEnum};

use crate::config::{ReportMonth, Settings};
use crate::display::report::{format_top, format_totals, format_trend};
use crate::error::{SpendError, SpendResult};
use crate::models::{Expense, MonthYear};
use crate::reports::{
    find_most_recent_date, month_over_month_series, month_over_month_totals,
    top_subcategories_limit, totals_by_category, totals_by_subcategory, Dashboard,
    TOP_SUBCATEGORIES,
};
use crate::services::read_expenses_csv;
use crate::storage::Storage;

/// Label expenses are grouped by
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Classifier {
    Category,
    Subcategory,
}

/// Report subcommands
#[derive(Subcommand, Debug)]
pub enum ReportCommands {
    /// Totals per month and classifier
    Totals {
        /// Group by category or subcategory
        #[arg(short, long, value_enum, default_value = "category")]
        by: Classifier,
        /// Only this month (YYYY-MM)
        #[arg(short, long)]
        month: Option<String>,
    },

    /// Category totals across every recorded month
    Trend,

    /// Biggest subcategories of a month
    Top {
        /// Month (YYYY-MM, default from settings)
        #[arg(short, long)]
        month: Option<String>,
        /// How many subcategories to show
        #[arg(short = 'n', long, default_value_t = TOP_SUBCATEGORIES)]
        limit: usize,
    },

    /// Full dashboard for one month
    Dashboard {
        /// Month (YYYY-MM, default from settings)
        #[arg(short, long)]
        month: Option<String>,
        /// Build from a CSV file instead of stored expenses
        #[arg(short, long)]
        file: Option<PathBuf>,
        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },
}

pub(crate) fn parse_month(s: &str) -> SpendResult<MonthYear> {
    MonthYear::parse(s).map_err(|e| {
        SpendError::Validation(format!("Invalid month '{}': {}. Use YYYY-MM", s, e))
    })
}

/// The month a report covers
///
/// An explicit month wins; otherwise the `report_month` setting decides.
/// `latest` falls back to the current month when nothing is recorded.
pub fn resolve_month(
    month: Option<&str>,
    setting: ReportMonth,
    expenses: &[Expense],
) -> SpendResult<MonthYear> {
    if let Some(month) = month {
        return parse_month(month);
    }

    Ok(match setting {
        ReportMonth::Previous => MonthYear::current().prev(),
        ReportMonth::Current => MonthYear::current(),
        ReportMonth::Latest => find_most_recent_date(expenses)
            .map(MonthYear::from_date)
            .unwrap_or_else(MonthYear::current),
    })
}

fn load_csv(path: &Path) -> SpendResult<Vec<Expense>> {
    let file = File::open(path).map_err(|e| {
        SpendError::Io(format!("Failed to open {}: {}", path.display(), e))
    })?;
    Ok(read_expenses_csv(file)?)
}

/// Handle report commands
pub fn handle_report_command(
    storage: &Storage,
    settings: &Settings,
    cmd: ReportCommands,
) -> SpendResult<()> {
    let currency = settings.currency_symbol.as_str();

    match cmd {
        ReportCommands::Totals { by, month } => {
            let mut expenses = storage.expenses.get_all()?;
            if let Some(month) = month.as_deref() {
                let month = parse_month(month)?;
                expenses.retain(|e| e.month_year() == month);
            }

            let (title, table) = match by {
                Classifier::Category => ("Totals by Category", totals_by_category(&expenses)),
                Classifier::Subcategory => {
                    ("Totals by Subcategory", totals_by_subcategory(&expenses))
                }
            };
            print!("{}", format_totals(title, &table, currency));
        }

        ReportCommands::Trend => {
            let expenses = storage.expenses.get_all()?;
            let (months, series) = month_over_month_series(&month_over_month_totals(&expenses));

            println!("Month over Month");
            if months.is_empty() {
                println!("No expenses recorded.");
            } else {
                print!("{}", format_trend(&months, &series));
            }
        }

        ReportCommands::Top { month, limit } => {
            let expenses = storage.expenses.get_all()?;
            let month = resolve_month(month.as_deref(), settings.report_month, &expenses)?;
            let ranked = top_subcategories_limit(&expenses, month, limit);
            print!("{}", format_top(month, &ranked, currency));
        }

        ReportCommands::Dashboard { month, file, json } => {
            let expenses = match &file {
                Some(path) => load_csv(path)?,
                None => storage.expenses.get_all()?,
            };
            let month = resolve_month(month.as_deref(), settings.report_month, &expenses)?;
            tracing::debug!(%month, expenses = expenses.len(), "building dashboard");

            let dashboard = Dashboard::build(&expenses, month);
            if json {
                let text = serde_json::to_string_pretty(&dashboard)?;
                println!("{}", text);
            } else {
                print!("{}", dashboard.format_terminal(currency));
            }
        }
    }

    Ok(())
}
