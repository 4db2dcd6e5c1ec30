//! Expense CLI commands

use chrono::{Local, NaiveDate};
use clap::Subcommand;

use super::report::parse_month;
use crate::config::Settings;
use crate::display::expense::{format_expense_details, format_expense_table};
use crate::error::{SpendError, SpendResult};
use crate::models::{Money, MonthYear, ReceiptId};
use crate::services::{
    CreateExpenseInput, ExpenseFilter, ExpenseService, ReceiptService, UpdateExpenseInput,
};
use crate::storage::Storage;

/// Expense subcommands
#[derive(Subcommand)]
pub enum ExpenseCommands {
    /// Record a new expense
    Add {
        /// Amount (e.g., "8.22" or "8,22")
        #[arg(allow_hyphen_values = true)]
        amount: String,
        /// Category
        category: String,
        /// Subcategory
        #[arg(short, long, default_value = "")]
        subcategory: String,
        /// Expense date (YYYY-MM-DD, default today)
        #[arg(short, long)]
        date: Option<String>,
        #[arg(long)]
        description: Option<String>,
        #[arg(long)]
        owner: Option<String>,
        /// Receipt the expense was extracted from
        #[arg(short, long)]
        receipt: Option<String>,
    },
    /// List expenses, most recent first
    List {
        /// Only this month (YYYY-MM)
        #[arg(short, long)]
        month: Option<String>,
        /// Only this category
        #[arg(short, long)]
        category: Option<String>,
        /// Number of expenses to show
        #[arg(short, long, default_value = "50")]
        limit: usize,
    },
    /// Show expense details
    Show {
        /// Expense ID
        expense: String,
    },
    /// Edit an expense; an empty value clears optional fields
    Edit {
        /// Expense ID
        expense: String,
        #[arg(short, long)]
        date: Option<String>,
        #[arg(short, long, allow_hyphen_values = true)]
        amount: Option<String>,
        #[arg(short, long)]
        category: Option<String>,
        #[arg(short, long)]
        subcategory: Option<String>,
        #[arg(long)]
        description: Option<String>,
        #[arg(long)]
        owner: Option<String>,
        /// Receipt ID; empty detaches the expense
        #[arg(short, long)]
        receipt: Option<String>,
    },
    /// Delete an expense
    Delete {
        /// Expense ID
        expense: String,
    },
    /// Merge the expenses of one receipt into a single expense
    Merge {
        /// Receipt every expense must belong to
        receipt: String,
        /// Expenses to merge (all of the receipt when omitted)
        expenses: Vec<String>,
    },
    /// List categories in use
    Categories,
}

pub(crate) fn parse_date(s: &str) -> SpendResult<NaiveDate> {
    let invalid = || SpendError::Validation(format!("Invalid date '{}'. Use YYYY-MM-DD", s));
    let date = NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d").map_err(|_| invalid())?;
    MonthYear::try_from_date(date).map_err(|_| invalid())?;
    Ok(date)
}

pub(crate) fn parse_money(s: &str) -> SpendResult<Money> {
    Money::parse(s)
        .map_err(|e| SpendError::Validation(format!("Invalid amount '{}': {}", s, e)))
}

/// Handle an expense command
pub fn handle_expense_command(
    storage: &Storage,
    settings: &Settings,
    cmd: ExpenseCommands,
) -> SpendResult<()> {
    let service = ExpenseService::new(storage);
    let receipts = ReceiptService::new(storage);
    let resolve_receipt = |identifier: &str| -> SpendResult<ReceiptId> {
        Ok(receipts.require(identifier)?.id)
    };
    let currency = settings.currency_symbol.as_str();

    match cmd {
        ExpenseCommands::Add {
            amount,
            category,
            subcategory,
            date,
            description,
            owner,
            receipt,
        } => {
            let date = match date {
                Some(d) => parse_date(&d)?,
                None => Local::now().date_naive(),
            };

            let expense = service.create(CreateExpenseInput {
                date,
                amount: parse_money(&amount)?,
                category,
                subcategory,
                description,
                owner,
                receipt: receipt.as_deref().map(&resolve_receipt).transpose()?,
            })?;

            println!("Added expense {}", expense.id);
            println!("  {}", expense);
        }

        ExpenseCommands::List {
            month,
            category,
            limit,
        } => {
            let filter = ExpenseFilter {
                month: month.as_deref().map(parse_month).transpose()?,
                category,
                limit: Some(limit),
            };
            let expenses = service.list(filter)?;
            print!("{}", format_expense_table(&expenses, currency));
        }

        ExpenseCommands::Show { expense } => {
            let expense = service.require(&expense)?;
            print!("{}", format_expense_details(&expense, currency));
        }

        ExpenseCommands::Edit {
            expense,
            date,
            amount,
            category,
            subcategory,
            description,
            owner,
            receipt,
        } => {
            let existing = service.require(&expense)?;
            let input = UpdateExpenseInput {
                date: date.as_deref().map(parse_date).transpose()?,
                amount: amount.as_deref().map(parse_money).transpose()?,
                category,
                subcategory,
                description,
                owner,
                receipt: receipt
                    .as_deref()
                    .map(|r| {
                        if r.trim().is_empty() {
                            Ok(None)
                        } else {
                            resolve_receipt(r).map(Some)
                        }
                    })
                    .transpose()?,
            };

            if input.is_empty() {
                println!("No changes specified.");
                return Ok(());
            }

            let updated = service.update(existing.id, input)?;
            println!("Updated expense {}", updated.id);
            println!("  {}", updated);
        }

        ExpenseCommands::Delete { expense } => {
            let existing = service.require(&expense)?;
            let deleted = service.delete(existing.id)?;
            println!("Deleted expense {}", deleted.id);
        }

        ExpenseCommands::Merge { receipt, expenses } => {
            let receipt = resolve_receipt(&receipt)?;
            let ids = if expenses.is_empty() {
                storage
                    .expenses
                    .get_by_receipt(receipt)?
                    .iter()
                    .map(|e| e.id)
                    .collect()
            } else {
                expenses
                    .iter()
                    .map(|identifier| service.require(identifier).map(|e| e.id))
                    .collect::<SpendResult<Vec<_>>>()?
            };

            let merged = service.merge(receipt, &ids)?;
            println!("Merged {} expenses into {}", ids.len(), merged.id);
            println!("  {}", merged);
        }

        ExpenseCommands::Categories => {
            let categories = service.categories()?;
            if categories.is_empty() {
                println!("No categories yet.");
            }
            for category in categories {
                println!("{}", category);
            }
        }
    }

    Ok(())
}
