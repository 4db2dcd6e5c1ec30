//! Receipt CLI commands

use chrono::Local;
use clap::{Subcommand, ValueEnum};

use super::expense::{parse_date, parse_money};
use crate::config::Settings;
use crate::display::receipt::{format_receipt_details, format_receipt_table};
use crate::error::SpendResult;
use crate::services::{CreateReceiptInput, ReceiptService, UpdateReceiptInput};
use crate::storage::Storage;

/// Which receipts `receipt list` shows
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ReceiptScope {
    All,
    /// Receipts still awaiting review
    Pending,
    /// Receipts dated this month
    Current,
    /// Receipts dated last month
    Previous,
}

/// Receipt subcommands
#[derive(Subcommand)]
pub enum ReceiptCommands {
    /// Record a receipt; it starts out pending review
    Add {
        /// Shop or merchant
        vendor: String,
        /// Purchase date (YYYY-MM-DD, default today)
        #[arg(short, long)]
        date: Option<String>,
        /// Also record an expense of this amount for the receipt
        #[arg(short, long)]
        amount: Option<String>,
        #[arg(long)]
        description: Option<String>,
        #[arg(long)]
        owner: Option<String>,
    },
    /// List receipts, most recent first
    List {
        #[arg(short, long, value_enum, default_value = "all")]
        scope: ReceiptScope,
    },
    /// Show a receipt and its expenses
    Show {
        /// Receipt ID
        receipt: String,
    },
    /// Change a receipt's vendor or date; a new date moves its expenses
    Edit {
        /// Receipt ID
        receipt: String,
        #[arg(short, long)]
        vendor: Option<String>,
        #[arg(short, long)]
        date: Option<String>,
    },
    /// Mark a receipt as reviewed
    Review {
        /// Receipt ID
        receipt: String,
        /// Put the receipt back into the review queue instead
        #[arg(long)]
        reopen: bool,
    },
    /// Delete a receipt and every expense extracted from it
    Delete {
        /// Receipt ID
        receipt: String,
    },
}

/// Handle a receipt command
pub fn handle_receipt_command(
    storage: &Storage,
    settings: &Settings,
    cmd: ReceiptCommands,
) -> SpendResult<()> {
    let service = ReceiptService::new(storage);
    let currency = settings.currency_symbol.as_str();

    match cmd {
        ReceiptCommands::Add {
            vendor,
            date,
            amount,
            description,
            owner,
        } => {
            let date = match date {
                Some(d) => parse_date(&d)?,
                None => Local::now().date_naive(),
            };

            let (receipt, expense) = service.create(CreateReceiptInput {
                vendor,
                date,
                amount: amount.as_deref().map(parse_money).transpose()?,
                description,
                owner,
            })?;

            println!("Added receipt {}", receipt.id);
            println!("  {}", receipt);
            if let Some(expense) = expense {
                println!("Added expense {}", expense.id);
                println!("  {}", expense);
            }
        }

        ReceiptCommands::List { scope } => {
            let receipts = match scope {
                ReceiptScope::All => service.list()?,
                ReceiptScope::Pending => service.list_pending_review()?,
                ReceiptScope::Current => service.list_current_month()?,
                ReceiptScope::Previous => service.list_previous_month()?,
            };
            print!("{}", format_receipt_table(&receipts));
        }

        ReceiptCommands::Show { receipt } => {
            let receipt = service.require(&receipt)?;
            let expenses = service.expenses(receipt.id)?;
            print!("{}", format_receipt_details(&receipt, &expenses, currency));
        }

        ReceiptCommands::Edit {
            receipt,
            vendor,
            date,
        } => {
            let existing = service.require(&receipt)?;
            let input = UpdateReceiptInput {
                vendor,
                date: date.as_deref().map(parse_date).transpose()?,
                pending_review: None,
            };

            if input.is_empty() {
                println!("No changes specified.");
                return Ok(());
            }

            let updated = service.update(existing.id, input)?;
            println!("Updated receipt {}", updated.id);
            println!("  {}", updated);
        }

        ReceiptCommands::Review { receipt, reopen } => {
            let existing = service.require(&receipt)?;
            let updated = service.set_pending_review(existing.id, reopen)?;
            if reopen {
                println!("Receipt {} is pending review again", updated.id);
            } else {
                println!("Receipt {} reviewed", updated.id);
            }
        }

        ReceiptCommands::Delete { receipt } => {
            let existing = service.require(&receipt)?;
            let deleted = service.delete(existing.id)?;
            println!(
                "Deleted receipt {} and {} expense(s)",
                deleted.receipt.id,
                deleted.expenses.len()
            );
        }
    }

    Ok(())
}
