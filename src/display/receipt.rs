//! Receipt display formatting

use tabled::settings::Style;
use tabled::{Table, Tabled};

use super::expense::format_expense_table;
use super::report::truncate;
use crate::models::{Expense, Money, Receipt};

#[derive(Tabled)]
struct ReceiptRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Date")]
    date: String,
    #[tabled(rename = "Vendor")]
    vendor: String,
    #[tabled(rename = "Status")]
    status: &'static str,
}

fn status(receipt: &Receipt) -> &'static str {
    if receipt.pending_review {
        "pending review"
    } else {
        "reviewed"
    }
}

/// Render receipts as a table
pub fn format_receipt_table(receipts: &[Receipt]) -> String {
    if receipts.is_empty() {
        return "No receipts found.\n".to_string();
    }

    let rows = receipts.iter().map(|r| ReceiptRow {
        id: r.id.to_string(),
        date: r.date.format("%Y-%m-%d").to_string(),
        vendor: truncate(&r.vendor, 30),
        status: status(r),
    });
    let mut table = Table::new(rows);
    table.with(Style::rounded());

    format!("{}\n", table)
}

/// Render a receipt followed by the expenses extracted from it
pub fn format_receipt_details(receipt: &Receipt, expenses: &[Expense], currency: &str) -> String {
    let total: Money = expenses.iter().map(|e| e.amount).sum();

    let mut output = String::new();
    output.push_str(&format!("Receipt:  {}\n", receipt.id));
    output.push_str(&format!("Date:     {}\n", receipt.date.format("%Y-%m-%d")));
    output.push_str(&format!("Vendor:   {}\n", receipt.vendor));
    output.push_str(&format!("Status:   {}\n", status(receipt)));
    output.push_str(&format!("Total:    {}\n", total.format_with_symbol(currency)));
    output.push('\n');
    output.push_str(&format_expense_table(expenses, currency));

    output
}
