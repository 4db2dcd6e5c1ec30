//! Expense display formatting

use tabled::settings::object::Columns;
use tabled::settings::{Alignment, Style};
use tabled::{Table, Tabled};

use super::report::truncate;
use crate::models::Expense;

#[derive(Tabled)]
struct ExpenseRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Date")]
    date: String,
    #[tabled(rename = "Category")]
    category: String,
    #[tabled(rename = "Subcategory")]
    subcategory: String,
    #[tabled(rename = "Amount")]
    amount: String,
    #[tabled(rename = "Receipt")]
    receipt: String,
}

impl ExpenseRow {
    fn new(expense: &Expense, currency: &str) -> Self {
        Self {
            id: expense.id.to_string(),
            date: expense.date.format("%Y-%m-%d").to_string(),
            category: truncate(&expense.category, 20),
            subcategory: truncate(&expense.subcategory, 20),
            amount: expense.amount.format_with_symbol(currency),
            receipt: expense.receipt.map(|r| r.to_string()).unwrap_or_default(),
        }
    }
}

/// Render expenses as a table
pub fn format_expense_table(expenses: &[Expense], currency: &str) -> String {
    if expenses.is_empty() {
        return "No expenses found.\n".to_string();
    }

    let rows = expenses.iter().map(|e| ExpenseRow::new(e, currency));
    let mut table = Table::new(rows);
    table
        .with(Style::rounded())
        .modify(Columns::single(4), Alignment::right());

    format!("{}\n", table)
}

/// Render every field of one expense
pub fn format_expense_details(expense: &Expense, currency: &str) -> String {
    let mut output = String::new();

    output.push_str(&format!("Expense:     {}\n", expense.id));
    output.push_str(&format!("Date:        {}\n", expense.date.format("%Y-%m-%d")));
    output.push_str(&format!(
        "Amount:      {}\n",
        expense.amount.format_with_symbol(currency)
    ));
    output.push_str(&format!("Category:    {}\n", expense.category));
    if expense.has_subcategory() {
        output.push_str(&format!("Subcategory: {}\n", expense.subcategory));
    }
    if let Some(description) = &expense.description {
        output.push_str(&format!("Description: {}\n", description));
    }
    if let Some(owner) = &expense.owner {
        output.push_str(&format!("Owner:       {}\n", owner));
    }
    if let Some(receipt) = &expense.receipt {
        output.push_str(&format!("Receipt:     {}\n", receipt));
    }
    output.push_str(&format!(
        "Created:     {}\n",
        expense.created_at.format("%Y-%m-%d %H:%M")
    ));

    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Money, ReceiptId};
    use chrono::NaiveDate;

    fn sample() -> Expense {
        let mut expense = Expense::with_details(
            NaiveDate::from_ymd_opt(2022, 4, 2).unwrap(),
            Money::from_cents(822),
            "transport",
            "gasoline",
        );
        expense.receipt = Some(ReceiptId::new());
        expense
    }

    #[test]
    fn test_table_contains_rows() {
        let expense = sample();
        let table = format_expense_table(std::slice::from_ref(&expense), "$");

        assert!(table.contains("Subcategory"));
        assert!(table.contains(&expense.id.to_string()));
        assert!(table.contains("$8.22"));
        assert!(table.contains("rcp-"));
    }

    #[test]
    fn test_empty_table() {
        assert_eq!(format_expense_table(&[], "$"), "No expenses found.\n");
    }

    #[test]
    fn test_details() {
        let details = format_expense_details(&sample(), "€");
        assert!(details.contains("Amount:      €8.22"));
        assert!(details.contains("Subcategory: gasoline"));
        assert!(details.contains("Receipt:     rcp-"));
        assert!(!details.contains("Owner"));
    }
}
