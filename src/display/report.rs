//! Formatting helpers for terminal reports

use std::collections::BTreeMap;

use crate::models::MonthYear;
use crate::reports::{CategoryAggregate, SparseTable};

const LABEL_WIDTH: usize = 24;

/// Format a floating amount with two decimals and a currency symbol
pub fn format_amount(amount: f32, symbol: &str) -> String {
    if amount < 0.0 {
        format!("-{}{:.2}", symbol, -amount)
    } else {
        // `+ 0.0` folds a negative zero into positive zero
        format!("{}{:.2}", symbol, amount + 0.0)
    }
}

/// Horizontal bar proportional to `value / max_value`
pub fn format_bar(value: f64, max_value: f64, width: usize) -> String {
    if max_value <= 0.0 || value <= 0.0 {
        return " ".repeat(width);
    }

    let filled = ((value / max_value) * width as f64).round() as usize;
    let filled = filled.min(width);

    format!("{}{}", "█".repeat(filled), "░".repeat(width - filled))
}

pub fn separator(width: usize) -> String {
    "─".repeat(width)
}

pub fn double_separator(width: usize) -> String {
    "═".repeat(width)
}

/// Truncate to `max_len` characters, ending with an ellipsis when cut
pub fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else if max_len <= 3 {
        ".".repeat(max_len)
    } else {
        let head: String = s.chars().take(max_len - 3).collect();
        format!("{}...", head)
    }
}

/// Render a month-by-classifier table, one block per month
///
/// Only populated cells are shown. Months and labels are sorted.
pub fn format_totals(
    title: &str,
    table: &SparseTable<MonthYear, String>,
    currency: &str,
) -> String {
    let mut output = format!("{}\n{}\n", title, double_separator(50));

    if table.is_empty() {
        output.push_str("No expenses recorded.\n");
        return output;
    }

    for month in table.row_keys() {
        output.push_str(&format!("\n{}\n", month));
        output.push_str(&separator(50));
        output.push('\n');

        let Some(cells) = table.row(&month) else {
            continue;
        };
        let mut labels: Vec<&String> = cells.keys().collect();
        labels.sort();

        let mut total = 0.0_f32;
        for label in labels {
            let amount = cells.get(label).copied().unwrap_or(0.0);
            total += amount;
            let label = if label.is_empty() { "(none)" } else { label.as_str() };
            output.push_str(&format!(
                "  {:<width$} {:>14}\n",
                truncate(label, LABEL_WIDTH),
                format_amount(amount, currency),
                width = LABEL_WIDTH
            ));
        }
        output.push_str(&format!(
            "  {:<width$} {:>14}\n",
            "Total",
            format_amount(total, currency),
            width = LABEL_WIDTH
        ));
    }

    output
}

/// Render a zero-filled category by month grid
pub fn format_trend(months: &[MonthYear], series: &BTreeMap<String, Vec<f32>>) -> String {
    let mut output = format!("  {:<width$}", "", width = LABEL_WIDTH);
    for month in months {
        output.push_str(&format!(" {:>10}", month.to_string()));
    }
    output.push('\n');

    for (category, amounts) in series {
        output.push_str(&format!(
            "  {:<width$}",
            truncate(category, LABEL_WIDTH),
            width = LABEL_WIDTH
        ));
        for amount in amounts {
            output.push_str(&format!(" {:>10.2}", amount + 0.0));
        }
        output.push('\n');
    }

    output
}

/// Render ranked subcategories for one month
pub fn format_top(month: MonthYear, ranked: &[CategoryAggregate], currency: &str) -> String {
    let mut output = format!("Top Subcategories: {}\n{}\n", month, separator(50));

    if ranked.is_empty() {
        output.push_str("No subcategorised expenses this month.\n");
        return output;
    }

    for (rank, aggregate) in ranked.iter().enumerate() {
        output.push_str(&format!(
            "{:>3}. {:<width$} {:>14}\n",
            rank + 1,
            truncate(&aggregate.category, LABEL_WIDTH),
            aggregate.total.format_with_symbol(currency),
            width = LABEL_WIDTH
        ));
    }

    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Expense, Money};
    use crate::reports::{top_subcategories, totals_by_category};
    use chrono::NaiveDate;

    #[test]
    fn test_format_amount() {
        assert_eq!(format_amount(8.22, "$"), "$8.22");
        assert_eq!(format_amount(0.0, "€"), "€0.00");
        assert_eq!(format_amount(-0.0, "$"), "$0.00");
        assert_eq!(format_amount(-2.5, "$"), "-$2.50");
        assert_eq!(format_amount(10.92, "$"), "$10.92");
    }

    #[test]
    fn test_format_bar() {
        assert_eq!(format_bar(5.0, 10.0, 4), "██░░");
        assert_eq!(format_bar(0.0, 10.0, 3), "   ");
        assert_eq!(format_bar(20.0, 10.0, 2), "██");
    }

    #[test]
    fn test_truncate_is_char_safe() {
        assert_eq!(truncate("groceries", 20), "groceries");
        assert_eq!(truncate("alimentación básica", 10), "aliment...");
        assert_eq!(truncate("abcdef", 2), "..");
    }

    fn spent(day: u32, month: u32, category: &str, subcategory: &str, cents: i64) -> Expense {
        Expense::with_details(
            NaiveDate::from_ymd_opt(2024, month, day).unwrap(),
            Money::from_cents(cents),
            category,
            subcategory,
        )
    }

    #[test]
    fn test_format_totals() {
        let expenses = vec![
            spent(1, 1, "food", "meat", 250),
            spent(2, 1, "home", "", 1000),
            spent(3, 2, "food", "fish", 400),
        ];
        let text = format_totals("Totals by Category", &totals_by_category(&expenses), "$");

        let january = text.find("2024-01").unwrap();
        let february = text.find("2024-02").unwrap();
        assert!(january < february);
        assert!(text.contains("$12.50"));
        assert!(text.contains("$4.00"));

        let empty = format_totals("Totals", &SparseTable::new(), "$");
        assert!(empty.contains("No expenses recorded."));
    }

    #[test]
    fn test_format_trend() {
        let months = vec![MonthYear::new(2024, 1).unwrap(), MonthYear::new(2024, 2).unwrap()];
        let mut series = BTreeMap::new();
        series.insert("food".to_string(), vec![2.5, 0.0]);

        let text = format_trend(&months, &series);
        let lines: Vec<_> = text.lines().collect();
        assert!(lines[0].contains("2024-01"));
        assert!(lines[0].contains("2024-02"));
        assert!(lines[1].trim_start().starts_with("food"));
        assert!(lines[1].ends_with("2.50       0.00"));
    }

    #[test]
    fn test_format_top() {
        let expenses = vec![spent(1, 3, "food", "meat", 900), spent(2, 3, "food", "fish", 300)];
        let month = MonthYear::new(2024, 3).unwrap();
        let text = format_top(month, &top_subcategories(&expenses, month), "$");

        let lines: Vec<_> = text.lines().collect();
        assert!(lines[2].contains("1. meat"));
        assert!(lines[2].contains("$9.00"));
        assert!(lines[3].contains("2. fish"));

        assert!(format_top(month, &[], "$").contains("No subcategorised"));
    }
}
