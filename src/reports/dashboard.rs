//! Dashboard view-model
//!
//! Pure helpers that turn the aggregation tables into the ordered series a
//! dashboard renders, and the [`Dashboard`] that bundles them for one month.

use std::collections::{BTreeMap, BTreeSet};

use chrono::NaiveDate;
use serde::Serialize;

use super::aggregation::{
    month_over_month_totals, totals_by_category, totals_by_subcategory, SparseTable,
};
use super::top_categories::top_subcategories;
use crate::display::report::{
    double_separator, format_amount, format_bar, format_trend, separator, truncate,
};
use crate::models::{Expense, MonthYear};

const WIDTH: usize = 72;
const LABEL_WIDTH: usize = 24;
const BAR_WIDTH: usize = 30;

/// One labelled amount of a dashboard series
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LabeledAmount {
    pub label: String,
    pub amount: f32,
}

/// Amounts of one month for every classifier in the table
///
/// Classifiers come from all months, sorted; those with nothing in `month`
/// get `0.0`.
pub fn month_column(table: &SparseTable<MonthYear, String>, month: MonthYear) -> Vec<LabeledAmount> {
    table
        .column_keys()
        .into_iter()
        .map(|label| LabeledAmount {
            amount: table.value(&month, &label),
            label,
        })
        .collect()
}

/// Zero-filled month-over-month series
///
/// Returns the sorted months observed anywhere in the table and, per
/// category, one amount per month in that order.
pub fn month_over_month_series(
    table: &SparseTable<String, MonthYear>,
) -> (Vec<MonthYear>, BTreeMap<String, Vec<f32>>) {
    let months = table.column_keys();
    let series = table
        .row_keys()
        .into_iter()
        .map(|category| {
            let amounts = months.iter().map(|m| table.value(&category, m)).collect();
            (category, amounts)
        })
        .collect();
    (months, series)
}

/// Distinct subcategories used under each category
///
/// Categories whose expenses have no subcategory map to an empty set.
pub fn group_subcategories_by_category(expenses: &[Expense]) -> BTreeMap<String, BTreeSet<String>> {
    let mut grouped: BTreeMap<String, BTreeSet<String>> = BTreeMap::new();
    for expense in expenses {
        let subcategories = grouped.entry(expense.category.clone()).or_default();
        if expense.has_subcategory() {
            subcategories.insert(expense.subcategory.clone());
        }
    }
    grouped
}

/// Date of the most recent expense
pub fn find_most_recent_date(expenses: &[Expense]) -> Option<NaiveDate> {
    expenses.iter().map(|e| e.date).max()
}

/// Sort most recent first, keeping input order within a day
pub fn sort_by_date(expenses: &mut [Expense]) {
    expenses.sort_by(|a, b| b.date.cmp(&a.date));
}

/// Everything the dashboard shows for one month
#[derive(Debug, Clone, Serialize)]
pub struct Dashboard {
    pub month: MonthYear,
    pub categories: Vec<LabeledAmount>,
    pub subcategories: Vec<LabeledAmount>,
    /// Top subcategories of the month, largest first
    pub top_subcategories: Vec<LabeledAmount>,
    pub trend_months: Vec<MonthYear>,
    pub trend: BTreeMap<String, Vec<f32>>,
    pub subcategories_by_category: BTreeMap<String, BTreeSet<String>>,
    pub expense_count: usize,
}

impl Dashboard {
    pub fn build(expenses: &[Expense], month: MonthYear) -> Self {
        let (trend_months, trend) = month_over_month_series(&month_over_month_totals(expenses));

        let top_subcategories = top_subcategories(expenses, month)
            .into_iter()
            .map(|aggregate| LabeledAmount {
                amount: aggregate.total_amount(),
                label: aggregate.category,
            })
            .collect();

        Self {
            month,
            categories: month_column(&totals_by_category(expenses), month),
            subcategories: month_column(&totals_by_subcategory(expenses), month),
            top_subcategories,
            trend_months,
            trend,
            subcategories_by_category: group_subcategories_by_category(expenses),
            expense_count: expenses.len(),
        }
    }

    /// Total of the month across all categories
    pub fn month_total(&self) -> f32 {
        self.categories.iter().map(|c| c.amount).sum()
    }

    pub fn format_terminal(&self, currency: &str) -> String {
        let mut output = String::new();

        output.push_str(&format!("Spending Dashboard: {}\n", self.month));
        output.push_str(&double_separator(WIDTH));
        output.push('\n');

        if self.expense_count == 0 {
            output.push_str("No expenses recorded.\n");
            return output;
        }

        output.push_str(&format!(
            "Month Total: {}\n",
            format_amount(self.month_total(), currency)
        ));

        output.push_str("\nBy Category\n");
        output.push_str(&separator(WIDTH));
        output.push('\n');
        push_bars(&mut output, &self.categories, currency);

        output.push_str("\nTop Subcategories\n");
        output.push_str(&separator(WIDTH));
        output.push('\n');
        if self.top_subcategories.is_empty() {
            output.push_str("  (none this month)\n");
        }
        for (rank, entry) in self.top_subcategories.iter().enumerate() {
            output.push_str(&format!(
                "  {}. {:<width$} {:>12}\n",
                rank + 1,
                truncate(&entry.label, LABEL_WIDTH),
                format_amount(entry.amount, currency),
                width = LABEL_WIDTH
            ));
        }

        output.push_str("\nMonth over Month\n");
        output.push_str(&separator(WIDTH));
        output.push('\n');
        output.push_str(&format_trend(&self.trend_months, &self.trend));

        output
    }
}

fn push_bars(output: &mut String, rows: &[LabeledAmount], currency: &str) {
    let max = rows.iter().map(|r| r.amount).fold(0.0_f32, f32::max) as f64;
    for row in rows {
        output.push_str(&format!(
            "  {:<width$} {:>12} {}\n",
            truncate(&row.label, LABEL_WIDTH),
            format_amount(row.amount, currency),
            format_bar(row.amount as f64, max, BAR_WIDTH),
            width = LABEL_WIDTH
        ));
    }
}
