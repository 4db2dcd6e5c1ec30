//! Top subcategories ranker
//!
//! Ranks the subcategories of one month by total spend. Unlike the
//! aggregation tables, totals here are summed in integer cents.

use std::collections::HashMap;

use crate::models::{Expense, Money, MonthYear};

/// How many subcategories the dashboard shows
pub const TOP_SUBCATEGORIES: usize = 3;

/// Total spent on one subcategory in one month
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryAggregate {
    /// Subcategory label, spelled as first seen
    pub category: String,
    pub month_year: MonthYear,
    pub total: Money,
}

impl CategoryAggregate {
    pub fn total_amount(&self) -> f32 {
        self.total.to_amount()
    }
}

/// The [`TOP_SUBCATEGORIES`] biggest subcategories of a month
pub fn top_subcategories(expenses: &[Expense], month: MonthYear) -> Vec<CategoryAggregate> {
    top_subcategories_limit(expenses, month, TOP_SUBCATEGORIES)
}

/// The `limit` biggest subcategories of a month, largest first
///
/// Expenses outside the month or without a subcategory are ignored.
/// Subcategories that differ only in case are one group. Ties keep the
/// order in which the subcategories were first seen.
pub fn top_subcategories_limit(
    expenses: &[Expense],
    month: MonthYear,
    limit: usize,
) -> Vec<CategoryAggregate> {
    let mut aggregates: Vec<CategoryAggregate> = Vec::new();
    let mut positions: HashMap<String, usize> = HashMap::new();

    for expense in expenses
        .iter()
        .filter(|e| e.has_subcategory() && e.month_year() == month)
    {
        let key = expense.subcategory.to_lowercase();
        match positions.get(&key) {
            Some(&idx) => aggregates[idx].total += expense.amount,
            None => {
                positions.insert(key, aggregates.len());
                aggregates.push(CategoryAggregate {
                    category: expense.subcategory.clone(),
                    month_year: month,
                    total: expense.amount,
                });
            }
        }
    }

    // Stable sort keeps first-seen order among equal totals
    aggregates.sort_by(|a, b| b.total.cmp(&a.total));
    aggregates.truncate(limit);
    aggregates
}
