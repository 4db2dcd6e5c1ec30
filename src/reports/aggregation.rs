//! Aggregation engine
//!
//! Folds a list of expenses into two-level sparse tables of floating totals.
//! All three aggregations share [`SparseTable`]: per month and category, per
//! month and subcategory, and per category and month for trends.
//!
//! Sums are accumulated in `f32`, one [`Money::to_amount`] at a time, so the
//! result for a cell is the floating sum of its amounts in input order.
//!
//! [`Money::to_amount`]: crate::models::Money::to_amount

use std::collections::hash_map::{self, HashMap};
use std::hash::Hash;

use crate::models::{Expense, MonthYear};

/// Two-level sparse table of totals
///
/// Absent cells read as zero; nothing is zero-filled. Iteration order of the
/// underlying maps is unspecified, so key accessors return sorted vectors.
#[derive(Debug, Clone, PartialEq)]
pub struct SparseTable<R: Eq + Hash, C: Eq + Hash> {
    rows: HashMap<R, HashMap<C, f32>>,
}

impl<R: Eq + Hash, C: Eq + Hash> Default for SparseTable<R, C> {
    fn default() -> Self {
        Self {
            rows: HashMap::new(),
        }
    }
}

impl<R: Eq + Hash, C: Eq + Hash> SparseTable<R, C> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an amount to a cell, creating it if needed
    pub fn add(&mut self, row: R, column: C, amount: f32) {
        *self.rows.entry(row).or_default().entry(column).or_insert(0.0) += amount;
    }

    /// The stored total of a cell, if any amount was added to it
    pub fn get(&self, row: &R, column: &C) -> Option<f32> {
        self.rows.get(row).and_then(|cols| cols.get(column)).copied()
    }

    /// The total of a cell, reading absent cells as zero
    pub fn value(&self, row: &R, column: &C) -> f32 {
        self.get(row, column).unwrap_or(0.0)
    }

    pub fn row(&self, row: &R) -> Option<&HashMap<C, f32>> {
        self.rows.get(row)
    }

    /// Number of rows
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// All populated cells, in unspecified order
    pub fn iter(&self) -> impl Iterator<Item = (&R, &C, f32)> + '_ {
        self.rows
            .iter()
            .flat_map(|(r, cols)| cols.iter().map(move |(c, v)| (r, c, *v)))
    }

    pub fn rows(&self) -> hash_map::Iter<'_, R, HashMap<C, f32>> {
        self.rows.iter()
    }
}

impl<R: Eq + Hash + Ord + Clone, C: Eq + Hash + Ord + Clone> SparseTable<R, C> {
    /// Sorted outer keys
    pub fn row_keys(&self) -> Vec<R> {
        let mut keys: Vec<R> = self.rows.keys().cloned().collect();
        keys.sort();
        keys
    }

    /// Sorted, de-duplicated inner keys across every row
    pub fn column_keys(&self) -> Vec<C> {
        let mut keys: Vec<C> = self
            .rows
            .values()
            .flat_map(|cols| cols.keys().cloned())
            .collect();
        keys.sort();
        keys.dedup();
        keys
    }
}

/// Totals per month, then per category
pub fn totals_by_category(expenses: &[Expense]) -> SparseTable<MonthYear, String> {
    let mut table = SparseTable::new();
    for expense in expenses {
        table.add(
            expense.month_year(),
            expense.category.clone(),
            expense.amount.to_amount(),
        );
    }
    table
}

/// Totals per month, then per subcategory
///
/// Empty subcategories are kept as their own `""` bucket.
pub fn totals_by_subcategory(expenses: &[Expense]) -> SparseTable<MonthYear, String> {
    let mut table = SparseTable::new();
    for expense in expenses {
        table.add(
            expense.month_year(),
            expense.subcategory.clone(),
            expense.amount.to_amount(),
        );
    }
    table
}

/// Totals per category, then per month
pub fn month_over_month_totals(expenses: &[Expense]) -> SparseTable<String, MonthYear> {
    let mut table = SparseTable::new();
    for expense in expenses {
        table.add(
            expense.category.clone(),
            expense.month_year(),
            expense.amount.to_amount(),
        );
    }
    table
}
