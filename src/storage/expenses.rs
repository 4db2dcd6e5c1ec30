//! Expense repository for JSON storage
//!
//! Keeps `expenses.json` in memory behind a `RwLock`, with a secondary index
//! from receipt id to the expenses extracted from that receipt.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::RwLock;

use crate::error::SpendError;
use crate::models::{Expense, ExpenseId, MonthYear, ReceiptId};

use super::file_io::{read_json, write_json_atomic};

#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
struct ExpenseData {
    expenses: Vec<Expense>,
}

fn read_lock_error<E: std::fmt::Display>(e: E) -> SpendError {
    SpendError::Storage(format!("Failed to acquire read lock: {}", e))
}

fn write_lock_error<E: std::fmt::Display>(e: E) -> SpendError {
    SpendError::Storage(format!("Failed to acquire write lock: {}", e))
}

/// Most recent first; newer records first within the same day
fn sort_most_recent_first(expenses: &mut [Expense]) {
    expenses.sort_by(|a, b| b.date.cmp(&a.date).then(b.created_at.cmp(&a.created_at)));
}

fn receipt_index(data: &HashMap<ExpenseId, Expense>) -> HashMap<ReceiptId, Vec<ExpenseId>> {
    let mut index: HashMap<ReceiptId, Vec<ExpenseId>> = HashMap::new();
    for expense in data.values() {
        if let Some(receipt) = &expense.receipt {
            index.entry(*receipt).or_default().push(expense.id);
        }
    }
    index
}

/// Repository for expense persistence
pub struct ExpenseRepository {
    path: PathBuf,
    data: RwLock<HashMap<ExpenseId, Expense>>,
    /// Index: receipt -> expense ids
    by_receipt: RwLock<HashMap<ReceiptId, Vec<ExpenseId>>>,
}

impl ExpenseRepository {
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            data: RwLock::new(HashMap::new()),
            by_receipt: RwLock::new(HashMap::new()),
        }
    }

    /// Load expenses from disk and rebuild the receipt index
    pub fn load(&self) -> Result<(), SpendError> {
        let file_data: ExpenseData = read_json(&self.path)?;

        let mut data = self.data.write().map_err(write_lock_error)?;
        let mut by_receipt = self.by_receipt.write().map_err(write_lock_error)?;

        *data = file_data
            .expenses
            .into_iter()
            .map(|expense| (expense.id, expense))
            .collect();
        *by_receipt = receipt_index(&data);

        Ok(())
    }

    /// Save expenses to disk, most recent first
    pub fn save(&self) -> Result<(), SpendError> {
        let data = self.data.read().map_err(read_lock_error)?;

        let mut expenses: Vec<_> = data.values().cloned().collect();
        sort_most_recent_first(&mut expenses);

        write_json_atomic(&self.path, &ExpenseData { expenses })
    }

    /// Insert `upserts` and remove `removals` as one change
    ///
    /// The changed set is written to disk first and only becomes visible in
    /// memory once that write succeeds. On error the repository is untouched.
    pub fn commit(&self, upserts: &[Expense], removals: &[ExpenseId]) -> Result<(), SpendError> {
        let mut data = self.data.write().map_err(write_lock_error)?;
        let mut by_receipt = self.by_receipt.write().map_err(write_lock_error)?;

        let mut staged = data.clone();
        for expense in upserts {
            staged.insert(expense.id, expense.clone());
        }
        for id in removals {
            staged.remove(id);
        }

        let mut expenses: Vec<_> = staged.values().cloned().collect();
        sort_most_recent_first(&mut expenses);
        write_json_atomic(&self.path, &ExpenseData { expenses })?;

        *by_receipt = receipt_index(&staged);
        *data = staged;
        Ok(())
    }

    pub fn get(&self, id: ExpenseId) -> Result<Option<Expense>, SpendError> {
        let data = self.data.read().map_err(read_lock_error)?;
        Ok(data.get(&id).cloned())
    }

    /// Find the expense a user-typed identifier refers to
    ///
    /// An ambiguous short prefix is reported as a validation error.
    pub fn find(&self, identifier: &str) -> Result<Option<Expense>, SpendError> {
        let data = self.data.read().map_err(read_lock_error)?;

        let mut matches = data.values().filter(|e| e.id.matches(identifier));
        let first = matches.next().cloned();
        if first.is_some() && matches.next().is_some() {
            return Err(SpendError::Validation(format!(
                "Identifier '{}' matches more than one expense",
                identifier
            )));
        }
        Ok(first)
    }

    /// All expenses, most recent first
    pub fn get_all(&self) -> Result<Vec<Expense>, SpendError> {
        let data = self.data.read().map_err(read_lock_error)?;

        let mut expenses: Vec<_> = data.values().cloned().collect();
        sort_most_recent_first(&mut expenses);
        Ok(expenses)
    }

    /// Expenses falling in one calendar month, most recent first
    pub fn get_by_month(&self, month: MonthYear) -> Result<Vec<Expense>, SpendError> {
        let mut expenses: Vec<_> = {
            let data = self.data.read().map_err(read_lock_error)?;
            data.values()
                .filter(|e| month.contains(e.date))
                .cloned()
                .collect()
        };
        sort_most_recent_first(&mut expenses);
        Ok(expenses)
    }

    /// Expenses extracted from the given receipt
    pub fn get_by_receipt(&self, receipt: ReceiptId) -> Result<Vec<Expense>, SpendError> {
        let data = self.data.read().map_err(read_lock_error)?;
        let by_receipt = self.by_receipt.read().map_err(read_lock_error)?;

        let ids = by_receipt.get(&receipt).map(|v| v.as_slice()).unwrap_or(&[]);
        let mut expenses: Vec<_> = ids.iter().filter_map(|id| data.get(id).cloned()).collect();
        sort_most_recent_first(&mut expenses);
        Ok(expenses)
    }

    /// Insert or replace an expense
    pub fn upsert(&self, expense: Expense) -> Result<(), SpendError> {
        let mut data = self.data.write().map_err(write_lock_error)?;
        let mut by_receipt = self.by_receipt.write().map_err(write_lock_error)?;

        if let Some(old_receipt) = data.get(&expense.id).and_then(|old| old.receipt) {
            if let Some(ids) = by_receipt.get_mut(&old_receipt) {
                ids.retain(|&id| id != expense.id);
            }
        }
        if let Some(receipt) = expense.receipt {
            by_receipt.entry(receipt).or_default().push(expense.id);
        }

        data.insert(expense.id, expense);
        Ok(())
    }

    /// Sorted, de-duplicated category labels in use
    pub fn categories(&self) -> Result<Vec<String>, SpendError> {
        let data = self.data.read().map_err(read_lock_error)?;

        let mut categories: Vec<String> = data.values().map(|e| e.category.clone()).collect();
        categories.sort();
        categories.dedup();
        Ok(categories)
    }

    pub fn count(&self) -> Result<usize, SpendError> {
        let data = self.data.read().map_err(read_lock_error)?;
        Ok(data.len())
    }
}
