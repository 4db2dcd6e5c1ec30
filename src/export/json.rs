//! JSON export
//!
//! Exports every stored expense and receipt with schema versioning.

use std::collections::HashSet;
use std::io::Write;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{SpendError, SpendResult};
use crate::models::{Expense, Money, MonthYear, Receipt};
use crate::storage::Storage;

/// Current export schema version
pub const EXPORT_SCHEMA_VERSION: &str = "1.0.0";

/// Full database export structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FullExport {
    /// Schema version for compatibility checking
    pub schema_version: String,

    pub exported_at: DateTime<Utc>,

    /// Application version that created the export
    pub app_version: String,

    /// All expenses, most recent first
    pub expenses: Vec<Expense>,

    /// Receipt ledger, most recent first
    #[serde(default)]
    pub receipts: Vec<Receipt>,

    pub metadata: ExportMetadata,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportMetadata {
    pub expense_count: usize,
    #[serde(default)]
    pub receipt_count: usize,
    pub category_count: usize,
    pub total: Money,
    pub earliest_expense: Option<String>,
    pub latest_expense: Option<String>,
}

impl FullExport {
    pub fn from_storage(storage: &Storage) -> SpendResult<Self> {
        Ok(Self::from_expenses(storage.expenses.get_all()?)
            .with_receipts(storage.receipts.get_all()?))
    }

    pub fn with_receipts(mut self, receipts: Vec<Receipt>) -> Self {
        self.metadata.receipt_count = receipts.len();
        self.receipts = receipts;
        self
    }

    pub fn from_expenses(expenses: Vec<Expense>) -> Self {
        let categories: HashSet<&str> = expenses.iter().map(|e| e.category.as_str()).collect();

        let metadata = ExportMetadata {
            expense_count: expenses.len(),
            receipt_count: 0,
            category_count: categories.len(),
            total: expenses.iter().map(|e| e.amount).sum(),
            earliest_expense: expenses.iter().map(|e| e.date).min().map(|d| d.to_string()),
            latest_expense: expenses.iter().map(|e| e.date).max().map(|d| d.to_string()),
        };

        Self {
            schema_version: EXPORT_SCHEMA_VERSION.to_string(),
            exported_at: Utc::now(),
            app_version: env!("CARGO_PKG_VERSION").to_string(),
            expenses,
            receipts: Vec::new(),
            metadata,
        }
    }

    /// Check the schema version and that each expense has a unique id, a
    /// 4-digit year, and a receipt present in the export
    pub fn validate(&self) -> Result<(), String> {
        if self.schema_version != EXPORT_SCHEMA_VERSION {
            return Err(format!(
                "Schema version mismatch: expected {}, got {}",
                EXPORT_SCHEMA_VERSION, self.schema_version
            ));
        }

        let receipts: HashSet<_> = self.receipts.iter().map(|r| r.id).collect();
        let mut seen = HashSet::new();
        for expense in &self.expenses {
            if let Some(receipt) = expense.receipt.filter(|r| !receipts.contains(r)) {
                return Err(format!(
                    "Expense {} refers to missing receipt {}",
                    expense.id, receipt
                ));
            }
            if !seen.insert(expense.id) {
                return Err(format!("Expense {} appears more than once", expense.id));
            }
            if MonthYear::try_from_date(expense.date).is_err() {
                return Err(format!("Expense {} has out-of-range date {}", expense.id, expense.date));
            }
        }

        if self.metadata.expense_count != self.expenses.len() {
            return Err(format!(
                "Metadata lists {} expenses, found {}",
                self.metadata.expense_count,
                self.expenses.len()
            ));
        }

        Ok(())
    }
}

/// Export the full database to JSON
pub fn export_full_json<W: Write>(storage: &Storage, writer: W, pretty: bool) -> SpendResult<()> {
    let export = FullExport::from_storage(storage)?;

    if pretty {
        serde_json::to_writer_pretty(writer, &export)
    } else {
        serde_json::to_writer(writer, &export)
    }
    .map_err(|e| SpendError::Export(e.to_string()))?;

    Ok(())
}

/// Read back a JSON export, validating it
pub fn import_from_json(json_str: &str) -> SpendResult<FullExport> {
    let export: FullExport = serde_json::from_str(json_str)
        .map_err(|e| SpendError::Validation(format!("Invalid export file: {}", e)))?;

    export.validate().map_err(SpendError::Validation)?;

    Ok(export)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SpendPaths;
    use chrono::NaiveDate;
    use tempfile::TempDir;

    fn create_test_storage() -> (TempDir, Storage) {
        let temp_dir = TempDir::new().unwrap();
        let paths = SpendPaths::with_base_dir(temp_dir.path().to_path_buf());
        let mut storage = Storage::new(paths).unwrap();
        storage.load_all().unwrap();
        (temp_dir, storage)
    }

    fn add(storage: &Storage, day: u32, cents: i64, category: &str) {
        let expense = Expense::with_details(
            NaiveDate::from_ymd_opt(2024, 3, day).unwrap(),
            Money::from_cents(cents),
            category,
            "",
        );
        storage.expenses.upsert(expense).unwrap();
    }

    #[test]
    fn test_full_export_metadata() {
        let (_temp_dir, storage) = create_test_storage();
        add(&storage, 1, 1000, "food");
        add(&storage, 15, 250, "food");
        add(&storage, 9, 4000, "home");

        let export = FullExport::from_storage(&storage).unwrap();

        assert_eq!(export.schema_version, EXPORT_SCHEMA_VERSION);
        assert_eq!(export.metadata.expense_count, 3);
        assert_eq!(export.metadata.category_count, 2);
        assert_eq!(export.metadata.total, Money::from_cents(5250));
        assert_eq!(export.metadata.earliest_expense.as_deref(), Some("2024-03-01"));
        assert_eq!(export.metadata.latest_expense.as_deref(), Some("2024-03-15"));
        assert!(export.validate().is_ok());
    }

    #[test]
    fn test_json_roundtrip() {
        let (_temp_dir, storage) = create_test_storage();
        add(&storage, 2, 282, "food");

        let mut output = Vec::new();
        export_full_json(&storage, &mut output, true).unwrap();

        let imported = import_from_json(&String::from_utf8(output).unwrap()).unwrap();
        assert_eq!(imported.expenses.len(), 1);
        assert_eq!(imported.expenses[0].category, "food");
        assert_eq!(imported.expenses[0].amount.cents(), 282);
    }

    #[test]
    fn test_validate_rejects_duplicates_and_old_schema() {
        let expense = Expense::new(NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(), Money::zero());
        let mut export = FullExport::from_expenses(vec![expense.clone(), expense]);
        assert!(export.validate().is_err());

        export.expenses.pop();
        export.metadata.expense_count = 1;
        assert!(export.validate().is_ok());

        export.schema_version = "0.1.0".into();
        assert!(export.validate().unwrap_err().contains("Schema version"));
    }

    #[test]
    fn test_validate_rejects_year_past_four_digits() {
        let expense = Expense::new(NaiveDate::from_ymd_opt(12345, 1, 1).unwrap(), Money::zero());
        let export = FullExport::from_expenses(vec![expense]);
        assert!(export.validate().unwrap_err().contains("out-of-range date"));
    }

    #[test]
    fn test_receipts_are_exported_and_checked() {
        let (_temp_dir, storage) = create_test_storage();
        let receipt = Receipt::new("Lidl", NaiveDate::from_ymd_opt(2024, 3, 2).unwrap());
        storage.receipts.commit(&[receipt.clone()], &[]).unwrap();
        let mut expense = Expense::with_details(
            receipt.date,
            Money::from_cents(990),
            "food",
            "",
        );
        expense.receipt = Some(receipt.id);
        storage.expenses.upsert(expense).unwrap();

        let mut export = FullExport::from_storage(&storage).unwrap();
        assert_eq!(export.metadata.receipt_count, 1);
        assert_eq!(export.receipts[0].vendor, "Lidl");
        assert!(export.validate().is_ok());

        export.receipts.clear();
        assert!(export.validate().unwrap_err().contains("missing receipt"));
    }
}
