//! Expense service
//!
//! Business logic for expense management on top of the store: validation,
//! audit logging, and merging the expenses of one receipt.

use chrono::{Local, NaiveDate};

use crate::audit::{AuditEntry, EntityType};
use crate::error::{SpendError, SpendResult};
use crate::models::{Expense, ExpenseId, Money, MonthYear, ReceiptId};
use crate::storage::Storage;

/// Service for expense management
pub struct ExpenseService<'a> {
    storage: &'a Storage,
}

/// Input for creating a new expense
#[derive(Debug, Clone)]
pub struct CreateExpenseInput {
    pub date: NaiveDate,
    pub amount: Money,
    pub category: String,
    pub subcategory: String,
    pub description: Option<String>,
    pub owner: Option<String>,
    /// Must name a stored receipt
    pub receipt: Option<ReceiptId>,
}

/// Partial update of an expense; `None` leaves a field untouched
#[derive(Debug, Clone, Default)]
pub struct UpdateExpenseInput {
    pub date: Option<NaiveDate>,
    pub amount: Option<Money>,
    pub category: Option<String>,
    pub subcategory: Option<String>,
    pub description: Option<String>,
    pub owner: Option<String>,
    /// `Some(None)` detaches the expense from its receipt
    pub receipt: Option<Option<ReceiptId>>,
}

impl UpdateExpenseInput {
    pub fn is_empty(&self) -> bool {
        self.date.is_none()
            && self.amount.is_none()
            && self.category.is_none()
            && self.subcategory.is_none()
            && self.description.is_none()
            && self.owner.is_none()
            && self.receipt.is_none()
    }
}

/// Options for listing expenses
#[derive(Debug, Clone, Default)]
pub struct ExpenseFilter {
    pub month: Option<MonthYear>,
    /// Case-insensitive category match
    pub category: Option<String>,
    pub limit: Option<usize>,
}

/// Empty strings clear optional metadata
fn non_empty(value: String) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

fn category_of(expense: &Expense) -> &str {
    &expense.category
}

fn subcategory_of(expense: &Expense) -> &str {
    &expense.subcategory
}

/// The label every expense agrees on, or empty
fn shared_label(expenses: &[Expense], label: fn(&Expense) -> &str) -> String {
    match expenses.first() {
        Some(first) if expenses.iter().all(|e| label(e) == label(first)) => {
            label(first).to_string()
        }
        _ => String::new(),
    }
}

fn audit_label(expense: &Expense) -> Option<String> {
    Some(format!("{} {}", expense.date, expense.category))
}

impl<'a> ExpenseService<'a> {
    pub fn new(storage: &'a Storage) -> Self {
        Self { storage }
    }

    /// Create and store a single expense
    pub fn create(&self, input: CreateExpenseInput) -> SpendResult<Expense> {
        let category = input.category.trim().to_string();
        if category.is_empty() {
            return Err(SpendError::Validation("Category cannot be empty".into()));
        }

        let mut expense = Expense::with_details(
            input.date,
            input.amount,
            category,
            input.subcategory.trim(),
        );
        expense.description = input.description.and_then(non_empty);
        expense.owner = input.owner.and_then(non_empty);
        expense.receipt = input.receipt.map(|id| self.require_receipt(id)).transpose()?;

        self.storage
            .expenses
            .commit(std::slice::from_ref(&expense), &[])?;

        self.storage.log_create(
            EntityType::Expense,
            expense.id.to_string(),
            audit_label(&expense),
            &expense,
        )?;

        tracing::info!(id = %expense.id, amount = %expense.amount, "expense created");

        Ok(expense)
    }

    /// Store already-built expenses in one write
    ///
    /// Used by CSV import; records are stored as given, without category
    /// validation, since uploads may carry empty classifiers.
    pub fn create_batch(&self, expenses: Vec<Expense>) -> SpendResult<Vec<Expense>> {
        if expenses.is_empty() {
            return Ok(expenses);
        }

        self.storage.expenses.commit(&expenses, &[])?;

        let entries: Vec<_> = expenses
            .iter()
            .map(|expense| {
                AuditEntry::create(
                    EntityType::Expense,
                    expense.id.to_string(),
                    audit_label(expense),
                    expense,
                )
            })
            .collect();
        self.storage.log_batch(&entries)?;

        tracing::info!(count = expenses.len(), "expenses created");

        Ok(expenses)
    }

    /// The id of a stored receipt, or not found
    fn require_receipt(&self, id: ReceiptId) -> SpendResult<ReceiptId> {
        self.storage
            .receipts
            .get(id)?
            .map(|receipt| receipt.id)
            .ok_or_else(|| SpendError::receipt_not_found(id.to_string()))
    }

    pub fn get(&self, id: ExpenseId) -> SpendResult<Option<Expense>> {
        self.storage.expenses.get(id)
    }

    /// Find an expense by full UUID, `exp-` short form, or hex prefix
    pub fn find(&self, identifier: &str) -> SpendResult<Option<Expense>> {
        if let Ok(id) = identifier.parse::<ExpenseId>() {
            return self.storage.expenses.get(id);
        }
        self.storage.expenses.find(identifier)
    }

    /// Like [`find`](Self::find) but missing expenses are an error
    pub fn require(&self, identifier: &str) -> SpendResult<Expense> {
        self.find(identifier)?
            .ok_or_else(|| SpendError::expense_not_found(identifier))
    }

    /// List expenses, most recent first
    pub fn list(&self, filter: ExpenseFilter) -> SpendResult<Vec<Expense>> {
        let mut expenses = match filter.month {
            Some(month) => self.storage.expenses.get_by_month(month)?,
            None => self.storage.expenses.get_all()?,
        };

        if let Some(category) = &filter.category {
            expenses.retain(|e| e.category.eq_ignore_ascii_case(category));
        }
        if let Some(limit) = filter.limit {
            expenses.truncate(limit);
        }

        Ok(expenses)
    }

    /// Every stored expense, most recent first
    pub fn all(&self) -> SpendResult<Vec<Expense>> {
        self.storage.expenses.get_all()
    }

    /// Sorted category labels in use
    pub fn categories(&self) -> SpendResult<Vec<String>> {
        self.storage.expenses.categories()
    }

    /// Apply a partial update
    ///
    /// An input with nothing set returns the expense unchanged and writes no
    /// audit entry.
    pub fn update(&self, id: ExpenseId, input: UpdateExpenseInput) -> SpendResult<Expense> {
        let mut expense = self
            .storage
            .expenses
            .get(id)?
            .ok_or_else(|| SpendError::expense_not_found(id.to_string()))?;

        if input.is_empty() {
            return Ok(expense);
        }

        let before = expense.clone();

        if let Some(date) = input.date {
            expense.date = date;
        }
        if let Some(amount) = input.amount {
            expense.amount = amount;
        }
        if let Some(category) = input.category {
            let category = category.trim().to_string();
            if category.is_empty() {
                return Err(SpendError::Validation("Category cannot be empty".into()));
            }
            expense.category = category;
        }
        if let Some(subcategory) = input.subcategory {
            expense.subcategory = subcategory.trim().to_string();
        }
        if let Some(description) = input.description {
            expense.description = non_empty(description);
        }
        if let Some(owner) = input.owner {
            expense.owner = non_empty(owner);
        }
        if let Some(receipt) = input.receipt {
            expense.receipt = receipt.map(|id| self.require_receipt(id)).transpose()?;
        }
        expense.touch();

        self.storage
            .expenses
            .commit(std::slice::from_ref(&expense), &[])?;

        self.storage.log_update(
            EntityType::Expense,
            expense.id.to_string(),
            audit_label(&expense),
            &before,
            &expense,
        )?;

        tracing::info!(id = %expense.id, "expense updated");

        Ok(expense)
    }

    /// Delete an expense, returning what was removed
    pub fn delete(&self, id: ExpenseId) -> SpendResult<Expense> {
        let expense = self
            .storage
            .expenses
            .get(id)?
            .ok_or_else(|| SpendError::expense_not_found(id.to_string()))?;
        self.storage.expenses.commit(&[], &[id])?;

        self.storage.log_delete(
            EntityType::Expense,
            expense.id.to_string(),
            audit_label(&expense),
            &expense,
        )?;

        tracing::info!(id = %expense.id, "expense deleted");

        Ok(expense)
    }

    /// Merge expenses of one receipt into a single new expense
    ///
    /// `receipt` must be in the receipt ledger and every listed expense must
    /// reference it. The new expense is dated
    /// today, carries the receipt, totals the amounts in cents, and keeps the
    /// category and subcategory only when all merged expenses agree on them.
    /// The originals are deleted in the same store write.
    pub fn merge(&self, receipt: ReceiptId, ids: &[ExpenseId]) -> SpendResult<Expense> {
        let receipt = self.require_receipt(receipt)?;
        if ids.len() < 2 {
            return Err(SpendError::Validation(
                "At least two expenses are needed to merge".into(),
            ));
        }

        let mut originals: Vec<Expense> = Vec::with_capacity(ids.len());
        for id in ids {
            if originals.iter().any(|e| e.id == *id) {
                continue;
            }
            let expense = self
                .storage
                .expenses
                .get(*id)?
                .ok_or_else(|| SpendError::expense_not_found(id.to_string()))?;
            if expense.receipt != Some(receipt) {
                return Err(SpendError::Validation(format!(
                    "Expense {} doesn't belong to receipt {}",
                    expense.id, receipt
                )));
            }
            originals.push(expense);
        }
        if originals.len() < 2 {
            return Err(SpendError::Validation(
                "At least two distinct expenses are needed to merge".into(),
            ));
        }

        let total: Money = originals.iter().map(|e| e.amount).sum();
        let mut merged = Expense::with_details(
            Local::now().date_naive(),
            total,
            shared_label(&originals, category_of),
            shared_label(&originals, subcategory_of),
        );
        merged.receipt = Some(receipt);
        merged.owner = originals[0].owner.clone();

        let removed: Vec<ExpenseId> = originals.iter().map(|e| e.id).collect();
        self.storage
            .expenses
            .commit(std::slice::from_ref(&merged), &removed)?;

        let mut entries = vec![AuditEntry::create(
            EntityType::Expense,
            merged.id.to_string(),
            audit_label(&merged),
            &merged,
        )];
        entries.extend(originals.iter().map(|e| {
            AuditEntry::delete(EntityType::Expense, e.id.to_string(), audit_label(e), e)
        }));
        self.storage.log_batch(&entries)?;

        tracing::info!(
            id = %merged.id,
            merged = originals.len(),
            total = %merged.amount,
            "expenses merged"
        );

        Ok(merged)
    }

    pub fn count(&self) -> SpendResult<usize> {
        self.storage.expenses.count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audit::Operation;
    use crate::config::paths::SpendPaths;
    use crate::models::Receipt;
    use tempfile::TempDir;

    fn create_test_storage() -> (TempDir, Storage) {
        let temp_dir = TempDir::new().unwrap();
        let paths = SpendPaths::with_base_dir(temp_dir.path().to_path_buf());
        let mut storage = Storage::new(paths).unwrap();
        storage.load_all().unwrap();
        (temp_dir, storage)
    }

    fn stored_receipt(storage: &Storage) -> ReceiptId {
        let receipt = Receipt::new("Corner shop", NaiveDate::from_ymd_opt(2024, 3, 10).unwrap());
        storage.receipts.commit(&[receipt.clone()], &[]).unwrap();
        receipt.id
    }

    fn input(cents: i64, category: &str, receipt: Option<ReceiptId>) -> CreateExpenseInput {
        CreateExpenseInput {
            date: NaiveDate::from_ymd_opt(2024, 3, 10).unwrap(),
            amount: Money::from_cents(cents),
            category: category.to_string(),
            subcategory: "lunch".to_string(),
            description: None,
            owner: Some("ana@example.com".to_string()),
            receipt,
        }
    }

    #[test]
    fn test_create_and_find() {
        let (_temp_dir, storage) = create_test_storage();
        let service = ExpenseService::new(&storage);

        let expense = service.create(input(1250, " food ", None)).unwrap();
        assert_eq!(expense.category, "food");

        let found = service.find(&expense.id.to_string()).unwrap().unwrap();
        assert_eq!(found.id, expense.id);
        let found = service.find(&expense.id.as_uuid().to_string()).unwrap().unwrap();
        assert_eq!(found.id, expense.id);

        assert!(service.require("exp-ffffffff").unwrap_err().is_not_found());
    }

    #[test]
    fn test_create_rejects_empty_category() {
        let (_temp_dir, storage) = create_test_storage();
        let service = ExpenseService::new(&storage);

        let err = service.create(input(100, "  ", None)).unwrap_err();
        assert!(err.is_validation());
        assert_eq!(service.count().unwrap(), 0);
    }

    #[test]
    fn test_list_filters() {
        let (_temp_dir, storage) = create_test_storage();
        let service = ExpenseService::new(&storage);

        service.create(input(100, "food", None)).unwrap();
        service.create(input(200, "Transport", None)).unwrap();
        let mut april = input(300, "food", None);
        april.date = NaiveDate::from_ymd_opt(2024, 4, 1).unwrap();
        service.create(april).unwrap();

        let march = service
            .list(ExpenseFilter {
                month: Some(MonthYear::new(2024, 3).unwrap()),
                ..Default::default()
            })
            .unwrap();
        assert_eq!(march.len(), 2);

        let food = service
            .list(ExpenseFilter {
                category: Some("FOOD".into()),
                ..Default::default()
            })
            .unwrap();
        assert_eq!(food.len(), 2);
        assert_eq!(food[0].amount.cents(), 300);

        let limited = service
            .list(ExpenseFilter {
                limit: Some(1),
                ..Default::default()
            })
            .unwrap();
        assert_eq!(limited.len(), 1);
    }

    #[test]
    fn test_update_and_audit() {
        let (_temp_dir, storage) = create_test_storage();
        let service = ExpenseService::new(&storage);
        let expense = service.create(input(100, "food", None)).unwrap();

        let unchanged = service
            .update(expense.id, UpdateExpenseInput::default())
            .unwrap();
        assert_eq!(unchanged, expense);

        let updated = service
            .update(
                expense.id,
                UpdateExpenseInput {
                    amount: Some(Money::from_cents(450)),
                    owner: Some(String::new()),
                    ..Default::default()
                },
            )
            .unwrap();
        assert_eq!(updated.amount.cents(), 450);
        assert_eq!(updated.owner, None);

        let entries = storage.audit().read_all().unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[1].operation, Operation::Update);
        assert!(entries[1]
            .diff_summary
            .as_deref()
            .unwrap()
            .contains("amount: 100 -> 450"));
    }

    #[test]
    fn test_delete() {
        let (_temp_dir, storage) = create_test_storage();
        let service = ExpenseService::new(&storage);
        let expense = service.create(input(100, "food", None)).unwrap();

        service.delete(expense.id).unwrap();
        assert_eq!(service.count().unwrap(), 0);
        assert!(service.delete(expense.id).unwrap_err().is_not_found());
    }

    #[test]
    fn test_unknown_receipt_is_rejected() {
        let (_temp_dir, storage) = create_test_storage();
        let service = ExpenseService::new(&storage);

        let err = service
            .create(input(100, "food", Some(ReceiptId::new())))
            .unwrap_err();
        assert!(err.is_not_found());

        let receipt = stored_receipt(&storage);
        let expense = service.create(input(100, "food", Some(receipt))).unwrap();
        let detached = service
            .update(
                expense.id,
                UpdateExpenseInput {
                    receipt: Some(None),
                    ..Default::default()
                },
            )
            .unwrap();
        assert_eq!(detached.receipt, None);
        assert!(storage.expenses.get_by_receipt(receipt).unwrap().is_empty());
    }

    #[test]
    fn test_merge_sums_in_cents_and_removes_originals() {
        let (_temp_dir, storage) = create_test_storage();
        let service = ExpenseService::new(&storage);
        let receipt = stored_receipt(&storage);

        let a = service.create(input(110, "food", Some(receipt))).unwrap();
        let b = service.create(input(110, "food", Some(receipt))).unwrap();
        let c = service.create(input(330, "food", Some(receipt))).unwrap();

        let merged = service.merge(receipt, &[a.id, b.id, c.id]).unwrap();
        assert_eq!(merged.amount.cents(), 550);
        assert_eq!(merged.category, "food");
        assert_eq!(merged.subcategory, "lunch");
        assert_eq!(merged.receipt, Some(receipt));

        assert_eq!(service.count().unwrap(), 1);
        assert!(service.get(a.id).unwrap().is_none());
        assert_eq!(storage.expenses.get_by_receipt(receipt).unwrap().len(), 1);
    }

    #[test]
    fn test_failed_write_leaves_store_unchanged() {
        let (_temp_dir, storage) = create_test_storage();
        let service = ExpenseService::new(&storage);
        let receipt = stored_receipt(&storage);

        let a = service.create(input(110, "food", Some(receipt))).unwrap();
        let b = service.create(input(220, "food", Some(receipt))).unwrap();

        let data_file = storage.paths().expenses_file();
        std::fs::remove_file(&data_file).unwrap();
        std::fs::create_dir(&data_file).unwrap();

        let batch = vec![Expense::with_details(
            NaiveDate::from_ymd_opt(2024, 3, 11).unwrap(),
            Money::from_cents(500),
            "home",
            "",
        )];
        assert!(service.create_batch(batch).is_err());
        assert!(service.merge(receipt, &[a.id, b.id]).is_err());
        assert!(service.delete(a.id).is_err());

        assert_eq!(service.count().unwrap(), 2);
        assert_eq!(storage.expenses.get_by_receipt(receipt).unwrap().len(), 2);
        assert_eq!(service.get(b.id).unwrap().unwrap().amount.cents(), 220);
    }

    #[test]
    fn test_merge_drops_classifiers_that_differ() {
        let (_temp_dir, storage) = create_test_storage();
        let service = ExpenseService::new(&storage);
        let receipt = stored_receipt(&storage);

        let a = service.create(input(100, "food", Some(receipt))).unwrap();
        let b = service.create(input(200, "home", Some(receipt))).unwrap();

        let merged = service.merge(receipt, &[a.id, b.id]).unwrap();
        assert_eq!(merged.category, "");
        assert_eq!(merged.subcategory, "lunch");
    }

    #[test]
    fn test_merge_rejects_foreign_receipt() {
        let (_temp_dir, storage) = create_test_storage();
        let service = ExpenseService::new(&storage);
        let (r1, r2) = (stored_receipt(&storage), stored_receipt(&storage));

        let a = service.create(input(100, "food", Some(r1))).unwrap();
        let b = service.create(input(200, "food", Some(r2))).unwrap();
        let c = service.create(input(300, "food", None)).unwrap();

        assert!(service.merge(r1, &[a.id, b.id]).unwrap_err().is_validation());
        assert!(service.merge(r1, &[a.id, c.id]).unwrap_err().is_validation());
        assert!(service.merge(r1, &[a.id]).unwrap_err().is_validation());
        assert!(service.merge(r1, &[a.id, a.id]).unwrap_err().is_validation());
        assert_eq!(service.count().unwrap(), 3);
    }

    #[test]
    fn test_merge_requires_receipt_in_ledger() {
        let (_temp_dir, storage) = create_test_storage();
        let service = ExpenseService::new(&storage);
        let receipt = stored_receipt(&storage);

        let a = service.create(input(100, "food", Some(receipt))).unwrap();
        let b = service.create(input(200, "food", Some(receipt))).unwrap();
        storage.receipts.commit(&[], &[receipt]).unwrap();

        let err = service.merge(receipt, &[a.id, b.id]).unwrap_err();
        assert!(err.is_not_found());
        assert_eq!(service.count().unwrap(), 2);
    }
}
