//! Receipt service
//!
//! The receipt ledger: receipts are created pending review, can be edited and
//! signed off, and own the expenses extracted from them. Moving a receipt's
//! date moves its expenses; deleting a receipt deletes them.

use chrono::NaiveDate;

use crate::audit::{AuditEntry, EntityType};
use crate::error::{SpendError, SpendResult};
use crate::models::{Expense, Money, MonthYear, Receipt, ReceiptId};
use crate::storage::Storage;

/// Category given to the expense recorded together with a new receipt
pub const RECEIPT_CATEGORY: &str = "Receipt Upload";

/// Service for the receipt ledger
pub struct ReceiptService<'a> {
    storage: &'a Storage,
}

/// Input for creating a receipt
#[derive(Debug, Clone)]
pub struct CreateReceiptInput {
    pub vendor: String,
    pub date: NaiveDate,
    /// When positive, an expense for this amount is recorded with the receipt
    pub amount: Option<Money>,
    pub description: Option<String>,
    pub owner: Option<String>,
}

/// Partial update of a receipt; `None` leaves a field untouched
#[derive(Debug, Clone, Default)]
pub struct UpdateReceiptInput {
    pub vendor: Option<String>,
    pub date: Option<NaiveDate>,
    pub pending_review: Option<bool>,
}

impl UpdateReceiptInput {
    pub fn is_empty(&self) -> bool {
        self.vendor.is_none() && self.date.is_none() && self.pending_review.is_none()
    }
}

/// What a receipt deletion removed
#[derive(Debug, Clone)]
pub struct DeletedReceipt {
    pub receipt: Receipt,
    pub expenses: Vec<Expense>,
}

fn audit_label(receipt: &Receipt) -> Option<String> {
    Some(format!("{} {}", receipt.date, receipt.vendor))
}

fn expense_label(expense: &Expense) -> Option<String> {
    Some(format!("{} {}", expense.date, expense.category))
}

impl<'a> ReceiptService<'a> {
    pub fn new(storage: &'a Storage) -> Self {
        Self { storage }
    }

    /// Create a receipt pending review, plus its expense when an amount is given
    pub fn create(&self, input: CreateReceiptInput) -> SpendResult<(Receipt, Option<Expense>)> {
        MonthYear::try_from_date(input.date)
            .map_err(|e| SpendError::Validation(format!("Invalid receipt date: {}", e)))?;

        let receipt = Receipt::new(input.vendor.trim(), input.date);

        let expense = input.amount.filter(|a| a.cents() > 0).map(|amount| {
            let mut expense = Expense::with_details(receipt.date, amount, RECEIPT_CATEGORY, "");
            expense.receipt = Some(receipt.id);
            expense.description = input.description.clone().filter(|d| !d.trim().is_empty());
            expense.owner = input.owner.clone().filter(|o| !o.trim().is_empty());
            expense
        });

        self.storage
            .receipts
            .commit(std::slice::from_ref(&receipt), &[])?;
        if let Some(expense) = &expense {
            if let Err(e) = self.storage.expenses.commit(std::slice::from_ref(expense), &[]) {
                self.storage.receipts.commit(&[], &[receipt.id])?;
                return Err(e);
            }
        }

        let mut entries = vec![AuditEntry::create(
            EntityType::Receipt,
            receipt.id.to_string(),
            audit_label(&receipt),
            &receipt,
        )];
        if let Some(expense) = &expense {
            entries.push(AuditEntry::create(
                EntityType::Expense,
                expense.id.to_string(),
                expense_label(expense),
                expense,
            ));
        }
        self.storage.log_batch(&entries)?;

        tracing::info!(id = %receipt.id, vendor = %receipt.vendor, "receipt created");

        Ok((receipt, expense))
    }

    pub fn get(&self, id: ReceiptId) -> SpendResult<Option<Receipt>> {
        self.storage.receipts.get(id)
    }

    /// Find a receipt by full UUID, `rcp-` short form, or hex prefix
    pub fn find(&self, identifier: &str) -> SpendResult<Option<Receipt>> {
        if let Ok(id) = identifier.parse::<ReceiptId>() {
            return self.storage.receipts.get(id);
        }
        self.storage.receipts.find(identifier)
    }

    pub fn require(&self, identifier: &str) -> SpendResult<Receipt> {
        self.find(identifier)?
            .ok_or_else(|| SpendError::receipt_not_found(identifier))
    }

    /// Every receipt, most recent first
    pub fn list(&self) -> SpendResult<Vec<Receipt>> {
        self.storage.receipts.get_all()
    }

    pub fn list_pending_review(&self) -> SpendResult<Vec<Receipt>> {
        self.storage.receipts.get_pending_review()
    }

    pub fn list_for_month(&self, month: MonthYear) -> SpendResult<Vec<Receipt>> {
        self.storage.receipts.get_by_month(month)
    }

    pub fn list_current_month(&self) -> SpendResult<Vec<Receipt>> {
        self.list_for_month(MonthYear::current())
    }

    pub fn list_previous_month(&self) -> SpendResult<Vec<Receipt>> {
        self.list_for_month(MonthYear::current().prev())
    }

    /// Expenses extracted from a receipt
    pub fn expenses(&self, id: ReceiptId) -> SpendResult<Vec<Expense>> {
        self.storage.expenses.get_by_receipt(id)
    }

    /// Apply a partial update
    ///
    /// A new date is copied onto every expense of the receipt.
    pub fn update(&self, id: ReceiptId, input: UpdateReceiptInput) -> SpendResult<Receipt> {
        let before = self
            .storage
            .receipts
            .get(id)?
            .ok_or_else(|| SpendError::receipt_not_found(id.to_string()))?;

        if input.is_empty() {
            return Ok(before);
        }

        let mut receipt = before.clone();
        if let Some(vendor) = input.vendor {
            receipt.vendor = vendor.trim().to_string();
        }
        if let Some(pending) = input.pending_review {
            receipt.pending_review = pending;
        }
        let mut moved = Vec::new();
        if let Some(date) = input.date {
            MonthYear::try_from_date(date)
                .map_err(|e| SpendError::Validation(format!("Invalid receipt date: {}", e)))?;
            receipt.date = date;
            if date != before.date {
                moved = self.storage.expenses.get_by_receipt(id)?;
                for expense in &mut moved {
                    expense.date = date;
                    expense.touch();
                }
            }
        }
        receipt.touch();

        self.storage
            .receipts
            .commit(std::slice::from_ref(&receipt), &[])?;
        if !moved.is_empty() {
            if let Err(e) = self.storage.expenses.commit(&moved, &[]) {
                self.storage
                    .receipts
                    .commit(std::slice::from_ref(&before), &[])?;
                return Err(e);
            }
        }

        self.storage.log_update(
            EntityType::Receipt,
            receipt.id.to_string(),
            audit_label(&receipt),
            &before,
            &receipt,
        )?;

        tracing::info!(id = %receipt.id, moved = moved.len(), "receipt updated");

        Ok(receipt)
    }

    /// Set or clear the pending-review flag
    pub fn set_pending_review(&self, id: ReceiptId, pending: bool) -> SpendResult<Receipt> {
        self.update(
            id,
            UpdateReceiptInput {
                pending_review: Some(pending),
                ..Default::default()
            },
        )
    }

    /// Delete a receipt together with its expenses
    pub fn delete(&self, id: ReceiptId) -> SpendResult<DeletedReceipt> {
        let receipt = self
            .storage
            .receipts
            .get(id)?
            .ok_or_else(|| SpendError::receipt_not_found(id.to_string()))?;
        let expenses = self.storage.expenses.get_by_receipt(id)?;
        let expense_ids: Vec<_> = expenses.iter().map(|e| e.id).collect();

        self.storage.expenses.commit(&[], &expense_ids)?;
        if let Err(e) = self.storage.receipts.commit(&[], &[id]) {
            self.storage.expenses.commit(&expenses, &[])?;
            return Err(e);
        }

        let mut entries = vec![AuditEntry::delete(
            EntityType::Receipt,
            receipt.id.to_string(),
            audit_label(&receipt),
            &receipt,
        )];
        entries.extend(expenses.iter().map(|e| {
            AuditEntry::delete(EntityType::Expense, e.id.to_string(), expense_label(e), e)
        }));
        self.storage.log_batch(&entries)?;

        tracing::info!(id = %receipt.id, expenses = expenses.len(), "receipt deleted");

        Ok(DeletedReceipt { receipt, expenses })
    }

    pub fn count(&self) -> SpendResult<usize> {
        self.storage.receipts.count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audit::Operation;
    use crate::config::paths::SpendPaths;
    use crate::services::{CreateExpenseInput, ExpenseService};
    use tempfile::TempDir;

    fn create_test_storage() -> (TempDir, Storage) {
        let temp_dir = TempDir::new().unwrap();
        let paths = SpendPaths::with_base_dir(temp_dir.path().to_path_buf());
        let mut storage = Storage::new(paths).unwrap();
        storage.load_all().unwrap();
        (temp_dir, storage)
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn input(vendor: &str, on: NaiveDate, amount: Option<i64>) -> CreateReceiptInput {
        CreateReceiptInput {
            vendor: vendor.to_string(),
            date: on,
            amount: amount.map(Money::from_cents),
            description: Some("weekly shop".to_string()),
            owner: None,
        }
    }

    #[test]
    fn test_create_records_expense_for_positive_amount() {
        let (_temp_dir, storage) = create_test_storage();
        let service = ReceiptService::new(&storage);

        let (receipt, expense) = service
            .create(input(" Mercadona ", date(2024, 3, 9), Some(2350)))
            .unwrap();
        assert!(receipt.pending_review);
        assert_eq!(receipt.vendor, "Mercadona");

        let expense = expense.unwrap();
        assert_eq!(expense.category, RECEIPT_CATEGORY);
        assert_eq!(expense.date, receipt.date);
        assert_eq!(expense.receipt, Some(receipt.id));
        assert_eq!(service.expenses(receipt.id).unwrap().len(), 1);

        let entries = storage.audit().read_all().unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].entity_type, EntityType::Receipt);
    }

    #[test]
    fn test_create_without_amount_has_no_expense() {
        let (_temp_dir, storage) = create_test_storage();
        let service = ReceiptService::new(&storage);

        let (_, none) = service.create(input("Lidl", date(2024, 3, 9), None)).unwrap();
        let (_, zero) = service.create(input("Lidl", date(2024, 3, 9), Some(0))).unwrap();
        assert!(none.is_none());
        assert!(zero.is_none());
        assert_eq!(service.count().unwrap(), 2);
        assert_eq!(storage.expenses.count().unwrap(), 0);
    }

    #[test]
    fn test_find_by_short_id() {
        let (_temp_dir, storage) = create_test_storage();
        let service = ReceiptService::new(&storage);
        let (receipt, _) = service.create(input("Lidl", date(2024, 3, 9), None)).unwrap();

        assert_eq!(service.require(&receipt.id.to_string()).unwrap().id, receipt.id);
        assert!(service.require("rcp-ffffffff").unwrap_err().is_not_found());
    }

    #[test]
    fn test_review_flag_and_pending_list() {
        let (_temp_dir, storage) = create_test_storage();
        let service = ReceiptService::new(&storage);
        let (a, _) = service.create(input("Lidl", date(2024, 3, 9), None)).unwrap();
        let (b, _) = service.create(input("Aldi", date(2024, 3, 10), None)).unwrap();

        let reviewed = service.set_pending_review(a.id, false).unwrap();
        assert!(!reviewed.pending_review);

        let pending: Vec<_> = service
            .list_pending_review()
            .unwrap()
            .iter()
            .map(|r| r.id)
            .collect();
        assert_eq!(pending, vec![b.id]);

        let entries = storage.audit().read_all().unwrap();
        assert_eq!(entries.last().unwrap().operation, Operation::Update);
    }

    #[test]
    fn test_month_listings() {
        let (_temp_dir, storage) = create_test_storage();
        let service = ReceiptService::new(&storage);

        let this_month = MonthYear::current();
        let last_month = this_month.prev();
        service
            .create(input("Now", this_month.start_date(), None))
            .unwrap();
        service
            .create(input("Before", last_month.end_date(), None))
            .unwrap();
        service
            .create(input("Older", last_month.prev().start_date(), None))
            .unwrap();

        let current = service.list_current_month().unwrap();
        assert_eq!(current.len(), 1);
        assert_eq!(current[0].vendor, "Now");

        let previous = service.list_previous_month().unwrap();
        assert_eq!(previous.len(), 1);
        assert_eq!(previous[0].vendor, "Before");

        assert_eq!(service.list().unwrap().len(), 3);
    }

    #[test]
    fn test_date_change_moves_expenses() {
        let (_temp_dir, storage) = create_test_storage();
        let service = ReceiptService::new(&storage);
        let (receipt, _) = service
            .create(input("Lidl", date(2024, 3, 9), Some(500)))
            .unwrap();

        ExpenseService::new(&storage)
            .create(CreateExpenseInput {
                date: date(2024, 3, 9),
                amount: Money::from_cents(120),
                category: "food".into(),
                subcategory: "bread".into(),
                description: None,
                owner: None,
                receipt: Some(receipt.id),
            })
            .unwrap();

        let updated = service
            .update(
                receipt.id,
                UpdateReceiptInput {
                    vendor: Some("Lidl Centro".into()),
                    date: Some(date(2024, 4, 1)),
                    ..Default::default()
                },
            )
            .unwrap();
        assert_eq!(updated.vendor, "Lidl Centro");

        let expenses = service.expenses(receipt.id).unwrap();
        assert_eq!(expenses.len(), 2);
        assert!(expenses.iter().all(|e| e.date == date(2024, 4, 1)));
    }

    #[test]
    fn test_update_rejects_year_past_four_digits() {
        let (_temp_dir, storage) = create_test_storage();
        let service = ReceiptService::new(&storage);
        let (receipt, _) = service.create(input("Lidl", date(2024, 3, 9), None)).unwrap();

        let err = service
            .update(
                receipt.id,
                UpdateReceiptInput {
                    date: Some(date(12345, 1, 1)),
                    ..Default::default()
                },
            )
            .unwrap_err();
        assert!(err.is_validation());
        assert!(service
            .create(input("Lidl", date(12345, 1, 1), None))
            .unwrap_err()
            .is_validation());
    }

    #[test]
    fn test_delete_cascades_to_expenses() {
        let (_temp_dir, storage) = create_test_storage();
        let service = ReceiptService::new(&storage);
        let (receipt, _) = service
            .create(input("Lidl", date(2024, 3, 9), Some(500)))
            .unwrap();
        let (other, _) = service
            .create(input("Aldi", date(2024, 3, 9), Some(700)))
            .unwrap();

        let deleted = service.delete(receipt.id).unwrap();
        assert_eq!(deleted.expenses.len(), 1);
        assert_eq!(service.count().unwrap(), 1);
        assert_eq!(storage.expenses.count().unwrap(), 1);
        assert_eq!(service.expenses(other.id).unwrap().len(), 1);

        assert!(service.delete(receipt.id).unwrap_err().is_not_found());
    }

    #[test]
    fn test_failed_receipt_write_restores_expenses() {
        let (_temp_dir, storage) = create_test_storage();
        let service = ReceiptService::new(&storage);
        let (receipt, _) = service
            .create(input("Lidl", date(2024, 3, 9), Some(500)))
            .unwrap();

        let receipts_file = storage.paths().receipts_file();
        std::fs::remove_file(&receipts_file).unwrap();
        std::fs::create_dir(&receipts_file).unwrap();

        assert!(service.delete(receipt.id).is_err());
        assert_eq!(service.count().unwrap(), 1);
        assert_eq!(service.expenses(receipt.id).unwrap().len(), 1);
    }
}
