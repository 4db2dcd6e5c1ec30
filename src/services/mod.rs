//! Service layer for spendlens
//!
//! Business logic on top of the storage layer: expense management, the
//! receipt ledger, and CSV import.

pub mod expense;
pub mod import;
pub mod receipt;

pub use expense::{CreateExpenseInput, ExpenseFilter, ExpenseService, UpdateExpenseInput};
pub use import::{
    parse_expenses_csv, read_expenses_csv, ImportPreviewEntry, ImportResult, ImportService,
    ImportStatus,
};
pub use receipt::{
    CreateReceiptInput, DeletedReceipt, ReceiptService, UpdateReceiptInput, RECEIPT_CATEGORY,
};
