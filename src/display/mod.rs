//! Display formatting for terminal output

pub mod expense;
pub mod receipt;
pub mod report;

pub use expense::{format_expense_details, format_expense_table};
pub use receipt::{format_receipt_details, format_receipt_table};
