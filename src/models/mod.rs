//! Core data models for spendlens
//!
//! Expenses and the receipts they come from, the fixed-point money type, the
//! calendar month key used by the aggregation tables, and identifiers.

pub mod expense;
pub mod ids;
pub mod money;
pub mod month_year;
pub mod receipt;

pub use expense::Expense;
pub use ids::{ExpenseId, ReceiptId};
pub use money::{to_amount, to_cents, Money, MoneyParseError};
pub use month_year::{MonthYear, MonthYearParseError};
pub use receipt::Receipt;
