//! Configuration for spendlens
//!
//! Resolves where data lives on disk and persists user preferences such as
//! the currency symbol and which month the dashboard reports on.

pub mod paths;
pub mod settings;

pub use paths::SpendPaths;
pub use settings::{ReportMonth, Settings};
