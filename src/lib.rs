//! spendlens - expense tracking and spending reports from the terminal
//!
//! Expenses are imported from CSV files (or entered by hand), stored as JSON,
//! and summarised into per-month category totals, month-over-month trends and
//! a ranking of the biggest subcategories.
//!
//! # Architecture
//!
//! - `models`: expenses, cents-based money and `YYYY-MM` months
//! - `services`: CSV ingestion and expense business logic
//! - `reports`: aggregation tables, the top subcategory ranker and the dashboard
//! - `storage`: JSON file storage layer
//! - `audit`: append-only change history
//! - `config`: paths and user settings
//! - `export`, `display`, `cli`: the command line surface
//!
//! # Example
//!
//! ```
//! use spendlens::reports::totals_by_category;
//! use spendlens::services::parse_expenses_csv;
//!
//! let csv = b"date;amount;category;subcategory\n2022-04-02;8,22;transport;gasoline\n";
//! let expenses = parse_expenses_csv(csv).unwrap();
//! let totals = totals_by_category(&expenses);
//! assert_eq!(totals.value(&"2022-04".parse().unwrap(), &"transport".to_string()), 8.22);
//! ```

pub mod audit;
pub mod cli;
pub mod config;
pub mod display;
pub mod error;
pub mod export;
pub mod logging;
pub mod models;
pub mod reports;
pub mod services;
pub mod storage;

pub use error::{ParseError, SpendError, SpendResult};
