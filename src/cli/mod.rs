//! CLI command handlers
//!
//! This module contains the implementation of CLI commands,
//! bridging the clap argument parsing with the service layer.

pub mod config;
pub mod expense;
pub mod export;
pub mod import;
pub mod receipt;
pub mod report;

pub use config::{handle_config_command, handle_history_command, handle_init_command};
pub use expense::{handle_expense_command, ExpenseCommands};
pub use export::{handle_export_command, ExportFormat};
pub use import::handle_import_command;
pub use receipt::{handle_receipt_command, ReceiptCommands, ReceiptScope};
pub use report::{handle_report_command, resolve_month, Classifier, ReportCommands};
