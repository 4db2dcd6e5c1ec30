//! Append-only audit log of store mutations
//!
//! Every create, update and delete performed through the services is written
//! as one JSON line to `audit.log`, with the entity state before and after.
//!
//! ```rust,ignore
//! use spendlens::audit::{AuditEntry, AuditLogger, EntityType};
//!
//! let logger = AuditLogger::new(paths.audit_log());
//! let entry = AuditEntry::create(
//!     EntityType::Expense,
//!     expense.id.to_string(),
//!     Some(expense.category.clone()),
//!     &expense,
//! );
//! logger.log(&entry)?;
//! ```

mod diff;
mod entry;
mod logger;

pub use diff::generate_diff;
pub use entry::{AuditEntry, EntityType, Operation};
pub use logger::AuditLogger;
