//! Storage layer for spendlens
//!
//! JSON file storage with atomic writes plus the audit trail of every
//! mutation made through the services.

pub mod expenses;
pub mod file_io;
pub mod receipts;

pub use expenses::ExpenseRepository;
pub use receipts::ReceiptRepository;
pub use file_io::{read_json, write_json_atomic};

use serde::Serialize;

use crate::audit::{AuditEntry, AuditLogger, EntityType};
use crate::config::paths::SpendPaths;
use crate::error::SpendError;

/// Storage coordinator giving services access to the repositories and audit log
pub struct Storage {
    paths: SpendPaths,
    pub expenses: ExpenseRepository,
    pub receipts: ReceiptRepository,
    audit: AuditLogger,
}

impl Storage {
    /// Create a storage rooted at `paths`, creating directories as needed
    pub fn new(paths: SpendPaths) -> Result<Self, SpendError> {
        paths.ensure_directories()?;

        Ok(Self {
            expenses: ExpenseRepository::new(paths.expenses_file()),
            receipts: ReceiptRepository::new(paths.receipts_file()),
            audit: AuditLogger::new(paths.audit_log()),
            paths,
        })
    }

    pub fn paths(&self) -> &SpendPaths {
        &self.paths
    }

    pub fn audit(&self) -> &AuditLogger {
        &self.audit
    }

    /// Load all data from disk
    pub fn load_all(&mut self) -> Result<(), SpendError> {
        self.expenses.load()?;
        self.receipts.load()
    }

    /// Save all data to disk
    pub fn save_all(&self) -> Result<(), SpendError> {
        self.expenses.save()?;
        self.receipts.save()
    }

    pub fn is_initialized(&self) -> bool {
        self.paths.is_initialized()
    }

    pub fn log_create<T: Serialize>(
        &self,
        entity_type: EntityType,
        entity_id: impl Into<String>,
        entity_name: Option<String>,
        entity: &T,
    ) -> Result<(), SpendError> {
        self.audit
            .log(&AuditEntry::create(entity_type, entity_id, entity_name, entity))
    }

    pub fn log_update<T: Serialize>(
        &self,
        entity_type: EntityType,
        entity_id: impl Into<String>,
        entity_name: Option<String>,
        before: &T,
        after: &T,
    ) -> Result<(), SpendError> {
        self.audit.log(&AuditEntry::update(
            entity_type,
            entity_id,
            entity_name,
            before,
            after,
        ))
    }

    pub fn log_delete<T: Serialize>(
        &self,
        entity_type: EntityType,
        entity_id: impl Into<String>,
        entity_name: Option<String>,
        entity: &T,
    ) -> Result<(), SpendError> {
        self.audit
            .log(&AuditEntry::delete(entity_type, entity_id, entity_name, entity))
    }

    /// Append several prepared entries at once
    pub fn log_batch(&self, entries: &[AuditEntry]) -> Result<(), SpendError> {
        self.audit.log_batch(entries)
    }
}
