//! Receipt repository for JSON storage

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::RwLock;

use crate::error::SpendError;
use crate::models::{MonthYear, Receipt, ReceiptId};

use super::file_io::{read_json, write_json_atomic};

#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
struct ReceiptData {
    receipts: Vec<Receipt>,
}

fn lock_error<E: std::fmt::Display>(e: E) -> SpendError {
    SpendError::Storage(format!("Failed to acquire receipts lock: {}", e))
}

fn sort_most_recent_first(receipts: &mut [Receipt]) {
    receipts.sort_by(|a, b| b.date.cmp(&a.date).then(b.created_at.cmp(&a.created_at)));
}

/// Repository for receipt persistence
pub struct ReceiptRepository {
    path: PathBuf,
    data: RwLock<HashMap<ReceiptId, Receipt>>,
}

impl ReceiptRepository {
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            data: RwLock::new(HashMap::new()),
        }
    }

    pub fn load(&self) -> Result<(), SpendError> {
        let file_data: ReceiptData = read_json(&self.path)?;

        let mut data = self.data.write().map_err(lock_error)?;
        *data = file_data
            .receipts
            .into_iter()
            .map(|receipt| (receipt.id, receipt))
            .collect();
        Ok(())
    }

    pub fn save(&self) -> Result<(), SpendError> {
        let data = self.data.read().map_err(lock_error)?;
        write_snapshot(&self.path, &data)
    }

    /// Insert `upserts` and remove `removals`, writing to disk before the
    /// change becomes visible in memory
    pub fn commit(&self, upserts: &[Receipt], removals: &[ReceiptId]) -> Result<(), SpendError> {
        let mut data = self.data.write().map_err(lock_error)?;

        let mut staged = data.clone();
        for receipt in upserts {
            staged.insert(receipt.id, receipt.clone());
        }
        for id in removals {
            staged.remove(id);
        }

        write_snapshot(&self.path, &staged)?;
        *data = staged;
        Ok(())
    }

    pub fn get(&self, id: ReceiptId) -> Result<Option<Receipt>, SpendError> {
        let data = self.data.read().map_err(lock_error)?;
        Ok(data.get(&id).cloned())
    }

    /// Find the receipt a user-typed identifier refers to
    pub fn find(&self, identifier: &str) -> Result<Option<Receipt>, SpendError> {
        let data = self.data.read().map_err(lock_error)?;

        let mut matches = data.values().filter(|r| r.id.matches(identifier));
        let first = matches.next().cloned();
        if first.is_some() && matches.next().is_some() {
            return Err(SpendError::Validation(format!(
                "Identifier '{}' matches more than one receipt",
                identifier
            )));
        }
        Ok(first)
    }

    /// Receipts matching `predicate`, most recent first
    pub fn get_where<F>(&self, predicate: F) -> Result<Vec<Receipt>, SpendError>
    where
        F: Fn(&Receipt) -> bool,
    {
        let mut receipts: Vec<_> = {
            let data = self.data.read().map_err(lock_error)?;
            data.values().filter(|r| predicate(r)).cloned().collect()
        };
        sort_most_recent_first(&mut receipts);
        Ok(receipts)
    }

    pub fn get_all(&self) -> Result<Vec<Receipt>, SpendError> {
        self.get_where(|_| true)
    }

    pub fn get_by_month(&self, month: MonthYear) -> Result<Vec<Receipt>, SpendError> {
        self.get_where(|r| month.contains(r.date))
    }

    pub fn get_pending_review(&self) -> Result<Vec<Receipt>, SpendError> {
        self.get_where(|r| r.pending_review)
    }

    pub fn count(&self) -> Result<usize, SpendError> {
        let data = self.data.read().map_err(lock_error)?;
        Ok(data.len())
    }
}

fn write_snapshot(
    path: &std::path::Path,
    data: &HashMap<ReceiptId, Receipt>,
) -> Result<(), SpendError> {
    let mut receipts: Vec<_> = data.values().cloned().collect();
    sort_most_recent_first(&mut receipts);
    write_json_atomic(path, &ReceiptData { receipts })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use tempfile::TempDir;

    fn receipt(vendor: &str, y: i32, m: u32, d: u32) -> Receipt {
        Receipt::new(vendor, NaiveDate::from_ymd_opt(y, m, d).unwrap())
    }

    #[test]
    fn test_commit_and_reload() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("receipts.json");
        let repo = ReceiptRepository::new(path.clone());
        repo.load().unwrap();

        let a = receipt("Lidl", 2024, 3, 2);
        let b = receipt("Aldi", 2024, 4, 1);
        repo.commit(&[a.clone(), b.clone()], &[]).unwrap();
        repo.commit(&[], &[a.id]).unwrap();

        let reloaded = ReceiptRepository::new(path);
        reloaded.load().unwrap();
        assert_eq!(reloaded.count().unwrap(), 1);
        assert_eq!(reloaded.get(b.id).unwrap().unwrap().vendor, "Aldi");
        assert_eq!(reloaded.find(&b.id.to_string()).unwrap().unwrap().id, b.id);
    }

    #[test]
    fn test_month_and_review_filters() {
        let temp_dir = TempDir::new().unwrap();
        let repo = ReceiptRepository::new(temp_dir.path().join("receipts.json"));

        let mut reviewed = receipt("Lidl", 2024, 3, 2);
        reviewed.pending_review = false;
        let pending = receipt("Aldi", 2024, 3, 20);
        let april = receipt("Bakery", 2024, 4, 1);
        repo.commit(&[reviewed, pending.clone(), april.clone()], &[]).unwrap();

        let march = repo.get_by_month(MonthYear::new(2024, 3).unwrap()).unwrap();
        let vendors: Vec<_> = march.iter().map(|r| r.vendor.as_str()).collect();
        assert_eq!(vendors, vec!["Aldi", "Lidl"]);

        let ids: Vec<_> = repo.get_pending_review().unwrap().iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![april.id, pending.id]);
    }

    #[test]
    fn test_failed_commit_keeps_memory() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("receipts.json");
        std::fs::create_dir(&path).unwrap();
        let repo = ReceiptRepository::new(path);

        assert!(repo.commit(&[receipt("Lidl", 2024, 3, 2)], &[]).is_err());
        assert_eq!(repo.count().unwrap(), 0);
    }
}
