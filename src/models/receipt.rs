//! Receipt model
//!
//! A receipt is the purchase a group of expenses was extracted from. New
//! receipts start out pending review; marking one reviewed is how a user
//! signs off on the expenses recorded for it.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::ids::ReceiptId;
use super::month_year::MonthYear;

/// A receipt in the ledger
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Receipt {
    pub id: ReceiptId,

    /// Shop or merchant; may be empty
    #[serde(default)]
    pub vendor: String,

    /// Purchase date; expenses of the receipt follow it
    pub date: NaiveDate,

    pub pending_review: bool,

    pub created_at: DateTime<Utc>,

    pub updated_at: DateTime<Utc>,
}

impl Receipt {
    /// Create a receipt awaiting review
    pub fn new(vendor: impl Into<String>, date: NaiveDate) -> Self {
        let now = Utc::now();
        Self {
            id: ReceiptId::new(),
            vendor: vendor.into(),
            date,
            pending_review: true,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn month_year(&self) -> MonthYear {
        MonthYear::from_date(self.date)
    }

    /// Mark the record as modified now
    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

impl fmt::Display for Receipt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let vendor = if self.vendor.is_empty() {
            "(no vendor)"
        } else {
            self.vendor.as_str()
        };
        write!(f, "{} {}", self.date.format("%Y-%m-%d"), vendor)?;
        if self.pending_review {
            write!(f, " [pending review]")?;
        }
        Ok(())
    }
}
