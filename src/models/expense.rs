//! Expense model
//!
//! A single financial transaction as uploaded by a user or stored locally.
//! Only `date`, `amount`, `category` and `subcategory` take part in
//! aggregation; the remaining fields are metadata.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::ids::{ExpenseId, ReceiptId};
use super::money::Money;
use super::month_year::MonthYear;

/// A single expense record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Expense {
    /// Unique identifier
    pub id: ExpenseId,

    /// Day the money was spent
    pub date: NaiveDate,

    /// Amount in cents; usually non-negative but not enforced
    pub amount: Money,

    #[serde(default)]
    pub category: String,

    /// May be empty
    #[serde(default)]
    pub subcategory: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Who the expense belongs to
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner: Option<String>,

    /// Receipt this expense was extracted from
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub receipt: Option<ReceiptId>,

    pub created_at: DateTime<Utc>,

    pub updated_at: DateTime<Utc>,
}

impl Expense {
    /// Create a new expense with empty classifiers
    pub fn new(date: NaiveDate, amount: Money) -> Self {
        let now = Utc::now();
        Self {
            id: ExpenseId::new(),
            date,
            amount,
            category: String::new(),
            subcategory: String::new(),
            description: None,
            owner: None,
            receipt: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Create an expense with its classifiers set
    pub fn with_details(
        date: NaiveDate,
        amount: Money,
        category: impl Into<String>,
        subcategory: impl Into<String>,
    ) -> Self {
        let mut expense = Self::new(date, amount);
        expense.category = category.into();
        expense.subcategory = subcategory.into();
        expense
    }

    /// The month this expense counts toward
    pub fn month_year(&self) -> MonthYear {
        MonthYear::from_date(self.date)
    }

    /// Whether the subcategory carries a value worth reporting on
    pub fn has_subcategory(&self) -> bool {
        !self.subcategory.is_empty()
    }

    /// Mark the record as modified now
    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

impl fmt::Display for Expense {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {}",
            self.date.format("%Y-%m-%d"),
            self.category,
            self.amount
        )?;
        if self.has_subcategory() {
            write!(f, " ({})", self.subcategory)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_month_year() {
        let expense = Expense::new(
            NaiveDate::from_ymd_opt(2008, 2, 11).unwrap(),
            Money::from_cents(110),
        );
        assert_eq!(expense.month_year().to_string(), "2008-02");
    }

    #[test]
    fn test_display() {
        let expense = Expense::with_details(
            NaiveDate::from_ymd_opt(2022, 4, 2).unwrap(),
            Money::from_cents(282),
            "food",
            "meat",
        );
        assert_eq!(expense.to_string(), "2022-04-02 food $2.82 (meat)");

        let plain = Expense::with_details(
            NaiveDate::from_ymd_opt(2022, 4, 2).unwrap(),
            Money::from_cents(282),
            "food",
            "",
        );
        assert_eq!(plain.to_string(), "2022-04-02 food $2.82");
        assert!(!plain.has_subcategory());
    }

    #[test]
    fn test_serialization_skips_empty_metadata() {
        let expense = Expense::with_details(
            NaiveDate::from_ymd_opt(2022, 4, 2).unwrap(),
            Money::from_cents(282),
            "food",
            "meat",
        );
        let json = serde_json::to_string(&expense).unwrap();
        assert!(!json.contains("receipt"));
        assert!(json.contains("\"amount\":282"));

        let back: Expense = serde_json::from_str(&json).unwrap();
        assert_eq!(back, expense);
    }
}
