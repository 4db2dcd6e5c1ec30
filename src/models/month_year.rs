//! Calendar month key
//!
//! `MonthYear` identifies a calendar month and is the outer key of most
//! aggregation tables. Its canonical text form is the zero-padded `YYYY-MM`,
//! so sorting the text and sorting the months chronologically agree.

use chrono::{Datelike, Duration, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A calendar month (e.g. "2025-01")
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct MonthYear {
    year: i32,
    month: u32,
}

impl MonthYear {
    /// Create a month key, validating the month and the 4-digit year range
    pub fn new(year: i32, month: u32) -> Result<Self, MonthYearParseError> {
        if !(1..=12).contains(&month) {
            return Err(MonthYearParseError::InvalidMonth(month));
        }
        if !(0..=9999).contains(&year) {
            return Err(MonthYearParseError::InvalidYear(year));
        }
        Ok(Self { year, month })
    }

    /// The month a date falls in
    pub fn from_date(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    /// The month a date falls in, rejecting years outside the 4-digit range
    ///
    /// Dates past year 9999 would produce a key whose text neither parses
    /// back nor sorts chronologically.
    pub fn try_from_date(date: NaiveDate) -> Result<Self, MonthYearParseError> {
        Self::new(date.year(), date.month())
    }

    /// The current month in local time
    pub fn current() -> Self {
        Self::from_date(chrono::Local::now().date_naive())
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn month(&self) -> u32 {
        self.month
    }

    /// First day of the month
    pub fn start_date(&self) -> NaiveDate {
        NaiveDate::from_ymd_opt(self.year, self.month, 1).unwrap_or(NaiveDate::MIN)
    }

    /// Last day of the month (inclusive)
    pub fn end_date(&self) -> NaiveDate {
        self.next().start_date() - Duration::days(1)
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        Self::from_date(date) == *self
    }

    pub fn next(&self) -> Self {
        if self.month == 12 {
            Self {
                year: self.year + 1,
                month: 1,
            }
        } else {
            Self {
                year: self.year,
                month: self.month + 1,
            }
        }
    }

    pub fn prev(&self) -> Self {
        if self.month == 1 {
            Self {
                year: self.year - 1,
                month: 12,
            }
        } else {
            Self {
                year: self.year,
                month: self.month - 1,
            }
        }
    }

    /// Parse the canonical `YYYY-MM` form
    pub fn parse(s: &str) -> Result<Self, MonthYearParseError> {
        let s = s.trim();
        let invalid = || MonthYearParseError::InvalidFormat(s.to_string());

        let (year, month) = s.split_once('-').ok_or_else(invalid)?;
        if year.len() != 4 || month.len() != 2 {
            return Err(invalid());
        }
        let year: i32 = year.parse().map_err(|_| invalid())?;
        let month: u32 = month.parse().map_err(|_| invalid())?;

        Self::new(year, month)
    }
}

impl fmt::Display for MonthYear {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

impl FromStr for MonthYear {
    type Err = MonthYearParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for MonthYear {
    type Error = MonthYearParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<MonthYear> for String {
    fn from(value: MonthYear) -> Self {
        value.to_string()
    }
}

impl From<NaiveDate> for MonthYear {
    fn from(date: NaiveDate) -> Self {
        Self::from_date(date)
    }
}

/// Error type for month parsing
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MonthYearParseError {
    InvalidFormat(String),
    InvalidMonth(u32),
    InvalidYear(i32),
}

impl fmt::Display for MonthYearParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidFormat(s) => write!(f, "Invalid month format: {} (expected YYYY-MM)", s),
            Self::InvalidMonth(m) => write!(f, "Invalid month: {}", m),
            Self::InvalidYear(y) => write!(f, "Invalid year: {}", y),
        }
    }
}

impl std::error::Error for MonthYearParseError {}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_display_is_zero_padded() {
        assert_eq!(MonthYear::new(2006, 1).unwrap().to_string(), "2006-01");
        assert_eq!(MonthYear::from_date(date(2022, 4, 2)).to_string(), "2022-04");
    }

    #[test]
    fn test_try_from_date_rejects_years_past_four_digits() {
        assert_eq!(
            MonthYear::try_from_date(date(2022, 4, 2)).unwrap(),
            MonthYear::new(2022, 4).unwrap()
        );
        assert_eq!(
            MonthYear::try_from_date(date(12345, 1, 1)),
            Err(MonthYearParseError::InvalidYear(12345))
        );
        assert!(MonthYear::try_from_date(date(-1, 1, 1)).is_err());
    }

    #[test]
    fn test_parse() {
        assert_eq!(
            MonthYear::parse(" 2008-02 ").unwrap(),
            MonthYear::new(2008, 2).unwrap()
        );
        assert!(MonthYear::parse("2008-2").is_err());
        assert!(MonthYear::parse("2008-13").is_err());
        assert!(MonthYear::parse("2008").is_err());
        assert!(MonthYear::parse("2008-02-01").is_err());
    }

    #[test]
    fn test_ordering_matches_text_ordering() {
        let mut months = vec![
            MonthYear::new(2010, 1).unwrap(),
            MonthYear::new(2009, 12).unwrap(),
            MonthYear::new(2009, 2).unwrap(),
            MonthYear::new(2009, 10).unwrap(),
        ];
        let mut labels: Vec<String> = months.iter().map(|m| m.to_string()).collect();
        months.sort();
        labels.sort();
        let sorted: Vec<String> = months.iter().map(|m| m.to_string()).collect();
        assert_eq!(sorted, labels);
    }

    #[test]
    fn test_navigation_and_bounds() {
        let dec = MonthYear::new(2024, 12).unwrap();
        assert_eq!(dec.next(), MonthYear::new(2025, 1).unwrap());
        assert_eq!(dec.next().prev(), dec);
        assert_eq!(dec.end_date(), date(2024, 12, 31));

        let feb = MonthYear::new(2024, 2).unwrap();
        assert_eq!(feb.start_date(), date(2024, 2, 1));
        assert_eq!(feb.end_date(), date(2024, 2, 29));
        assert!(feb.contains(date(2024, 2, 29)));
        assert!(!feb.contains(date(2024, 3, 1)));
    }

    #[test]
    fn test_serializes_as_canonical_string() {
        let month = MonthYear::new(2025, 3).unwrap();
        let json = serde_json::to_string(&month).unwrap();
        assert_eq!(json, "\"2025-03\"");
        let back: MonthYear = serde_json::from_str(&json).unwrap();
        assert_eq!(back, month);
        assert!(serde_json::from_str::<MonthYear>("\"2025-00\"").is_err());
    }
}
