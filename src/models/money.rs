//! Money type for representing currency amounts
//!
//! Internally stores amounts in cents (i64) to avoid floating-point drift.
//! Amounts cross the boundary as `f32` (what CSV uploads and charts deal in),
//! and [`Money::from_amount`] is the single conversion point from that
//! floating representation back into cents.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, AddAssign};

/// Magnitude at which scaled cents no longer fit in an `i64`
const CENTS_LIMIT: f32 = 9_223_372_036_854_775_808.0;

/// A monetary amount stored as cents (hundredths of the currency unit)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Money(i64);

impl Money {
    /// Create a Money amount from cents
    ///
    /// # Examples
    /// ```
    /// use spendlens::models::Money;
    /// let amount = Money::from_cents(1050); // $10.50
    /// assert_eq!(amount.to_amount(), 10.5);
    /// ```
    pub const fn from_cents(cents: i64) -> Self {
        Self(cents)
    }

    /// Convert a floating amount into cents
    ///
    /// The amount is scaled by 100 in `f32` and then rounded half away from
    /// zero, so `1.005` becomes 101 cents.
    ///
    /// # Examples
    /// ```
    /// use spendlens::models::Money;
    /// assert_eq!(Money::from_amount(8.22).cents(), 822);
    /// ```
    pub fn from_amount(amount: f32) -> Self {
        Self((amount * 100.0).round() as i64)
    }

    /// Like [`Money::from_amount`], but `None` when the amount is not finite
    /// or its cents do not fit in an `i64`
    ///
    /// # Examples
    /// ```
    /// use spendlens::models::Money;
    /// assert_eq!(Money::try_from_amount(8.22), Some(Money::from_cents(822)));
    /// assert_eq!(Money::try_from_amount(1e17), None);
    /// ```
    pub fn try_from_amount(amount: f32) -> Option<Self> {
        let scaled = (amount * 100.0).round();
        // 2^63 is exactly representable in f32; anything at or past it saturates
        if !scaled.is_finite() || scaled.abs() >= CENTS_LIMIT {
            return None;
        }
        Some(Self(scaled as i64))
    }

    /// Convert back into a floating amount; zero is always `+0.0`
    pub fn to_amount(&self) -> f32 {
        if self.0 == 0 {
            return 0.0;
        }
        self.0 as f32 / 100.0
    }

    /// Create a zero Money amount
    pub const fn zero() -> Self {
        Self(0)
    }

    /// Get the amount in cents
    pub const fn cents(&self) -> i64 {
        self.0
    }

    /// Get the whole units portion (truncated toward zero)
    pub const fn dollars(&self) -> i64 {
        self.0 / 100
    }

    /// Get the cents portion (0-99)
    pub const fn cents_part(&self) -> i64 {
        (self.0 % 100).abs()
    }

    pub const fn is_negative(&self) -> bool {
        self.0 < 0
    }

    /// Parse a money amount typed by a user
    ///
    /// Accepts "10.50", "10,50", "-10.50", "$10.50", "10". Digits past the
    /// second decimal are truncated.
    pub fn parse(s: &str) -> Result<Self, MoneyParseError> {
        let s = s.trim();

        let (negative, s) = if let Some(stripped) = s.strip_prefix('-') {
            (true, stripped)
        } else {
            (false, s)
        };

        let s = s.strip_prefix('$').unwrap_or(s);
        let normalized = s.replace(',', ".");

        let cents = if normalized.contains('.') {
            let parts: Vec<&str> = normalized.split('.').collect();
            if parts.len() != 2 {
                return Err(MoneyParseError::InvalidFormat(s.to_string()));
            }

            let whole: i64 = if parts[0].is_empty() {
                0
            } else {
                parts[0]
                    .parse()
                    .map_err(|_| MoneyParseError::InvalidFormat(s.to_string()))?
            };

            let frac = parts[1];
            if !frac.chars().all(|c| c.is_ascii_digit()) {
                return Err(MoneyParseError::InvalidFormat(s.to_string()));
            }
            let cents: i64 = match frac.len() {
                0 => 0,
                1 => frac.parse::<i64>().unwrap_or(0) * 10,
                _ => frac[..2].parse().unwrap_or(0),
            };

            whole.checked_mul(100).and_then(|c| c.checked_add(cents))
        } else {
            normalized
                .parse::<i64>()
                .ok()
                .and_then(|whole| whole.checked_mul(100))
        }
        .ok_or_else(|| MoneyParseError::InvalidFormat(s.to_string()))?;

        Ok(Self(if negative { -cents } else { cents }))
    }

    /// Format with a currency symbol
    pub fn format_with_symbol(&self, symbol: &str) -> String {
        if self.is_negative() {
            format!(
                "-{}{}.{:02}",
                symbol,
                self.dollars().abs(),
                self.cents_part()
            )
        } else {
            format!("{}{}.{:02}", symbol, self.dollars(), self.cents_part())
        }
    }
}

/// Convert a floating amount to integer cents
pub fn to_cents(amount: f32) -> i64 {
    Money::from_amount(amount).cents()
}

/// Convert integer cents to a floating amount
pub fn to_amount(cents: i64) -> f32 {
    Money::from_cents(cents).to_amount()
}

impl Default for Money {
    fn default() -> Self {
        Self::zero()
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(&self.format_with_symbol("$"))
    }
}

impl Add for Money {
    type Output = Self;

    fn add(self, other: Self) -> Self {
        Self(self.0.saturating_add(other.0))
    }
}

impl AddAssign for Money {
    fn add_assign(&mut self, other: Self) {
        self.0 = self.0.saturating_add(other.0);
    }
}

impl std::iter::Sum for Money {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Money::zero(), |acc, m| acc + m)
    }
}

/// Error type for money parsing
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MoneyParseError {
    InvalidFormat(String),
}

impl fmt::Display for MoneyParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MoneyParseError::InvalidFormat(s) => write!(f, "Invalid money format: {}", s),
        }
    }
}

impl std::error::Error for MoneyParseError {}
