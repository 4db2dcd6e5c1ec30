//! Strongly-typed identifiers
//!
//! Expenses and receipts are keyed by UUID newtypes so the two can't be mixed
//! up. The display form is a short prefixed form (`exp-xxxxxxxx`,
//! `rcp-xxxxxxxx`), which the CLI also accepts when looking records up.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

macro_rules! define_id {
    ($(#[$meta:meta])* $name:ident, $display_prefix:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(Uuid);

        impl $name {
            /// Create a new random ID
            pub fn new() -> Self {
                Self(Uuid::new_v4())
            }

            pub fn from_uuid(uuid: Uuid) -> Self {
                Self(uuid)
            }

            pub fn as_uuid(&self) -> &Uuid {
                &self.0
            }

            /// Check whether a user-typed identifier refers to this ID
            ///
            /// Accepts the full UUID, the prefixed short form, or a bare hex
            /// prefix of at least 4 characters.
            pub fn matches(&self, identifier: &str) -> bool {
                let identifier = identifier.trim().to_lowercase();
                let identifier = identifier
                    .strip_prefix($display_prefix)
                    .unwrap_or(&identifier);
                if identifier.len() < 4 {
                    return false;
                }
                self.0.to_string().starts_with(identifier)
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}{}", $display_prefix, &self.0.to_string()[..8])
            }
        }

        impl From<Uuid> for $name {
            fn from(uuid: Uuid) -> Self {
                Self(uuid)
            }
        }

        impl FromStr for $name {
            type Err = uuid::Error;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let s = s.trim();
                let s = s.strip_prefix($display_prefix).unwrap_or(s);
                Ok(Self(Uuid::parse_str(s)?))
            }
        }
    };
}

define_id!(
    /// Unique identifier of an expense
    ExpenseId,
    "exp-"
);
define_id!(
    /// Unique identifier of a receipt
    ReceiptId,
    "rcp-"
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_is_short_prefix() {
        let id = ExpenseId::new();
        let display = id.to_string();
        assert!(display.starts_with("exp-"));
        assert_eq!(display.len(), 12);

        assert!(ReceiptId::new().to_string().starts_with("rcp-"));
    }

    #[test]
    fn test_matches_short_and_full_forms() {
        let id = ExpenseId::new();
        assert!(id.matches(&id.to_string()));
        assert!(id.matches(&id.as_uuid().to_string()));
        assert!(!id.matches("exp-"));
        assert!(!id.matches("zzzzzzzz"));

        let receipt = ReceiptId::new();
        assert!(receipt.matches(&receipt.to_string()));
        let short = receipt.to_string().replacen("rcp-", "exp-", 1);
        assert!(!receipt.matches(&short));
    }

    #[test]
    fn test_parse_full_uuid() {
        let id = ExpenseId::new();
        let parsed: ExpenseId = id.as_uuid().to_string().parse().unwrap();
        assert_eq!(id, parsed);
        assert!("exp-1234".parse::<ExpenseId>().is_err());

        let receipt = ReceiptId::new();
        let parsed: ReceiptId = format!("rcp-{}", receipt.as_uuid()).parse().unwrap();
        assert_eq!(receipt, parsed);
    }
}
