//! # Order Numbers
//!
//! Human-readable order identifiers of the form `ORD-YYMMDD-N`.
//!
//! ```text
//! ORD-261019-1    first order on 2026-10-19
//! ORD-261019-2    second order the same day
//! ORD-261020-1    counter restarts the next day
//! ```
//!
//! This module only formats and parses. The sequence value `N` is allocated
//! atomically by the database (one counter row per day), so two concurrent
//! orders can never be handed the same number.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::ValidationError;

pub const ORDER_NUMBER_PREFIX: &str = "ORD";

/// Date format of the middle segment and of the per-day counter key.
const DAY_FORMAT: &str = "%y%m%d";

/// A parsed order number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OrderNumber {
    date: NaiveDate,
    sequence: u32,
}

impl OrderNumber {
    /// Creates an order number for `date` with a 1-based `sequence`.
    pub fn new(date: NaiveDate, sequence: u32) -> Result<Self, ValidationError> {
        if sequence == 0 {
            return Err(ValidationError::MustBePositive {
                field: "sequence".to_string(),
            });
        }
        Ok(OrderNumber { date, sequence })
    }

    pub fn date(&self) -> NaiveDate {
        self.date
    }

    pub fn sequence(&self) -> u32 {
        self.sequence
    }

    /// The key of the per-day counter row, e.g. `261019`.
    pub fn day_key(date: NaiveDate) -> String {
        date.format(DAY_FORMAT).to_string()
    }
}

impl fmt::Display for OrderNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}-{}-{}",
            ORDER_NUMBER_PREFIX,
            Self::day_key(self.date),
            self.sequence
        )
    }
}

impl FromStr for OrderNumber {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = |reason: &str| ValidationError::InvalidFormat {
            field: "order_number".to_string(),
            reason: reason.to_string(),
        };

        let mut parts = s.split('-');
        let (Some(prefix), Some(day), Some(seq), None) =
            (parts.next(), parts.next(), parts.next(), parts.next())
        else {
            return Err(invalid("expected ORD-YYMMDD-N"));
        };

        if prefix != ORDER_NUMBER_PREFIX {
            return Err(invalid("must start with ORD"));
        }
        if day.len() != 6 || !day.chars().all(|c| c.is_ascii_digit()) {
            return Err(invalid("date segment must be six digits"));
        }
        if seq.is_empty() || !seq.chars().all(|c| c.is_ascii_digit()) {
            return Err(invalid("sequence must be numeric"));
        }

        let date = NaiveDate::parse_from_str(day, DAY_FORMAT)
            .map_err(|_| invalid("date segment is not a calendar date"))?;
        let sequence: u32 = seq.parse().map_err(|_| invalid("sequence out of range"))?;

        OrderNumber::new(date, sequence)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn matches_format(s: &str) -> bool {
        let parts: Vec<&str> = s.split('-').collect();
        parts.len() == 3
            && parts[0] == "ORD"
            && parts[1].len() == 6
            && parts[1].chars().all(|c| c.is_ascii_digit())
            && !parts[2].is_empty()
            && parts[2].chars().all(|c| c.is_ascii_digit())
    }

    #[test]
    fn test_display_format() {
        let number = OrderNumber::new(day(2026, 10, 19), 7).unwrap();
        assert_eq!(number.to_string(), "ORD-261019-7");
        assert!(matches_format(&number.to_string()));
    }

    #[test]
    fn test_sequential_numbers_differ_by_one() {
        let first = OrderNumber::new(day(2026, 1, 5), 1).unwrap();
        let second = OrderNumber::new(day(2026, 1, 5), first.sequence() + 1).unwrap();
        assert_eq!(second.to_string(), "ORD-260105-2");
        assert_eq!(second.sequence() - first.sequence(), 1);
    }

    #[test]
    fn test_parse_roundtrip() {
        let parsed: OrderNumber = "ORD-261231-142".parse().unwrap();
        assert_eq!(parsed.date(), day(2026, 12, 31));
        assert_eq!(parsed.sequence(), 142);
        assert_eq!(parsed.to_string(), "ORD-261231-142");
    }

    #[test]
    fn test_parse_rejects_malformed() {
        for bad in [
            "",
            "ORD-261019",
            "INV-261019-1",
            "ORD-2610-1",
            "ORD-261019-x",
            "ORD-261340-1",
            "ORD-261019-0",
            "ORD-261019-1-2",
        ] {
            assert!(bad.parse::<OrderNumber>().is_err(), "{}", bad);
        }
    }

    #[test]
    fn test_zero_sequence_rejected() {
        assert!(OrderNumber::new(day(2026, 10, 19), 0).is_err());
    }

    #[test]
    fn test_day_key() {
        assert_eq!(OrderNumber::day_key(day(2026, 3, 9)), "260309");
    }
}
