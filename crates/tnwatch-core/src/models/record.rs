//! Record and date range models

use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Closed interval of calendar dates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    from: NaiveDate,
    to: NaiveDate,
}

impl DateRange {
    /// Create a range, rejecting `from > to`
    pub fn new(from: NaiveDate, to: NaiveDate) -> Result<Self> {
        if from > to {
            return Err(Error::InvalidDateRange(format!("{from} is after {to}")));
        }
        Ok(Self { from, to })
    }

    /// First date (inclusive)
    pub fn from(&self) -> NaiveDate {
        self.from
    }

    /// Last date (inclusive)
    pub fn to(&self) -> NaiveDate {
        self.to
    }

    /// Whether `date` falls inside the range
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.from <= date && date <= self.to
    }
}

impl fmt::Display for DateRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..={}", self.from, self.to)
    }
}

/// A record exactly as the network delivered it
///
/// `value` is the decimal text of a fixed-point number and may not fit an f64.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawRecord {
    /// Date the value applies to
    pub date_value: NaiveDate,
    /// Decimal text of the value
    pub value: String,
}

impl RawRecord {
    /// Convert the value to a finite f64.
    pub fn to_record(&self) -> Result<Record> {
        match self.value.trim().parse::<f64>() {
            Ok(value) if value.is_finite() => Ok(Record {
                date: self.date_value,
                value,
            }),
            _ => Err(Error::NonFiniteValue {
                date: self.date_value.to_string(),
                value: self.value.clone(),
            }),
        }
    }
}

/// A dated numeric observation
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Record {
    /// Date the value applies to
    pub date: NaiveDate,
    /// Finite value
    pub value: f64,
}

impl Record {
    /// Create a record
    pub fn new(date: NaiveDate, value: f64) -> Self {
        Self { date, value }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2023, 1, day).unwrap()
    }

    #[test]
    fn single_day_range_is_valid() {
        let range = DateRange::new(date(5), date(5)).unwrap();
        assert!(range.contains(date(5)));
        assert!(!range.contains(date(6)));
    }

    #[test]
    fn inverted_range_is_invalid() {
        assert!(matches!(
            DateRange::new(date(31), date(1)),
            Err(Error::InvalidDateRange(_))
        ));
    }

    #[test]
    fn decimal_text_converts() {
        let raw = RawRecord {
            date_value: date(1),
            value: "3.141000000000000000".to_string(),
        };
        let record = raw.to_record().unwrap();
        assert!((record.value - 3.141).abs() < 1e-12);
        assert_eq!(record.date, date(1));
    }

    #[test]
    fn non_finite_text_is_rejected() {
        for text in ["NaN", "inf", "-infinity", "abc", "", "1e400"] {
            let raw = RawRecord {
                date_value: date(2),
                value: text.to_string(),
            };
            assert!(
                matches!(raw.to_record(), Err(Error::NonFiniteValue { .. })),
                "{text:?} should be rejected"
            );
        }
    }
}
