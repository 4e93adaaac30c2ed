//! Calendar month value

use std::fmt;

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use super::result::{Error, Result};

pub const MIN_YEAR: i32 = 1;
pub const MAX_YEAR: i32 = 9999;

/// A calendar month (year + month number)
///
/// Day-of-month is never part of a comparison. Field order matters: the
/// derived `Ord` compares year first, then month.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Month {
    year: i32,
    month: u32,
}

impl Month {
    /// Create a month, rejecting month numbers outside 1..=12 and years
    /// outside 1..=9999
    pub fn new(year: i32, month: u32) -> Result<Self> {
        if !(1..=12).contains(&month) {
            return Err(Error::validation(format!("invalid month number: {}", month)));
        }
        // Stored dates must read back as plain `YYYY-MM-DD`
        if !(MIN_YEAR..=MAX_YEAR).contains(&year) {
            return Err(Error::validation(format!("year out of range: {}", year)));
        }
        Ok(Self { year, month })
    }

    /// The month containing the given date
    pub fn from_date(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn month(&self) -> u32 {
        self.month
    }

    /// Reference date for this month (day 1), used for storage
    pub fn first_day(&self) -> NaiveDate {
        NaiveDate::from_ymd_opt(self.year, self.month, 1)
            .unwrap_or(NaiveDate::MIN)
    }

    /// Signed number of months from `self` to `other`
    ///
    /// Zero when both are the same month, negative when `other` is earlier.
    pub fn months_until(&self, other: Month) -> i64 {
        let years = i64::from(other.year) - i64::from(self.year);
        let months = i64::from(other.month) - i64::from(self.month);
        years * 12 + months
    }
}

impl From<NaiveDate> for Month {
    fn from(date: NaiveDate) -> Self {
        Self::from_date(date)
    }
}

impl fmt::Display for Month {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}
