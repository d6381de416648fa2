use std::fmt;

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

/// Twelve equal monthly installments per plan year.
pub const MONTHS_PER_YEAR: f64 = 12.0;

/// December's zero-based month index.
pub const LAST_MONTH_INDEX: i32 = 11;

/// The calendar year every proration is computed against. Process-wide
/// configuration, not a mutable entity; the bridge replaces the whole
/// value when the planning horizon moves.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FiscalYear(pub i32);

impl FiscalYear {
    pub fn contains(&self, date: NaiveDate) -> bool {
        date.year() == self.0
    }

    /// Zero-based month index (0 = January) of a date, independent of
    /// whether the date falls inside this fiscal year.
    pub fn month_index(date: NaiveDate) -> i32 {
        date.month0() as i32
    }
}

impl fmt::Display for FiscalYear {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "FY{}", self.0)
    }
}
