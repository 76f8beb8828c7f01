//! Indian fiscal years (April 1 to March 31)
//!
//! FY 2023-24 runs from 01-04-2023 to 31-03-2024 and is identified by its
//! start year, 2023.

use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::error::EngineError;

/// First month of the fiscal year
const FY_START_MONTH: u32 = 4;

/// A fiscal year, keyed by the calendar year in which it starts
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct FiscalYear(i32);

impl FiscalYear {
    pub fn new(start_year: i32) -> Self {
        Self(start_year)
    }

    /// Fiscal year containing `date`
    pub fn of(date: NaiveDate) -> Self {
        if date.month() >= FY_START_MONTH {
            Self(date.year())
        } else {
            Self(date.year() - 1)
        }
    }

    pub fn start_year(&self) -> i32 {
        self.0
    }

    /// April 1
    pub fn start_date(&self) -> NaiveDate {
        NaiveDate::from_ymd_opt(self.0, FY_START_MONTH, 1).unwrap_or(NaiveDate::MIN)
    }

    /// March 31 of the following calendar year
    pub fn end_date(&self) -> NaiveDate {
        self.next().start_date().pred_opt().unwrap_or(NaiveDate::MAX)
    }

    pub fn next(&self) -> Self {
        Self(self.0 + 1)
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.start_date() && date <= self.end_date()
    }

    /// Short label, e.g. "2023-24"
    pub fn label(&self) -> String {
        format!("{}-{:02}", self.0, (self.0 + 1).rem_euclid(100))
    }
}

impl fmt::Display for FiscalYear {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "FY {}", self.label())
    }
}

impl FromStr for FiscalYear {
    type Err = EngineError;

    /// Accepts "2023-24" or "FY 2023-24"
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let body = trimmed.strip_prefix("FY").map(str::trim).unwrap_or(trimmed);
        let invalid = || EngineError::invalid_input("fiscal_year", format!("'{}' is not YYYY-YY", s));

        let (start, end) = body.split_once('-').ok_or_else(invalid)?;
        let start: i32 = start.parse().map_err(|_| invalid())?;
        let end: i32 = end.parse().map_err(|_| invalid())?;
        if end != (start + 1).rem_euclid(100) {
            return Err(invalid());
        }
        Ok(Self(start))
    }
}

/// A fiscal year clipped to the part an investment was actually held
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FiscalYearPeriod {
    pub fiscal_year: FiscalYear,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

/// Fiscal years from `start` through the fiscal year containing `as_of`.
/// The first period starts at `start`; the last ends at `as_of`.
pub fn fiscal_years_in_range(start: NaiveDate, as_of: NaiveDate) -> Vec<FiscalYearPeriod> {
    let first = FiscalYear::of(start);
    let last = FiscalYear::of(as_of);

    let mut periods = Vec::new();
    let mut fy = first;
    while fy <= last {
        let start_date = if fy == first { start } else { fy.start_date() };
        let end_date = effective_end_date(fy, as_of);
        periods.push(FiscalYearPeriod {
            fiscal_year: fy,
            start_date,
            end_date,
        });
        fy = fy.next();
    }
    periods
}

/// `as_of` for the current fiscal year, March 31 for past ones
pub fn effective_end_date(fy: FiscalYear, as_of: NaiveDate) -> NaiveDate {
    if FiscalYear::of(as_of) == fy {
        as_of
    } else {
        fy.end_date()
    }
}
