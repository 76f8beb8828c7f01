//! Fiscal-year segment output

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::dates::FiscalYear;

/// One fiscal year of a deposit's life
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FiscalYearSegment {
    pub fiscal_year: FiscalYear,
    pub start_date: NaiveDate,
    /// March 31, or the maturity date in the final year
    pub end_date: NaiveDate,
    pub opening_balance: f64,
    pub closing_balance: f64,
    pub interest: f64,
    /// Money deposited during the segment (RD installments, PPF contributions)
    pub contribution: Option<f64>,
}

/// Projection result for a deposit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DepositSummary {
    pub total_interest: f64,
    pub maturity_amount: f64,
    pub maturity_date: NaiveDate,
    pub total_deposited: f64,
    /// Ascending by fiscal year
    pub segments: Vec<FiscalYearSegment>,
}

impl DepositSummary {
    pub fn segment_interest(&self) -> f64 {
        self.segments.iter().map(|s| s.interest).sum()
    }
}

/// Half-open slice `[from, to)` of a deposit inside one fiscal year
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct FiscalSlice {
    pub fiscal_year: FiscalYear,
    pub from: NaiveDate,
    pub to: NaiveDate,
}

impl FiscalSlice {
    /// Display end date: March 31 when the slice runs to the fiscal year end
    pub fn end_date(&self) -> NaiveDate {
        if self.to == self.fiscal_year.next().start_date() {
            self.fiscal_year.end_date()
        } else {
            self.to
        }
    }
}

/// Split `[start, end)` at every April 1; empty slices are dropped
pub(crate) fn fiscal_slices(start: NaiveDate, end: NaiveDate) -> Vec<FiscalSlice> {
    let mut slices = Vec::new();
    if end <= start {
        return slices;
    }

    let mut fy = FiscalYear::of(start);
    let mut from = start;
    while from < end {
        let boundary = fy.next().start_date();
        let to = end.min(boundary);
        slices.push(FiscalSlice {
            fiscal_year: fy,
            from,
            to,
        });
        from = to;
        fy = fy.next();
    }
    slices
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn test_single_fiscal_year() {
        let slices = fiscal_slices(d(2023, 4, 1), d(2024, 4, 1));
        assert_eq!(slices.len(), 1);
        assert_eq!(slices[0].fiscal_year, FiscalYear::new(2023));
        assert_eq!(slices[0].end_date(), d(2024, 3, 31));
    }

    #[test]
    fn test_straddling_slices() {
        let slices = fiscal_slices(d(2023, 10, 1), d(2025, 1, 15));
        assert_eq!(slices.len(), 2);
        assert_eq!(slices[0].from, d(2023, 10, 1));
        assert_eq!(slices[0].to, d(2024, 4, 1));
        assert_eq!(slices[1].from, d(2024, 4, 1));
        assert_eq!(slices[1].to, d(2025, 1, 15));
        assert_eq!(slices[1].end_date(), d(2025, 1, 15));
    }

    #[test]
    fn test_empty_interval() {
        assert!(fiscal_slices(d(2023, 10, 1), d(2023, 10, 1)).is_empty());
    }
}
