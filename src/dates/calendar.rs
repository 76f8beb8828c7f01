//! Calendar arithmetic used by deposit and SIP schedules

use chrono::{Datelike, Days, Months, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::error::{EngineError, Result};

/// Day count for deposit year fractions
pub const DAYS_PER_YEAR: f64 = 365.0;

/// Day count for XIRR and CAGR year fractions
pub const DAYS_PER_YEAR_JULIAN: f64 = 365.25;

/// Parse a form date in strict `YYYY-MM-DD` form.
///
/// chrono accepts unpadded fields, so the shape is checked first.
pub fn parse_iso_strict(field: &str, value: &str) -> Result<NaiveDate> {
    let bytes = value.as_bytes();
    let shaped = bytes.len() == 10
        && bytes[4] == b'-'
        && bytes[7] == b'-'
        && bytes
            .iter()
            .enumerate()
            .all(|(i, b)| i == 4 || i == 7 || b.is_ascii_digit());

    if !shaped {
        return Err(EngineError::invalid_input(
            field,
            format!("'{}' is not a YYYY-MM-DD date", value),
        ));
    }

    NaiveDate::parse_from_str(value, "%Y-%m-%d").map_err(|e| {
        EngineError::invalid_input(field, format!("'{}' is not a valid date: {}", value, e))
    })
}

/// Parse an upstream `DD-MM-YYYY` date
pub fn parse_dmy(field: &str, value: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), "%d-%m-%Y").map_err(|e| {
        EngineError::invalid_input(field, format!("'{}' is not a DD-MM-YYYY date: {}", value, e))
    })
}

/// Add calendar months, clamping to the last day of the target month
pub fn add_months(date: NaiveDate, months: u32) -> Option<NaiveDate> {
    date.checked_add_months(Months::new(months))
}

/// The given day in (year, month), clamped to the month's last day
pub fn day_in_month(year: i32, month: u32, day: u32) -> Option<NaiveDate> {
    let first = NaiveDate::from_ymd_opt(year, month, 1)?;
    let last = add_months(first, 1)?.pred_opt()?.day();
    first.with_day(day.clamp(1, last))
}

/// Years elapsed from `origin` to `date`.
///
/// Whole anniversary years plus the remaining days over a 365-day year.
/// Because every fraction is measured from the same origin, the fractions of
/// adjacent intervals add up to the fraction of their union.
pub fn elapsed_years(origin: NaiveDate, date: NaiveDate) -> f64 {
    if date <= origin {
        return 0.0;
    }

    let mut whole = (date.year() - origin.year()).max(0) as u32;
    let anniversary = loop {
        match add_months(origin, 12 * whole) {
            Some(a) if a <= date => break a,
            _ if whole == 0 => break origin,
            _ => whole -= 1,
        }
    };

    whole as f64 + (date - anniversary).num_days() as f64 / DAYS_PER_YEAR
}

/// Deposit tenure in calendar units
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tenure {
    pub years: u32,
    pub months: u32,
    pub days: u32,
}

impl Tenure {
    pub fn new(years: u32, months: u32, days: u32) -> Self {
        Self { years, months, days }
    }

    pub fn years(years: u32) -> Self {
        Self::new(years, 0, 0)
    }

    pub fn is_zero(&self) -> bool {
        self.years == 0 && self.months == 0 && self.days == 0
    }

    /// Maturity date: years first, then months, then days
    pub fn end_date(&self, start: NaiveDate) -> Result<NaiveDate> {
        let overflow = || EngineError::invalid_input("tenure", "maturity date out of range");

        let year_months = self.years.checked_mul(12).ok_or_else(overflow)?;
        let after_years = add_months(start, year_months).ok_or_else(overflow)?;
        let after_months = add_months(after_years, self.months).ok_or_else(overflow)?;

        after_months
            .checked_add_days(Days::new(self.days as u64))
            .ok_or_else(overflow)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn test_strict_iso_parse() {
        assert_eq!(parse_iso_strict("start", "2023-04-01").unwrap(), d(2023, 4, 1));
        assert!(parse_iso_strict("start", "2023-4-1").is_err());
        assert!(parse_iso_strict("start", "01-04-2023").is_err());
        assert!(parse_iso_strict("start", "2023-02-30").is_err());
        assert!(parse_iso_strict("start", "").is_err());
    }

    #[test]
    fn test_dmy_parse() {
        assert_eq!(parse_dmy("date", "15-02-2024").unwrap(), d(2024, 2, 15));
        assert!(parse_dmy("date", "2024-02-15").is_err());
    }

    #[test]
    fn test_tenure_end_date_is_calendar_aware() {
        let start = d(2024, 1, 31);
        assert_eq!(Tenure::new(0, 1, 0).end_date(start).unwrap(), d(2024, 2, 29));
        assert_eq!(Tenure::new(1, 1, 0).end_date(start).unwrap(), d(2025, 2, 28));
        assert_eq!(Tenure::new(0, 0, 10).end_date(start).unwrap(), d(2024, 2, 10));
        assert_eq!(Tenure::years(1).end_date(d(2023, 4, 1)).unwrap(), d(2024, 4, 1));
    }

    #[test]
    fn test_day_in_month_clamps() {
        assert_eq!(day_in_month(2023, 2, 31), Some(d(2023, 2, 28)));
        assert_eq!(day_in_month(2024, 2, 31), Some(d(2024, 2, 29)));
        assert_eq!(day_in_month(2024, 4, 5), Some(d(2024, 4, 5)));
    }

    #[test]
    fn test_elapsed_years_whole_years_are_exact() {
        // 2023-04-01 to 2024-04-01 spans 366 days but is one anniversary
        assert_eq!(elapsed_years(d(2023, 4, 1), d(2024, 4, 1)), 1.0);
        assert_eq!(elapsed_years(d(2020, 6, 15), d(2025, 6, 15)), 5.0);
        assert_eq!(elapsed_years(d(2020, 6, 15), d(2020, 6, 15)), 0.0);
        assert_eq!(elapsed_years(d(2020, 6, 15), d(2019, 6, 15)), 0.0);
    }

    #[test]
    fn test_elapsed_years_partial() {
        let t = elapsed_years(d(2023, 1, 1), d(2024, 3, 1));
        // one anniversary (2024-01-01) + 60 days
        assert!((t - (1.0 + 60.0 / 365.0)).abs() < 1e-12);
    }

    #[test]
    fn test_elapsed_years_is_additive() {
        let origin = d(2023, 9, 10);
        let mid = d(2024, 4, 1);
        let end = d(2025, 9, 10);
        let a = elapsed_years(origin, mid);
        let b = elapsed_years(origin, end) - elapsed_years(origin, mid);
        assert!((a + b - 2.0).abs() < 1e-12);
    }
}
