//! Trailing returns of a scheme's NAV and holding period formatting

use std::fmt;

use chrono::{Datelike, Days, NaiveDate};
use serde::{Deserialize, Serialize};

use super::returns::{cagr_from, finite_or_zero, percentage_of};
use crate::dates::{add_months, DAYS_PER_YEAR};
use crate::investment::{earliest_start, Investment};
use crate::nav::NavSeries;

/// Trailing window ending at the valuation date
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Timeframe {
    pub label: String,
    pub days: u32,
}

impl Timeframe {
    pub fn new(label: impl Into<String>, days: u32) -> Self {
        Self {
            label: label.into(),
            days,
        }
    }

    /// 1W, 1M, 3M, 6M, 1Y, 3Y and 5Y
    pub fn defaults() -> Vec<Timeframe> {
        [("1W", 7), ("1M", 30), ("3M", 90), ("6M", 180), ("1Y", 365), ("3Y", 1095), ("5Y", 1825)]
            .into_iter()
            .map(|(label, days)| Timeframe::new(label, days))
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeframeReturn {
    pub label: String,
    pub days: u32,
    pub start_nav: f64,
    pub end_nav: f64,
    pub absolute_return: f64,
    pub percentage_return: f64,
    pub cagr: f64,
    /// False when the series does not reach back far enough
    pub available: bool,
}

impl TimeframeReturn {
    fn unavailable(timeframe: &Timeframe) -> Self {
        Self {
            label: timeframe.label.clone(),
            days: timeframe.days,
            start_nav: 0.0,
            end_nav: 0.0,
            absolute_return: 0.0,
            percentage_return: 0.0,
            cagr: 0.0,
            available: false,
        }
    }
}

/// Point-to-point NAV returns over each timeframe.
///
/// The start NAV is the latest point on or before `as_of - days`; the end
/// NAV is the latest point on or before `as_of`.
pub fn scheme_returns(navs: &NavSeries, as_of: NaiveDate, timeframes: &[Timeframe]) -> Vec<TimeframeReturn> {
    let end = navs.on_or_before(as_of);
    timeframes
        .iter()
        .map(|tf| {
            let start = as_of
                .checked_sub_days(Days::new(u64::from(tf.days)))
                .and_then(|target| navs.on_or_before(target));
            match (start, end) {
                (Some(start), Some(end)) => {
                    let absolute_return = end.nav - start.nav;
                    TimeframeReturn {
                        label: tf.label.clone(),
                        days: tf.days,
                        start_nav: start.nav,
                        end_nav: end.nav,
                        absolute_return: finite_or_zero(absolute_return),
                        percentage_return: percentage_of(absolute_return, start.nav),
                        cagr: cagr_from(start.nav, end.nav, f64::from(tf.days) / DAYS_PER_YEAR),
                        available: true,
                    }
                }
                _ => TimeframeReturn::unavailable(tf),
            }
        })
        .collect()
}

/// Whole months since the first investment
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HoldingPeriod {
    pub years: u32,
    pub months: u32,
}

impl HoldingPeriod {
    pub fn from_months(total: u32) -> Self {
        Self {
            years: total / 12,
            months: total % 12,
        }
    }

    pub fn total_months(&self) -> u32 {
        self.years * 12 + self.months
    }
}

fn plural(n: u32, unit: &str) -> String {
    if n == 1 {
        format!("{} {}", n, unit)
    } else {
        format!("{} {}s", n, unit)
    }
}

impl fmt::Display for HoldingPeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.years, self.months) {
            (0, m) => write!(f, "{}", plural(m, "month")),
            (y, 0) => write!(f, "{}", plural(y, "year")),
            (y, m) => write!(f, "{} {}", plural(y, "year"), plural(m, "month")),
        }
    }
}

/// Largest `n` with `start + n months <= end`, month ends clamped
fn whole_months_between(start: NaiveDate, end: NaiveDate) -> u32 {
    if end <= start {
        return 0;
    }
    let estimate = (end.year() - start.year()) * 12 + end.month() as i32 - start.month() as i32;
    let mut months = u32::try_from(estimate).unwrap_or(0);
    while months > 0 && add_months(start, months).map_or(true, |date| date > end) {
        months -= 1;
    }
    months
}

/// Time held since the earliest investment
pub fn holding_period(investments: &[Investment], as_of: NaiveDate) -> HoldingPeriod {
    earliest_start(investments)
        .map(|start| HoldingPeriod::from_months(whole_months_between(start, as_of)))
        .unwrap_or_default()
}
