//! Units, current value and net invested capital of investments
//!
//! Valuation is a pure function of the investment, the NAV series and the
//! valuation date; nothing is cached.

use std::iter::Sum;
use std::ops::{Add, AddAssign};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::installment::executed_installments;
use super::types::Investment;
use crate::nav::NavSeries;

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ValuationResult {
    pub units: f64,
    /// Units held times the latest NAV
    pub current_value: f64,
    /// Money invested net of stamp duty
    pub invested_amount: f64,
}

impl ValuationResult {
    pub fn zero() -> Self {
        Self::default()
    }

    pub fn gain(&self) -> f64 {
        self.current_value - self.invested_amount
    }
}

impl Add for ValuationResult {
    type Output = ValuationResult;

    fn add(self, other: ValuationResult) -> ValuationResult {
        ValuationResult {
            units: self.units + other.units,
            current_value: self.current_value + other.current_value,
            invested_amount: self.invested_amount + other.invested_amount,
        }
    }
}

impl AddAssign for ValuationResult {
    fn add_assign(&mut self, other: ValuationResult) {
        *self = *self + other;
    }
}

impl Sum for ValuationResult {
    fn sum<I: Iterator<Item = ValuationResult>>(iter: I) -> Self {
        iter.fold(ValuationResult::zero(), Add::add)
    }
}

/// Value one investment as of `as_of` against its fund's NAV series.
///
/// An empty series values everything at zero.
pub fn value_of(investment: &Investment, navs: &NavSeries, as_of: NaiveDate) -> ValuationResult {
    let Some(latest) = navs.latest() else {
        return ValuationResult::zero();
    };

    let (units, invested_amount) = executed_installments(investment, navs, as_of)
        .iter()
        .fold((0.0, 0.0), |(units, invested), i| (units + i.units, invested + i.net_amount));

    let current_value = if latest.nav > 0.0 { units * latest.nav } else { 0.0 };

    ValuationResult {
        units,
        current_value,
        invested_amount,
    }
}

/// Sum of [`value_of`] over investments sharing one NAV series
pub fn value_all(investments: &[Investment], navs: &NavSeries, as_of: NaiveDate) -> ValuationResult {
    investments.iter().map(|inv| value_of(inv, navs, as_of)).sum()
}
