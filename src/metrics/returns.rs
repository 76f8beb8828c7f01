//! Return metrics for the investments in a single fund

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::xirr::{solve_xirr, CashFlow, SolverStatus, XirrConfig, XirrSolution};
use crate::config::EngineConfig;
use crate::dates::DAYS_PER_YEAR_JULIAN;
use crate::investment::{earliest_start, executed_installments, value_all, Investment, ValuationResult};
use crate::nav::NavSeries;

/// Value change between the two most recent NAV points
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct OneDayChange {
    pub absolute: f64,
    pub percentage: f64,
}

impl OneDayChange {
    /// Change from `previous_value` to `latest_value`, zero when not finite
    pub fn between(previous_value: f64, latest_value: f64) -> Self {
        let absolute = latest_value - previous_value;
        let percentage = if previous_value > 0.0 {
            absolute / previous_value * 100.0
        } else {
            0.0
        };
        Self {
            absolute: finite_or_zero(absolute),
            percentage: finite_or_zero(percentage),
        }
    }
}

/// Aggregate return figures; all percentages are in percent
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ReturnMetrics {
    pub total_invested: f64,
    pub total_current_value: f64,
    pub absolute_gain: f64,
    pub percentage_return: f64,
    pub xirr: f64,
    pub cagr: f64,
    pub one_day_change: OneDayChange,
    pub units_held: f64,
    pub xirr_status: SolverStatus,
}

impl ReturnMetrics {
    /// Gain and percentage return from a valuation; XIRR, CAGR and
    /// one-day change are left for the caller
    pub(crate) fn from_valuation(value: ValuationResult) -> Self {
        let absolute_gain = value.current_value - value.invested_amount;
        Self {
            total_invested: value.invested_amount,
            total_current_value: value.current_value,
            absolute_gain,
            percentage_return: percentage_of(absolute_gain, value.invested_amount),
            units_held: value.units,
            ..Self::default()
        }
    }
}

pub(crate) fn finite_or_zero(x: f64) -> f64 {
    if x.is_finite() {
        x
    } else {
        0.0
    }
}

pub(crate) fn percentage_of(part: f64, whole: f64) -> f64 {
    if whole > 0.0 {
        finite_or_zero(part / whole * 100.0)
    } else {
        0.0
    }
}

/// CAGR in percent for growing `invested` into `current` over `years`
pub(crate) fn cagr_from(invested: f64, current: f64, years: f64) -> f64 {
    if years <= 0.0 || invested <= 0.0 {
        return 0.0;
    }
    finite_or_zero(((current / invested).powf(1.0 / years) - 1.0) * 100.0)
}

/// Years from the earliest declared investment to the latest NAV date
pub(crate) fn years_to_latest_nav(investments: &[Investment], navs: &NavSeries) -> f64 {
    match (earliest_start(investments), navs.latest()) {
        (Some(start), Some(latest)) => (latest.date - start).num_days() as f64 / DAYS_PER_YEAR_JULIAN,
        _ => 0.0,
    }
}

/// CAGR of the investments valued against `navs`
pub fn cagr(investments: &[Investment], navs: &NavSeries, as_of: NaiveDate) -> f64 {
    if investments.is_empty() || navs.is_empty() {
        return 0.0;
    }
    let value = value_all(investments, navs, as_of);
    cagr_from(value.invested_amount, value.current_value, years_to_latest_nav(investments, navs))
}

/// Outflows for every executed installment (net of stamp duty) before `as_of`
pub fn investment_outflows(investments: &[Investment], navs: &NavSeries, as_of: NaiveDate) -> Vec<CashFlow> {
    investments
        .iter()
        .flat_map(|inv| executed_installments(inv, navs, as_of))
        .map(|i| CashFlow::new(i.date, -i.net_amount))
        .collect()
}

/// Outflows plus a final inflow of the current value on `as_of`, by date
pub fn cash_flows(investments: &[Investment], navs: &NavSeries, as_of: NaiveDate) -> Vec<CashFlow> {
    let mut flows = investment_outflows(investments, navs, as_of);
    flows.push(CashFlow::new(as_of, value_all(investments, navs, as_of).current_value));
    flows.sort_by_key(|cf| cf.date);
    flows
}

/// XIRR of the investments valued against `navs`
pub fn xirr(investments: &[Investment], navs: &NavSeries, as_of: NaiveDate, config: &XirrConfig) -> XirrSolution {
    if investments.is_empty() || navs.is_empty() {
        return solve_xirr(&[], config);
    }
    solve_xirr(&cash_flows(investments, navs, as_of), config)
}

/// Holdings valued at the two most recent NAV points
pub(crate) fn day_values(investments: &[Investment], navs: &NavSeries, as_of: NaiveDate) -> Option<(f64, f64)> {
    let (latest, previous) = (navs.latest()?, navs.previous()?);
    if investments.is_empty() || !latest.nav.is_finite() || !previous.nav.is_finite() {
        return None;
    }
    let units = value_all(investments, navs, as_of).units;
    Some((units * previous.nav, units * latest.nav))
}

/// Value change between the last two NAV points; zero with fewer than two
pub fn one_day_change(investments: &[Investment], navs: &NavSeries, as_of: NaiveDate) -> OneDayChange {
    day_values(investments, navs, as_of)
        .map(|(previous, latest)| OneDayChange::between(previous, latest))
        .unwrap_or_default()
}

/// Every metric for one fund's investments against its own NAV series
pub fn compute_metrics(
    investments: &[Investment],
    navs: &NavSeries,
    as_of: NaiveDate,
    config: &EngineConfig,
) -> ReturnMetrics {
    if investments.is_empty() {
        return ReturnMetrics::default();
    }

    let solution = xirr(investments, navs, as_of, &config.xirr);
    ReturnMetrics {
        xirr: finite_or_zero(solution.percent()),
        xirr_status: solution.status,
        cagr: cagr(investments, navs, as_of),
        one_day_change: one_day_change(investments, navs, as_of),
        ..ReturnMetrics::from_valuation(value_all(investments, navs, as_of))
    }
}
