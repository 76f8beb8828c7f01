//! Portfolio-level metrics across funds
//!
//! Totals and one-day change always value each fund against its own NAV
//! series. CAGR and XIRR depend on [`PortfolioMethod`]:
//!
//! * `MergedTimeline` (default) merges every fund's series into one
//!   deduplicated timeline and re-runs the single-fund math over all
//!   investments. This prices every fund off a shared timeline and is an
//!   approximation when funds have different NAVs on the same date.
//! * `PerFund` builds cash flows and values from each fund's own series.

use chrono::NaiveDate;
use log::debug;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use super::returns::{
    cagr, cagr_from, compute_metrics, day_values, finite_or_zero, investment_outflows, xirr,
    OneDayChange, ReturnMetrics,
};
use super::xirr::{solve_xirr, CashFlow, XirrSolution};
use crate::config::EngineConfig;
use crate::dates::DAYS_PER_YEAR_JULIAN;
use crate::investment::{earliest_start, value_all, Investment, ValuationResult};
use crate::nav::NavSeries;

/// One fund's investments with that fund's NAV history
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FundHoldings {
    pub scheme_code: u32,
    pub investments: Vec<Investment>,
    pub nav: NavSeries,
}

impl FundHoldings {
    pub fn new(scheme_code: u32, investments: Vec<Investment>, nav: NavSeries) -> Self {
        Self {
            scheme_code,
            investments,
            nav,
        }
    }

    fn has_nav(&self) -> bool {
        !self.nav.is_empty()
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PortfolioMethod {
    #[default]
    MergedTimeline,
    PerFund,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FundMetrics {
    pub scheme_code: u32,
    pub metrics: ReturnMetrics,
}

/// Metrics for each fund on its own, computed in parallel
pub fn fund_metrics(funds: &[FundHoldings], as_of: NaiveDate, config: &EngineConfig) -> Vec<FundMetrics> {
    funds
        .par_iter()
        .map(|fund| FundMetrics {
            scheme_code: fund.scheme_code,
            metrics: compute_metrics(&fund.investments, &fund.nav, as_of, config),
        })
        .collect()
}

/// Aggregate metrics for a whole portfolio.
///
/// Funds without NAV history contribute nothing.
pub fn compute_portfolio_metrics(funds: &[FundHoldings], as_of: NaiveDate, config: &EngineConfig) -> ReturnMetrics {
    let priced: Vec<&FundHoldings> = funds.iter().filter(|f| f.has_nav()).collect();
    if priced.is_empty() {
        return ReturnMetrics::default();
    }

    let total: ValuationResult = priced
        .iter()
        .map(|f| value_all(&f.investments, &f.nav, as_of))
        .sum();

    let (cagr, solution) = match config.portfolio_method {
        PortfolioMethod::MergedTimeline => merged_timeline_returns(&priced, as_of, config),
        PortfolioMethod::PerFund => per_fund_returns(&priced, total, as_of, config),
    };
    debug!(
        "portfolio of {} funds: invested {:.2}, value {:.2}, xirr {:?}",
        priced.len(),
        total.invested_amount,
        total.current_value,
        solution.status
    );

    ReturnMetrics {
        cagr,
        xirr: finite_or_zero(solution.percent()),
        xirr_status: solution.status,
        one_day_change: portfolio_one_day_change(&priced, as_of),
        ..ReturnMetrics::from_valuation(total)
    }
}

fn merged_timeline_returns(funds: &[&FundHoldings], as_of: NaiveDate, config: &EngineConfig) -> (f64, XirrSolution) {
    let merged = NavSeries::merge(funds.iter().map(|f| &f.nav));
    let investments: Vec<Investment> = funds.iter().flat_map(|f| f.investments.iter().cloned()).collect();
    (
        cagr(&investments, &merged, as_of),
        xirr(&investments, &merged, as_of, &config.xirr),
    )
}

fn per_fund_returns(
    funds: &[&FundHoldings],
    total: ValuationResult,
    as_of: NaiveDate,
    config: &EngineConfig,
) -> (f64, XirrSolution) {
    let mut flows: Vec<CashFlow> = funds
        .iter()
        .flat_map(|f| investment_outflows(&f.investments, &f.nav, as_of))
        .collect();
    if flows.is_empty() {
        return (0.0, solve_xirr(&[], &config.xirr));
    }
    flows.push(CashFlow::new(as_of, total.current_value));

    let start = funds.iter().filter_map(|f| earliest_start(&f.investments)).min();
    let latest = funds.iter().filter_map(|f| f.nav.latest().map(|p| p.date)).max();
    let years = match (start, latest) {
        (Some(start), Some(latest)) => (latest - start).num_days() as f64 / DAYS_PER_YEAR_JULIAN,
        _ => 0.0,
    };

    (
        cagr_from(total.invested_amount, total.current_value, years),
        solve_xirr(&flows, &config.xirr),
    )
}

/// Sum of each fund's value at its own last two NAV points
fn portfolio_one_day_change(funds: &[&FundHoldings], as_of: NaiveDate) -> OneDayChange {
    let (previous, latest) = funds
        .iter()
        .filter_map(|f| day_values(&f.investments, &f.nav, as_of))
        .fold((0.0, 0.0), |(p, l), (fp, fl)| (p + fp, l + fl));
    OneDayChange::between(previous, latest)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::SolverStatus;
    use crate::nav::NavPoint;
    use approx::assert_abs_diff_eq;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn fund_a() -> FundHoldings {
        FundHoldings::new(
            1,
            vec![Investment::lump_sum("a1", 10_000.0, d(2023, 1, 2))],
            NavSeries::new(vec![
                NavPoint::new(d(2023, 1, 2), 10.0),
                NavPoint::new(d(2024, 1, 1), 12.0),
                NavPoint::new(d(2024, 1, 2), 12.5),
            ]),
        )
    }

    fn fund_b() -> FundHoldings {
        FundHoldings::new(
            2,
            vec![Investment::sip("b1", 1000.0, 1, d(2023, 6, 1))],
            NavSeries::new(vec![
                NavPoint::new(d(2023, 6, 1), 100.0),
                NavPoint::new(d(2023, 10, 2), 105.0),
                NavPoint::new(d(2024, 1, 1), 110.0),
                NavPoint::new(d(2024, 1, 2), 108.0),
            ]),
        )
    }

    #[test]
    fn test_totals_are_per_fund() {
        let as_of = d(2024, 1, 3);
        let config = EngineConfig::default();
        let funds = vec![fund_a(), fund_b()];
        let portfolio = compute_portfolio_metrics(&funds, as_of, &config);

        let per_fund = fund_metrics(&funds, as_of, &config);
        let invested: f64 = per_fund.iter().map(|f| f.metrics.total_invested).sum();
        let value: f64 = per_fund.iter().map(|f| f.metrics.total_current_value).sum();
        let day: f64 = per_fund.iter().map(|f| f.metrics.one_day_change.absolute).sum();

        assert_abs_diff_eq!(portfolio.total_invested, invested, epsilon = 1e-9);
        assert_abs_diff_eq!(portfolio.total_current_value, value, epsilon = 1e-9);
        assert_abs_diff_eq!(portfolio.one_day_change.absolute, day, epsilon = 1e-9);
    }

    #[test]
    fn test_fund_metrics_keeps_order() {
        let funds = vec![fund_b(), fund_a()];
        let codes: Vec<u32> = fund_metrics(&funds, d(2024, 1, 3), &EngineConfig::default())
            .iter()
            .map(|f| f.scheme_code)
            .collect();
        assert_eq!(codes, vec![2, 1]);
    }

    #[test]
    fn test_per_fund_method_single_fund_matches_fund_metrics() {
        let as_of = d(2024, 1, 3);
        let config = EngineConfig {
            portfolio_method: PortfolioMethod::PerFund,
            ..EngineConfig::default()
        };
        let funds = vec![fund_a()];
        let portfolio = compute_portfolio_metrics(&funds, as_of, &config);
        let single = compute_metrics(&funds[0].investments, &funds[0].nav, as_of, &config);

        assert_abs_diff_eq!(portfolio.xirr, single.xirr, epsilon = 1e-6);
        assert_abs_diff_eq!(portfolio.cagr, single.cagr, epsilon = 1e-9);
    }

    #[test]
    fn test_methods_differ_only_in_rates() {
        let as_of = d(2024, 1, 3);
        let funds = vec![fund_a(), fund_b()];
        let merged = compute_portfolio_metrics(&funds, as_of, &EngineConfig::default());
        let per_fund = compute_portfolio_metrics(
            &funds,
            as_of,
            &EngineConfig {
                portfolio_method: PortfolioMethod::PerFund,
                ..EngineConfig::default()
            },
        );

        assert_eq!(merged.total_invested, per_fund.total_invested);
        assert_eq!(merged.one_day_change, per_fund.one_day_change);
        assert_eq!(per_fund.xirr_status, SolverStatus::Converged);
    }

    #[test]
    fn test_funds_without_nav_are_ignored() {
        let as_of = d(2024, 1, 3);
        let config = EngineConfig::default();
        let mut unpriced = fund_b();
        unpriced.nav = NavSeries::default();

        let with = compute_portfolio_metrics(&[fund_a(), unpriced], as_of, &config);
        let without = compute_portfolio_metrics(&[fund_a()], as_of, &config);
        assert_eq!(with, without);

        assert_eq!(compute_portfolio_metrics(&[], as_of, &config), ReturnMetrics::default());
    }
}
