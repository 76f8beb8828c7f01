//! Extended Internal Rate of Return (XIRR)
//!
//! Newton-Raphson over dated cash flows with an analytic derivative. The
//! solver always hands back its best estimate together with a
//! [`SolverStatus`] describing how the iteration ended.

use chrono::NaiveDate;
use log::debug;
use serde::{Deserialize, Serialize};

use crate::dates::DAYS_PER_YEAR_JULIAN;

/// A dated cash flow (negative = money in, positive = money out)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CashFlow {
    pub date: NaiveDate,
    pub amount: f64,
}

impl CashFlow {
    pub fn new(date: NaiveDate, amount: f64) -> Self {
        Self { date, amount }
    }
}

/// Solver knobs
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct XirrConfig {
    pub initial_guess: f64,
    pub max_iterations: u32,
    /// Converged once |NPV| falls below this
    pub tolerance: f64,
    /// Iteration stops when |dNPV/dr| falls below this
    pub derivative_floor: f64,
    pub min_rate: f64,
    pub max_rate: f64,
}

impl Default for XirrConfig {
    fn default() -> Self {
        Self {
            initial_guess: 0.1,
            max_iterations: 100,
            tolerance: 1e-6,
            derivative_floor: 1e-10,
            min_rate: -0.99,
            max_rate: 100.0,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SolverStatus {
    Converged,
    /// Derivative too flat to take another step
    DerivativeVanished,
    IterationLimit,
    /// NPV or its derivative stopped being finite
    NonFinite,
    /// Fewer than two cash flows
    #[default]
    InsufficientCashFlows,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct XirrSolution {
    /// Annual rate as a decimal (0.12 = 12%)
    pub rate: f64,
    pub iterations: u32,
    /// |NPV| at `rate`
    pub residual: f64,
    pub status: SolverStatus,
}

impl XirrSolution {
    pub fn converged(&self) -> bool {
        self.status == SolverStatus::Converged
    }

    /// Rate as a percentage
    pub fn percent(&self) -> f64 {
        self.rate * 100.0
    }
}

/// Calculate NPV and its derivative with respect to rate
fn npv_and_derivative(cash_flows: &[CashFlow], base: NaiveDate, rate: f64) -> (f64, f64) {
    let mut npv = 0.0;
    let mut dnpv = 0.0;

    for cf in cash_flows {
        let years = (cf.date - base).num_days() as f64 / DAYS_PER_YEAR_JULIAN;
        npv += cf.amount * (1.0 + rate).powf(-years);
        dnpv -= years * cf.amount * (1.0 + rate).powf(-years - 1.0);
    }

    (npv, dnpv)
}

/// Solve for the annual rate that zeroes the NPV of `cash_flows`.
///
/// Cash flows may come in any order; the earliest date is the discounting
/// base. Each step is clamped to `[min_rate, max_rate]`.
pub fn solve_xirr(cash_flows: &[CashFlow], config: &XirrConfig) -> XirrSolution {
    let Some(base) = cash_flows.iter().map(|cf| cf.date).min() else {
        return insufficient();
    };
    if cash_flows.len() < 2 {
        return insufficient();
    }

    let mut rate = config.initial_guess.clamp(config.min_rate, config.max_rate);
    let mut residual = f64::INFINITY;

    for iteration in 0..config.max_iterations {
        let (npv, dnpv) = npv_and_derivative(cash_flows, base, rate);

        if !npv.is_finite() || !dnpv.is_finite() {
            return solution(rate, iteration, residual, SolverStatus::NonFinite);
        }
        residual = npv.abs();

        if residual < config.tolerance {
            debug!("xirr converged to {:.6} after {} iterations", rate, iteration);
            return solution(rate, iteration, residual, SolverStatus::Converged);
        }

        if dnpv.abs() < config.derivative_floor {
            return solution(rate, iteration, residual, SolverStatus::DerivativeVanished);
        }

        rate = (rate - npv / dnpv).clamp(config.min_rate, config.max_rate);
    }

    let (npv, _) = npv_and_derivative(cash_flows, base, rate);
    if npv.is_finite() {
        residual = npv.abs();
    }
    debug!("xirr stopped at {:.6} with residual {:.3e}", rate, residual);
    solution(rate, config.max_iterations, residual, SolverStatus::IterationLimit)
}

fn solution(rate: f64, iterations: u32, residual: f64, status: SolverStatus) -> XirrSolution {
    XirrSolution {
        rate,
        iterations,
        residual,
        status,
    }
}

fn insufficient() -> XirrSolution {
    solution(0.0, 0, 0.0, SolverStatus::InsufficientCashFlows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn test_doubling_in_a_year() {
        let flows = [CashFlow::new(d(2023, 1, 1), -1000.0), CashFlow::new(d(2024, 1, 1), 2000.0)];
        let sol = solve_xirr(&flows, &XirrConfig::default());

        assert!(sol.converged());
        assert!((sol.rate - 1.0).abs() < 0.001, "Expected ~100%, got {}", sol.percent());
    }

    #[test]
    fn test_simple_gain_and_loss() {
        let config = XirrConfig::default();
        let gain = [CashFlow::new(d(2023, 1, 1), -1000.0), CashFlow::new(d(2024, 1, 1), 1100.0)];
        let loss = [CashFlow::new(d(2023, 1, 1), -1000.0), CashFlow::new(d(2024, 1, 1), 900.0)];

        assert!((solve_xirr(&gain, &config).rate - 0.10).abs() < 0.001);
        assert!((solve_xirr(&loss, &config).rate + 0.10).abs() < 0.001);
    }

    #[test]
    fn test_order_independent() {
        let config = XirrConfig::default();
        let flows = [
            CashFlow::new(d(2024, 1, 1), 1700.0),
            CashFlow::new(d(2023, 1, 1), -1000.0),
            CashFlow::new(d(2023, 6, 1), -500.0),
        ];
        let mut sorted = flows;
        sorted.sort_by_key(|cf| cf.date);

        let a = solve_xirr(&flows, &config);
        let b = solve_xirr(&sorted, &config);
        assert!(a.converged());
        assert!(a.rate > 0.10 && a.rate < 0.20);
        assert_abs_diff_eq!(a.rate, b.rate, epsilon = 1e-9);
    }

    #[test]
    fn test_insufficient_cash_flows() {
        let config = XirrConfig::default();
        assert_eq!(solve_xirr(&[], &config).status, SolverStatus::InsufficientCashFlows);

        let one = [CashFlow::new(d(2023, 1, 1), -1000.0)];
        let sol = solve_xirr(&one, &config);
        assert_eq!(sol.status, SolverStatus::InsufficientCashFlows);
        assert_eq!(sol.rate, 0.0);
    }

    #[test]
    fn test_same_day_flows_have_flat_derivative() {
        let flows = [CashFlow::new(d(2023, 1, 1), -1000.0), CashFlow::new(d(2023, 1, 1), 1200.0)];
        let sol = solve_xirr(&flows, &XirrConfig::default());
        assert_eq!(sol.status, SolverStatus::DerivativeVanished);
        assert_eq!(sol.rate, 0.1);
    }

    #[test]
    fn test_no_sign_change_stays_bounded() {
        let config = XirrConfig::default();
        let flows = [CashFlow::new(d(2023, 1, 1), -1000.0), CashFlow::new(d(2024, 1, 1), -500.0)];
        let sol = solve_xirr(&flows, &config);
        assert!(!sol.converged());
        assert!(sol.rate >= config.min_rate && sol.rate <= config.max_rate);
    }
}
