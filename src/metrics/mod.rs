//! Return metrics: gain, one-day change, CAGR and XIRR
//!
//! Every function takes the valuation date explicitly and returns neutral
//! zero results when there is not enough data.

mod portfolio;
mod returns;
mod scheme_returns;
pub mod xirr;

pub use portfolio::{compute_portfolio_metrics, fund_metrics, FundHoldings, FundMetrics, PortfolioMethod};
pub use returns::{
    cagr, cash_flows, compute_metrics, investment_outflows, one_day_change, xirr, OneDayChange, ReturnMetrics,
};
pub use scheme_returns::{holding_period, scheme_returns, HoldingPeriod, Timeframe, TimeframeReturn};
pub use xirr::{solve_xirr, CashFlow, SolverStatus, XirrConfig, XirrSolution};
