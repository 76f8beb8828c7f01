//! Returns Engine - deposit projections and NAV-based portfolio returns
//!
//! This library provides:
//! - Fixed deposit, recurring deposit and PPF projections split by Indian fiscal year
//! - SIP and lump-sum unit accounting against historical NAV series
//! - Return metrics: absolute gain, one-day change, CAGR and XIRR
//! - An investment repository with immutable snapshots
//!
//! Every entry point takes the valuation date (`as_of`) explicitly.

pub mod config;
pub mod dates;
pub mod deposits;
pub mod error;
pub mod investment;
pub mod metrics;
pub mod nav;

// Re-export commonly used types
pub use config::EngineConfig;
pub use dates::{FiscalYear, Tenure};
pub use deposits::{project, Compounding, DepositSummary, DepositTerms, FiscalYearSegment};
pub use error::{EngineError, Result};
pub use investment::{generate_installments, value_of, Installment, Investment, InvestmentRepository, ValuationResult};
pub use metrics::{compute_metrics, compute_portfolio_metrics, solve_xirr, FundHoldings, ReturnMetrics};
pub use nav::{NavPoint, NavSeries};
