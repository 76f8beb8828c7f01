//! Investments, their installment ledger, valuation and storage

mod installment;
mod schedule;
mod types;
mod valuation;
pub mod store;

pub use installment::{
    executed_installments, fiscal_year_ledger, generate_installments, installments_of, FiscalYearActivity,
    Installment, InstallmentKind, InstallmentStatus, Purchase, STAMP_DUTY_RATE,
};
pub use schedule::{scheduled_dates, sip_schedule};
pub use store::{InMemoryRepository, InvestmentRepository, PortfolioSnapshot};
pub use types::{earliest_start, Investment, LumpSum, SipAmountModification, SipPlan};
pub use valuation::{value_all, value_of, ValuationResult};
