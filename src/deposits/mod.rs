//! Deposit projections: fixed deposits, recurring deposits and PPF

mod fixed;
mod ppf;
mod recurring;
mod segments;
mod terms;

pub use fixed::project;
pub use ppf::{calculate_ppf, PpfContribution, PpfSummary, PpfYear, PPF_TENURE_YEARS};
pub use recurring::{installment_dates, project_recurring};
pub use segments::{DepositSummary, FiscalYearSegment};
pub use terms::{Compounding, DepositForm, DepositTerms, RecurringDepositTerms};
