//! Date handling: Indian fiscal years, strict parsing, tenure arithmetic

mod calendar;
mod fiscal;
pub mod serde_dmy;

pub use calendar::{
    add_months, day_in_month, elapsed_years, parse_dmy, parse_iso_strict, Tenure, DAYS_PER_YEAR,
    DAYS_PER_YEAR_JULIAN,
};
pub use fiscal::{fiscal_years_in_range, FiscalYear, FiscalYearPeriod};
