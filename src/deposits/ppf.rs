//! Public Provident Fund schedule
//!
//! A PPF account runs for 15 fiscal years. Interest is credited once a year:
//! the opening balance earns a full year, and each contribution earns a
//! pro-rata share for the days left until the next April 1.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::segments::FiscalYearSegment;
use crate::dates::{serde_dmy, FiscalYear, DAYS_PER_YEAR};
use crate::error::{EngineError, Result};

/// Lifetime of a PPF account in fiscal years
pub const PPF_TENURE_YEARS: i32 = 15;

/// One deposit into the account
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PpfContribution {
    pub amount: f64,
    /// April 1 of the fiscal year when absent
    #[serde(default, with = "serde_dmy::option")]
    pub date: Option<NaiveDate>,
}

/// Contributions and rate override for one fiscal year
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PpfYear {
    /// Fiscal year start year
    pub year: i32,
    /// Annual rate in percent; the account default when absent or zero
    #[serde(default)]
    pub interest_rate: Option<f64>,
    #[serde(default)]
    pub contributions: Vec<PpfContribution>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PpfSummary {
    pub segments: Vec<FiscalYearSegment>,
    pub total_invested: f64,
    pub total_interest: f64,
    pub maturity_amount: f64,
    pub absolute_return: f64,
    pub absolute_return_percentage: f64,
}

/// Interest earned by a contribution in the fiscal year `fy` at `rate` percent
fn pro_rata_interest(contribution: &PpfContribution, rate: f64, fy: FiscalYear) -> f64 {
    let date = contribution.date.unwrap_or_else(|| fy.start_date());
    let fraction = if date < fy.start_date() {
        1.0
    } else {
        let days = (fy.next().start_date() - date).num_days().max(0) as f64;
        days.min(DAYS_PER_YEAR) / DAYS_PER_YEAR
    };
    contribution.amount * (rate / 100.0) * fraction
}

/// Build the 15-year schedule for an account opened in fiscal year `start_year`
pub fn calculate_ppf(start_year: i32, default_rate: f64, years: &[PpfYear]) -> Result<PpfSummary> {
    if !default_rate.is_finite() || default_rate < 0.0 {
        return Err(EngineError::invalid_input("rate", "must be a non-negative percentage"));
    }
    for year in years {
        if let Some(rate) = year.interest_rate {
            if !rate.is_finite() || rate < 0.0 {
                return Err(EngineError::invalid_input(
                    "interest_rate",
                    format!("FY {} rate must be a non-negative percentage", year.year),
                ));
            }
        }
        if year.contributions.iter().any(|c| !c.amount.is_finite() || c.amount < 0.0) {
            return Err(EngineError::invalid_input(
                "contributions",
                format!("FY {} has a negative contribution", year.year),
            ));
        }
    }

    let mut balance = 0.0;
    let mut total_invested = 0.0;
    let mut total_interest = 0.0;
    let mut segments = Vec::with_capacity(PPF_TENURE_YEARS as usize);

    for offset in 0..PPF_TENURE_YEARS {
        let fy = FiscalYear::new(start_year + offset);
        let entry = years.iter().find(|y| y.year == fy.start_year());
        let rate = entry
            .and_then(|y| y.interest_rate)
            .filter(|rate| *rate > 0.0)
            .unwrap_or(default_rate);
        let contributions = entry.map(|y| y.contributions.as_slice()).unwrap_or(&[]);

        let opening = balance;
        let deposited: f64 = contributions.iter().map(|c| c.amount).sum();
        let interest = opening * (rate / 100.0)
            + contributions
                .iter()
                .map(|c| pro_rata_interest(c, rate, fy))
                .sum::<f64>();

        balance = opening + deposited + interest;
        total_invested += deposited;
        total_interest += interest;

        segments.push(FiscalYearSegment {
            fiscal_year: fy,
            start_date: fy.start_date(),
            end_date: fy.end_date(),
            opening_balance: opening,
            closing_balance: balance,
            interest,
            contribution: Some(deposited),
        });
    }

    let absolute_return = balance - total_invested;
    let absolute_return_percentage = if total_invested > 0.0 {
        absolute_return / total_invested * 100.0
    } else {
        0.0
    };

    Ok(PpfSummary {
        segments,
        total_invested,
        total_interest,
        maturity_amount: balance,
        absolute_return,
        absolute_return_percentage,
    })
}
