//! User-declared investments
//!
//! An investment is the source of truth for its cash flows; installments are
//! always derived from it on demand.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::dates::serde_dmy;
use crate::error::{EngineError, Result};

/// A SIP amount change that applies from `effective_date` onwards
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SipAmountModification {
    #[serde(with = "serde_dmy")]
    pub effective_date: NaiveDate,
    pub amount: f64,
}

/// One-time purchase
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LumpSum {
    pub id: String,
    pub amount: f64,
    #[serde(with = "serde_dmy")]
    pub date: NaiveDate,
}

/// Monthly systematic investment plan
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SipPlan {
    pub id: String,
    /// Base monthly amount before any modification
    pub amount: f64,
    /// Day of month for installments after the first (clamped to month end)
    #[serde(default = "default_sip_day")]
    pub day_of_month: u32,
    /// Date of the first installment
    #[serde(with = "serde_dmy")]
    pub start_date: NaiveDate,
    /// Set when the SIP is cancelled; installments after it never happen
    #[serde(default, with = "serde_dmy::option", skip_serializing_if = "Option::is_none")]
    pub end_date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub modifications: Vec<SipAmountModification>,
    #[serde(default, with = "serde_dmy::vec", skip_serializing_if = "Vec::is_empty")]
    pub skipped_dates: Vec<NaiveDate>,
}

fn default_sip_day() -> u32 {
    1
}

impl SipPlan {
    pub fn new(id: impl Into<String>, amount: f64, day_of_month: u32, start_date: NaiveDate) -> Self {
        Self {
            id: id.into(),
            amount,
            day_of_month,
            start_date,
            end_date: None,
            modifications: Vec::new(),
            skipped_dates: Vec::new(),
        }
    }

    /// Installment amount on `date`: the modification with the latest
    /// effective date on or before `date`, else the base amount.
    /// Among modifications sharing an effective date the last one listed wins.
    pub fn amount_on(&self, date: NaiveDate) -> f64 {
        self.modifications
            .iter()
            .enumerate()
            .filter(|(_, m)| m.effective_date <= date)
            .max_by_key(|(i, m)| (m.effective_date, *i))
            .map(|(_, m)| m.amount)
            .unwrap_or(self.amount)
    }

    pub fn is_skipped(&self, date: NaiveDate) -> bool {
        self.skipped_dates.contains(&date)
    }

    pub fn is_cancelled(&self) -> bool {
        self.end_date.is_some()
    }

    /// Copy with a new amount applying from `effective_date`
    pub fn with_amount_change(mut self, effective_date: NaiveDate, amount: f64) -> Self {
        self.modifications.push(SipAmountModification {
            effective_date,
            amount,
        });
        self.modifications.sort_by_key(|m| m.effective_date);
        self
    }

    /// Copy cancelled as of `end_date`
    pub fn cancelled(mut self, end_date: NaiveDate) -> Self {
        self.end_date = Some(end_date);
        self
    }

    /// Copy with the installment on `date` skipped
    pub fn with_skipped(mut self, date: NaiveDate) -> Self {
        if !self.skipped_dates.contains(&date) {
            self.skipped_dates.push(date);
            self.skipped_dates.sort();
        }
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Investment {
    #[serde(rename = "lumpsum")]
    LumpSum(LumpSum),
    Sip(SipPlan),
}

impl Investment {
    pub fn lump_sum(id: impl Into<String>, amount: f64, date: NaiveDate) -> Self {
        Investment::LumpSum(LumpSum {
            id: id.into(),
            amount,
            date,
        })
    }

    pub fn sip(id: impl Into<String>, amount: f64, day_of_month: u32, start_date: NaiveDate) -> Self {
        Investment::Sip(SipPlan::new(id, amount, day_of_month, start_date))
    }

    pub fn id(&self) -> &str {
        match self {
            Investment::LumpSum(l) => &l.id,
            Investment::Sip(s) => &s.id,
        }
    }

    /// Purchase date of a lump sum, first installment of a SIP
    pub fn start_date(&self) -> NaiveDate {
        match self {
            Investment::LumpSum(l) => l.date,
            Investment::Sip(s) => s.start_date,
        }
    }

    pub fn as_sip(&self) -> Option<&SipPlan> {
        match self {
            Investment::Sip(s) => Some(s),
            Investment::LumpSum(_) => None,
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.id().trim().is_empty() {
            return Err(EngineError::invalid_input("id", "must not be empty"));
        }
        match self {
            Investment::LumpSum(l) => validate_amount("amount", l.amount),
            Investment::Sip(s) => {
                validate_amount("amount", s.amount)?;
                if !(1..=31).contains(&s.day_of_month) {
                    return Err(EngineError::invalid_input(
                        "day_of_month",
                        format!("{} is not a day of the month", s.day_of_month),
                    ));
                }
                if let Some(end) = s.end_date {
                    if end < s.start_date {
                        return Err(EngineError::invalid_input("end_date", "before start_date"));
                    }
                }
                s.modifications
                    .iter()
                    .try_for_each(|m| validate_amount("modifications.amount", m.amount))
            }
        }
    }
}

fn validate_amount(field: &str, amount: f64) -> Result<()> {
    if !amount.is_finite() || amount < 0.0 {
        return Err(EngineError::invalid_input(field, "must be a non-negative amount"));
    }
    Ok(())
}

/// Earliest declared start date across investments
pub fn earliest_start(investments: &[Investment]) -> Option<NaiveDate> {
    investments.iter().map(Investment::start_date).min()
}
