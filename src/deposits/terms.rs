//! Deposit inputs

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::dates::{parse_iso_strict, Tenure};
use crate::error::{EngineError, Result};

/// Interest compounding frequency
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Compounding {
    Monthly,
    Quarterly,
    HalfYearly,
    Annually,
}

impl Compounding {
    /// Compounding periods per year (n)
    pub fn periods_per_year(&self) -> f64 {
        match self {
            Compounding::Monthly => 12.0,
            Compounding::Quarterly => 4.0,
            Compounding::HalfYearly => 2.0,
            Compounding::Annually => 1.0,
        }
    }

    /// (1 + r/n)^(n·t) for a decimal annual rate `r` over `years`
    pub fn growth_factor(&self, annual_rate: f64, years: f64) -> f64 {
        let n = self.periods_per_year();
        (1.0 + annual_rate / n).powf(n * years)
    }
}

impl FromStr for Compounding {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "monthly" => Ok(Compounding::Monthly),
            "quarterly" => Ok(Compounding::Quarterly),
            "halfyearly" | "half-yearly" | "half_yearly" => Ok(Compounding::HalfYearly),
            "annually" | "yearly" => Ok(Compounding::Annually),
            other => Err(EngineError::invalid_input(
                "compounding",
                format!("unknown frequency '{}'", other),
            )),
        }
    }
}

impl fmt::Display for Compounding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Compounding::Monthly => "monthly",
            Compounding::Quarterly => "quarterly",
            Compounding::HalfYearly => "halfYearly",
            Compounding::Annually => "annually",
        };
        f.write_str(s)
    }
}

/// Fixed deposit terms
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DepositTerms {
    pub principal: f64,
    /// Annual nominal rate in percent (6.5 = 6.5%)
    pub rate: f64,
    pub compounding: Compounding,
    pub tenure: Tenure,
    pub start_date: NaiveDate,
}

impl DepositTerms {
    pub fn validate(&self) -> Result<()> {
        validate_amount("principal", self.principal)?;
        validate_rate(self.rate)
    }
}

/// Recurring deposit terms
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecurringDepositTerms {
    pub monthly_installment: f64,
    /// Annual nominal rate in percent
    pub rate: f64,
    #[serde(default = "default_rd_compounding")]
    pub compounding: Compounding,
    pub tenure: Tenure,
    pub start_date: NaiveDate,
}

fn default_rd_compounding() -> Compounding {
    Compounding::Quarterly
}

impl RecurringDepositTerms {
    pub fn validate(&self) -> Result<()> {
        validate_amount("monthly_installment", self.monthly_installment)?;
        validate_rate(self.rate)
    }
}

/// Deposit fields exactly as typed into a form
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DepositForm {
    pub start_date: String,
    pub amount: String,
    pub rate: String,
    pub tenure_years: String,
    pub tenure_months: String,
    pub tenure_days: String,
    pub compounding: String,
}

impl DepositForm {
    fn tenure(&self) -> Result<Tenure> {
        Ok(Tenure::new(
            parse_count("tenure_years", &self.tenure_years)?,
            parse_count("tenure_months", &self.tenure_months)?,
            parse_count("tenure_days", &self.tenure_days)?,
        ))
    }

    pub fn to_fixed(&self) -> Result<DepositTerms> {
        let terms = DepositTerms {
            principal: parse_number("amount", &self.amount)?,
            rate: parse_number("rate", &self.rate)?,
            compounding: self.compounding.parse()?,
            tenure: self.tenure()?,
            start_date: parse_iso_strict("start_date", &self.start_date)?,
        };
        terms.validate()?;
        Ok(terms)
    }

    /// Blank compounding falls back to quarterly, the usual RD convention
    pub fn to_recurring(&self) -> Result<RecurringDepositTerms> {
        let compounding = if self.compounding.trim().is_empty() {
            default_rd_compounding()
        } else {
            self.compounding.parse()?
        };
        let terms = RecurringDepositTerms {
            monthly_installment: parse_number("amount", &self.amount)?,
            rate: parse_number("rate", &self.rate)?,
            compounding,
            tenure: self.tenure()?,
            start_date: parse_iso_strict("start_date", &self.start_date)?,
        };
        terms.validate()?;
        Ok(terms)
    }
}

fn parse_number(field: &str, value: &str) -> Result<f64> {
    value
        .trim()
        .parse::<f64>()
        .map_err(|_| EngineError::invalid_input(field, format!("'{}' is not a number", value)))
}

fn parse_count(field: &str, value: &str) -> Result<u32> {
    value.trim().parse::<u32>().map_err(|_| {
        EngineError::invalid_input(field, format!("'{}' is not a whole number", value))
    })
}

fn validate_amount(field: &str, amount: f64) -> Result<()> {
    if !amount.is_finite() || amount < 0.0 {
        return Err(EngineError::invalid_input(field, "must be a non-negative amount"));
    }
    Ok(())
}

fn validate_rate(rate: f64) -> Result<()> {
    if !rate.is_finite() || rate < 0.0 {
        return Err(EngineError::invalid_input("rate", "must be a non-negative percentage"));
    }
    Ok(())
}
