//! Recurring deposit projection

use chrono::NaiveDate;
use log::debug;

use super::segments::{fiscal_slices, DepositSummary, FiscalYearSegment};
use super::terms::RecurringDepositTerms;
use crate::dates::{add_months, elapsed_years};
use crate::error::{EngineError, Result};

/// Installment dates: the start date and every month after it, strictly
/// before maturity. Each date is offset from the start so a 31st start
/// does not drift after a short month.
pub fn installment_dates(start: NaiveDate, maturity: NaiveDate) -> Result<Vec<NaiveDate>> {
    let mut dates = Vec::new();
    let mut k = 0;
    loop {
        let date = add_months(start, k)
            .ok_or_else(|| EngineError::invalid_input("tenure", "installment date out of range"))?;
        if date >= maturity {
            break;
        }
        dates.push(date);
        k += 1;
    }
    Ok(dates)
}

/// Project a recurring deposit to maturity, one segment per fiscal year.
///
/// A segment's closing balance is its opening balance grown across the
/// segment plus every installment paid in the segment grown from its own
/// date to the segment end.
pub fn project_recurring(terms: &RecurringDepositTerms) -> Result<DepositSummary> {
    terms.validate()?;

    let start = terms.start_date;
    let maturity_date = terms.tenure.end_date(start)?;
    let rate = terms.rate / 100.0;
    let installments = installment_dates(start, maturity_date)?;

    let growth = |from: NaiveDate, to: NaiveDate| {
        let years = elapsed_years(start, to) - elapsed_years(start, from);
        terms.compounding.growth_factor(rate, years)
    };

    let mut balance = 0.0;
    let mut segments = Vec::new();
    let mut pending = installments.iter().peekable();

    for slice in fiscal_slices(start, maturity_date) {
        let mut closing = balance * growth(slice.from, slice.to);
        let mut contribution = 0.0;

        while let Some(&&date) = pending.peek() {
            if date >= slice.to {
                break;
            }
            closing += terms.monthly_installment * growth(date, slice.to);
            contribution += terms.monthly_installment;
            pending.next();
        }

        debug!(
            "RD {}: opening {} deposited {} closing {}",
            slice.fiscal_year, balance, contribution, closing
        );

        segments.push(FiscalYearSegment {
            fiscal_year: slice.fiscal_year,
            start_date: slice.from,
            end_date: slice.end_date(),
            opening_balance: balance,
            closing_balance: closing,
            interest: (closing - balance - contribution).max(0.0),
            contribution: Some(contribution),
        });

        balance = closing;
    }

    let total_deposited = terms.monthly_installment * installments.len() as f64;

    Ok(DepositSummary {
        total_interest: balance - total_deposited,
        maturity_amount: balance,
        maturity_date,
        total_deposited,
        segments,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dates::Tenure;
    use crate::deposits::Compounding;
    use approx::assert_abs_diff_eq;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn terms(rate: f64, tenure: Tenure, start: NaiveDate) -> RecurringDepositTerms {
        RecurringDepositTerms {
            monthly_installment: 10_000.0,
            rate,
            compounding: Compounding::Quarterly,
            tenure,
            start_date: start,
        }
    }

    #[test]
    fn test_installment_dates() {
        let dates = installment_dates(d(2024, 1, 31), d(2024, 5, 31)).unwrap();
        assert_eq!(
            dates,
            vec![d(2024, 1, 31), d(2024, 2, 29), d(2024, 3, 31), d(2024, 4, 30)]
        );
    }

    #[test]
    fn test_zero_rate_returns_deposits() {
        let summary = project_recurring(&terms(0.0, Tenure::years(1), d(2024, 4, 1))).unwrap();
        assert_eq!(summary.total_deposited, 120_000.0);
        assert_abs_diff_eq!(summary.maturity_amount, 120_000.0, epsilon = 1e-9);
        assert_abs_diff_eq!(summary.total_interest, 0.0, epsilon = 1e-9);
    }

    #[test]
    fn test_three_year_rd() {
        let summary = project_recurring(&terms(6.5, Tenure::years(3), d(2023, 6, 10))).unwrap();

        assert_eq!(summary.total_deposited, 360_000.0);
        assert!(summary.maturity_amount > summary.total_deposited);
        // FY 2023-24 .. FY 2026-27
        assert_eq!(summary.segments.len(), 4);

        let deposited: f64 = summary.segments.iter().filter_map(|s| s.contribution).sum();
        assert_abs_diff_eq!(deposited, summary.total_deposited, epsilon = 1e-9);
        assert_abs_diff_eq!(summary.segment_interest(), summary.total_interest, epsilon = 1e-6);
    }

    #[test]
    fn test_first_installment_full_term_growth() {
        // One installment only: grows like a one-month FD
        let summary = project_recurring(&terms(12.0, Tenure::new(0, 1, 0), d(2024, 5, 1))).unwrap();
        let expected = 10_000.0 * Compounding::Quarterly.growth_factor(0.12, 31.0 / 365.0);
        assert_abs_diff_eq!(summary.maturity_amount, expected, epsilon = 1e-9);
    }
}
