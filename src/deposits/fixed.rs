//! Fixed deposit projection

use log::debug;

use super::segments::{fiscal_slices, DepositSummary, FiscalYearSegment};
use super::terms::DepositTerms;
use crate::dates::elapsed_years;
use crate::error::Result;

/// Project a fixed deposit to maturity, one segment per fiscal year.
///
/// Each segment compounds the previous segment's closing balance over the
/// year fraction it covers. Year fractions are measured from the deposit
/// start, so the segments compose to the whole-tenure growth.
pub fn project(terms: &DepositTerms) -> Result<DepositSummary> {
    terms.validate()?;

    let start = terms.start_date;
    let maturity_date = terms.tenure.end_date(start)?;
    let rate = terms.rate / 100.0;

    let mut balance = terms.principal;
    let mut segments = Vec::new();

    for slice in fiscal_slices(start, maturity_date) {
        let years = elapsed_years(start, slice.to) - elapsed_years(start, slice.from);
        let closing = balance * terms.compounding.growth_factor(rate, years);

        debug!(
            "FD {}: {} -> {} over {:.6}y",
            slice.fiscal_year, balance, closing, years
        );

        segments.push(FiscalYearSegment {
            fiscal_year: slice.fiscal_year,
            start_date: slice.from,
            end_date: slice.end_date(),
            opening_balance: balance,
            closing_balance: closing,
            interest: (closing - balance).max(0.0),
            contribution: None,
        });

        balance = closing;
    }

    Ok(DepositSummary {
        total_interest: balance - terms.principal,
        maturity_amount: balance,
        maturity_date,
        total_deposited: terms.principal,
        segments,
    })
}
