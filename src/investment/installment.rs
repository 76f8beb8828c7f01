//! Concrete dated purchases derived from investments

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::schedule::{scheduled_dates, sip_schedule};
use super::types::{earliest_start, Investment, LumpSum, SipPlan};
use crate::dates::{fiscal_years_in_range, serde_dmy, FiscalYear, FiscalYearPeriod};
use crate::nav::NavSeries;

/// Stamp duty levied on every mutual fund purchase (0.005%)
pub const STAMP_DUTY_RATE: f64 = 0.00005;

/// Money and units for one purchase of `gross` at `nav`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Purchase {
    pub gross: f64,
    pub stamp_duty: f64,
    pub net: f64,
    pub units: f64,
}

impl Purchase {
    /// Units are allotted on the amount left after stamp duty; a NAV that is
    /// not positive allots nothing
    pub fn at_nav(gross: f64, nav: f64) -> Self {
        let stamp_duty = (gross * STAMP_DUTY_RATE).max(0.0);
        let net = gross - stamp_duty;
        let units = if nav > 0.0 { (net / nav).max(0.0) } else { 0.0 };
        Self {
            gross,
            stamp_duty,
            net,
            units,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InstallmentKind {
    LumpSum,
    SipInstallment,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InstallmentStatus {
    /// Bought units
    Executed,
    /// Explicitly skipped by the investor
    Skipped,
    /// Would have run after the SIP was cancelled
    Cancelled,
}

/// One dated cash flow of an investment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Installment {
    pub investment_id: String,
    pub kind: InstallmentKind,
    #[serde(with = "serde_dmy")]
    pub date: NaiveDate,
    /// Gross amount before stamp duty
    pub amount: f64,
    /// NAV the purchase settled at (0 when no NAV is known)
    pub nav: f64,
    #[serde(default, with = "serde_dmy::option")]
    pub nav_date: Option<NaiveDate>,
    pub stamp_duty: f64,
    pub net_amount: f64,
    pub units: f64,
    pub status: InstallmentStatus,
}

impl Installment {
    fn settled(
        investment_id: &str,
        kind: InstallmentKind,
        date: NaiveDate,
        amount: f64,
        navs: &NavSeries,
    ) -> Self {
        let point = navs.lookup(date);
        let nav = point.map(|p| p.nav).unwrap_or(0.0);
        let purchase = Purchase::at_nav(amount, nav);
        Self {
            investment_id: investment_id.to_string(),
            kind,
            date,
            amount,
            nav,
            nav_date: point.map(|p| p.date),
            stamp_duty: purchase.stamp_duty,
            net_amount: purchase.net,
            units: purchase.units,
            status: InstallmentStatus::Executed,
        }
    }

    fn not_executed(investment_id: &str, date: NaiveDate, amount: f64, status: InstallmentStatus) -> Self {
        Self {
            investment_id: investment_id.to_string(),
            kind: InstallmentKind::SipInstallment,
            date,
            amount,
            nav: 0.0,
            nav_date: None,
            stamp_duty: 0.0,
            net_amount: 0.0,
            units: 0.0,
            status,
        }
    }

    pub fn is_executed(&self) -> bool {
        self.status == InstallmentStatus::Executed
    }

    pub fn is_cancelled(&self) -> bool {
        self.status == InstallmentStatus::Cancelled
    }
}

fn lump_sum_installment(lump: &LumpSum, navs: &NavSeries, as_of: NaiveDate) -> Option<Installment> {
    (lump.date < as_of).then(|| {
        Installment::settled(&lump.id, InstallmentKind::LumpSum, lump.date, lump.amount, navs)
    })
}

fn sip_installments(plan: &SipPlan, navs: &NavSeries, as_of: NaiveDate) -> Vec<Installment> {
    let mut installments: Vec<Installment> = sip_schedule(plan, as_of)
        .into_iter()
        .filter(|date| *date < as_of)
        .map(|date| {
            let amount = plan.amount_on(date);
            if plan.is_skipped(date) {
                Installment::not_executed(&plan.id, date, amount, InstallmentStatus::Skipped)
            } else {
                Installment::settled(&plan.id, InstallmentKind::SipInstallment, date, amount, navs)
            }
        })
        .collect();

    if let Some(end) = plan.end_date {
        let cancelled = scheduled_dates(plan, as_of)
            .into_iter()
            .filter(|date| *date > end && *date < as_of)
            .map(|date| {
                Installment::not_executed(&plan.id, date, plan.amount_on(date), InstallmentStatus::Cancelled)
            });
        installments.extend(cancelled);
    }

    installments
}

/// Every installment of one investment dated before `as_of`, including
/// skipped and cancelled ones
pub fn installments_of(investment: &Investment, navs: &NavSeries, as_of: NaiveDate) -> Vec<Installment> {
    match investment {
        Investment::LumpSum(lump) => lump_sum_installment(lump, navs, as_of).into_iter().collect(),
        Investment::Sip(plan) => sip_installments(plan, navs, as_of),
    }
}

/// Installments that actually bought units
pub fn executed_installments(investment: &Investment, navs: &NavSeries, as_of: NaiveDate) -> Vec<Installment> {
    let mut installments = installments_of(investment, navs, as_of);
    installments.retain(Installment::is_executed);
    installments
}

/// Investment history across investments, ordered by date
pub fn generate_installments(
    investments: &[Investment],
    navs: &NavSeries,
    as_of: NaiveDate,
) -> Vec<Installment> {
    let mut all: Vec<Installment> = investments
        .iter()
        .flat_map(|inv| installments_of(inv, navs, as_of))
        .collect();
    all.sort_by_key(|i| i.date);
    all
}

/// Executed purchases that fall in one fiscal year
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FiscalYearActivity {
    pub period: FiscalYearPeriod,
    pub installments: usize,
    /// Gross amount including stamp duty
    pub invested: f64,
    pub stamp_duty: f64,
    pub units: f64,
}

impl FiscalYearActivity {
    fn empty(period: FiscalYearPeriod) -> Self {
        Self {
            period,
            installments: 0,
            invested: 0.0,
            stamp_duty: 0.0,
            units: 0.0,
        }
    }
}

/// Executed installments totalled per fiscal year, from the fiscal year of
/// the earliest investment through the one containing `as_of`. Years with
/// no purchases are kept with zero totals.
pub fn fiscal_year_ledger(
    investments: &[Investment],
    navs: &NavSeries,
    as_of: NaiveDate,
) -> Vec<FiscalYearActivity> {
    let Some(start) = earliest_start(investments).filter(|start| *start < as_of) else {
        return Vec::new();
    };
    let mut ledger: Vec<FiscalYearActivity> = fiscal_years_in_range(start, as_of)
        .into_iter()
        .map(FiscalYearActivity::empty)
        .collect();

    for installment in investments.iter().flat_map(|inv| executed_installments(inv, navs, as_of)) {
        let fy = FiscalYear::of(installment.date);
        if let Some(row) = ledger.iter_mut().find(|row| row.period.fiscal_year == fy) {
            row.installments += 1;
            row.invested += installment.amount;
            row.stamp_duty += installment.stamp_duty;
            row.units += installment.units;
        }
    }
    ledger
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::nav::NavPoint;
    use approx::assert_abs_diff_eq;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn navs() -> NavSeries {
        NavSeries::new(vec![
            NavPoint::new(d(2024, 1, 1), 10.0),
            NavPoint::new(d(2024, 2, 1), 20.0),
        ])
    }

    #[test]
    fn test_stamp_duty_conservation() {
        for gross in [1.0, 500.0, 1000.0, 2_500.0, 12_345.67, 1_000_000.0] {
            let p = Purchase::at_nav(gross, 10.0);
            assert_eq!(p.stamp_duty, gross * STAMP_DUTY_RATE);
            assert_abs_diff_eq!(p.net + p.stamp_duty, gross, epsilon = 1e-9);
            assert!(p.stamp_duty >= 0.0);
        }
    }

    #[test]
    fn test_zero_nav_allots_no_units() {
        assert_eq!(Purchase::at_nav(1000.0, 0.0).units, 0.0);
        assert_eq!(Purchase::at_nav(1000.0, -3.0).units, 0.0);
    }

    #[test]
    fn test_sip_installments_scenario() {
        let sip = Investment::sip("s1", 1000.0, 1, d(2024, 1, 1));
        let installments = installments_of(&sip, &navs(), d(2024, 2, 15));

        assert_eq!(installments.len(), 2);
        assert_eq!(installments[0].nav, 10.0);
        assert_abs_diff_eq!(installments[0].units, 99.995, epsilon = 1e-9);
        assert_eq!(installments[1].nav, 20.0);
        assert_abs_diff_eq!(installments[1].units, 49.9975, epsilon = 1e-9);
        assert!(installments.iter().all(Installment::is_executed));
    }

    #[test]
    fn test_installment_on_as_of_is_excluded() {
        let sip = Investment::sip("s1", 1000.0, 1, d(2024, 1, 1));
        let installments = installments_of(&sip, &navs(), d(2024, 2, 1));
        assert_eq!(installments.len(), 1);
    }

    #[test]
    fn test_skipped_and_cancelled_flags() {
        let plan = SipPlan::new("s1", 1000.0, 1, d(2024, 1, 1))
            .with_skipped(d(2024, 2, 1))
            .cancelled(d(2024, 3, 1));
        let installments = installments_of(&Investment::Sip(plan), &navs(), d(2024, 5, 15));

        let statuses: Vec<_> = installments.iter().map(|i| i.status).collect();
        assert_eq!(
            statuses,
            vec![
                InstallmentStatus::Executed,
                InstallmentStatus::Skipped,
                InstallmentStatus::Executed,
                InstallmentStatus::Cancelled,
                InstallmentStatus::Cancelled,
            ]
        );
        assert_eq!(installments[1].units, 0.0);
        assert!(installments[4].is_cancelled());
        assert_eq!(installments[4].date, d(2024, 5, 1));
    }

    #[test]
    fn test_nav_after_series_uses_latest() {
        let lump = Investment::lump_sum("l1", 2000.0, d(2024, 3, 10));
        let installments = installments_of(&lump, &navs(), d(2024, 4, 1));
        assert_eq!(installments[0].nav, 20.0);
        assert_eq!(installments[0].nav_date, Some(d(2024, 2, 1)));
    }

    #[test]
    fn test_generate_installments_sorted() {
        let investments = vec![
            Investment::lump_sum("l1", 5000.0, d(2024, 1, 20)),
            Investment::sip("s1", 1000.0, 1, d(2024, 1, 1)),
        ];
        let all = generate_installments(&investments, &navs(), d(2024, 2, 15));
        let dates: Vec<_> = all.iter().map(|i| i.date).collect();
        assert_eq!(dates, vec![d(2024, 1, 1), d(2024, 1, 20), d(2024, 2, 1)]);
        // 2024-01-20 settles at the next available NAV
        assert_eq!(all[1].nav, 20.0);
    }

    #[test]
    fn test_fiscal_year_ledger() {
        let investments = vec![
            Investment::sip("s1", 1000.0, 1, d(2024, 2, 1)),
            Investment::lump_sum("l1", 5000.0, d(2024, 4, 10)),
        ];
        let ledger = fiscal_year_ledger(&investments, &navs(), d(2024, 5, 15));

        assert_eq!(ledger.len(), 2);
        assert_eq!(ledger[0].period.fiscal_year, FiscalYear::new(2023));
        assert_eq!(ledger[0].period.start_date, d(2024, 2, 1));
        assert_eq!(ledger[0].period.end_date, d(2024, 3, 31));
        // February and March installments
        assert_eq!(ledger[0].installments, 2);
        assert_abs_diff_eq!(ledger[0].invested, 2000.0, epsilon = 1e-9);

        // April and May installments plus the lump sum
        let current = &ledger[1];
        assert_eq!(current.period.end_date, d(2024, 5, 15));
        assert_eq!(current.installments, 3);
        assert_abs_diff_eq!(current.invested, 7000.0, epsilon = 1e-9);
        assert_abs_diff_eq!(current.stamp_duty, 7000.0 * STAMP_DUTY_RATE, epsilon = 1e-9);
        assert_abs_diff_eq!(current.units, 7000.0 * (1.0 - STAMP_DUTY_RATE) / 20.0, epsilon = 1e-9);
    }

    #[test]
    fn test_fiscal_year_ledger_skips_unexecuted() {
        let plan = SipPlan::new("s1", 1000.0, 1, d(2024, 1, 1)).with_skipped(d(2024, 2, 1));
        let ledger = fiscal_year_ledger(&[Investment::Sip(plan)], &navs(), d(2024, 3, 15));
        assert_eq!(ledger.len(), 1);
        assert_eq!(ledger[0].installments, 2);
        assert!(fiscal_year_ledger(&[], &navs(), d(2024, 3, 15)).is_empty());
    }
}
