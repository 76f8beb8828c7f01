//! SIP installment calendar

use chrono::{Datelike, NaiveDate};

use super::types::SipPlan;
use crate::dates::{add_months, day_in_month};

/// Scheduled installment dates up to and including `until`.
///
/// The first installment falls on the start date; later ones fall on
/// `day_of_month` in each following month, clamped to the month's last day.
pub fn scheduled_dates(plan: &SipPlan, until: NaiveDate) -> Vec<NaiveDate> {
    let mut dates = Vec::new();
    if plan.start_date > until {
        return dates;
    }
    dates.push(plan.start_date);

    let Some(first_of_month) = plan.start_date.with_day(1) else {
        return dates;
    };

    for k in 1.. {
        let Some(month) = add_months(first_of_month, k) else {
            break;
        };
        let Some(date) = day_in_month(month.year(), month.month(), plan.day_of_month) else {
            break;
        };
        if date > until {
            break;
        }
        dates.push(date);
    }
    dates
}

/// Installment dates the plan would run through `as_of`: up to its end date
/// if cancelled, otherwise up to `as_of`
pub fn sip_schedule(plan: &SipPlan, as_of: NaiveDate) -> Vec<NaiveDate> {
    let until = match plan.end_date {
        Some(end) => end.min(as_of),
        None => as_of,
    };
    scheduled_dates(plan, until)
}
