//! Month-end evaluation dates.

use chrono::{Datelike, Months, NaiveDate};

/// Month ends used when no evaluation dates are given: January 2021 through December 2022.
pub const DEFAULT_PERIODS: usize = 24;

/// Last calendar day of the month containing `date`.
pub fn month_end(date: NaiveDate) -> NaiveDate {
    let first = date.with_day(1).unwrap_or(date);
    first
        .checked_add_months(Months::new(1))
        .and_then(|next| next.pred_opt())
        .unwrap_or(NaiveDate::MAX)
}

/// `periods` consecutive month ends, starting with the month end on or after `first`.
///
/// A `first` that is not itself a month end rolls forward to the end of its month.
pub fn month_ends(first: NaiveDate, periods: usize) -> Vec<NaiveDate> {
    let start = month_end(first);
    std::iter::successors(Some(start), |prev| prev.succ_opt().map(month_end))
        .take(periods)
        .collect()
}
