//! Calendar-field arithmetic.
//!
//! Month and year stepping is done on explicit `(year, month, day)` fields so
//! that a target month lacking the requested day yields `None` instead of a
//! clamped date. Callers decide what to do with the gap (the expander skips it).

use chrono::{Datelike, NaiveDate};

pub fn is_leap_year(year: i32) -> bool {
    (year % 4 == 0 && year % 100 != 0) || year % 400 == 0
}

/// Number of days in `month` (1-based) of `year`. Returns 0 for an invalid month.
pub fn days_in_month(year: i32, month: u32) -> u32 {
    match month {
        1 | 3 | 5 | 7 | 8 | 10 | 12 => 31,
        4 | 6 | 9 | 11 => 30,
        2 if is_leap_year(year) => 29,
        2 => 28,
        _ => 0,
    }
}

/// Move `(year, month)` forward by `months`, carrying into the year.
///
/// Returns `None` when the resulting year does not fit in an `i32`.
pub fn shift_month(year: i32, month: u32, months: i64) -> Option<(i32, u32)> {
    let index = i64::from(year) * 12 + i64::from(month) - 1 + months;
    let year = i32::try_from(index.div_euclid(12)).ok()?;
    let month = u32::try_from(index.rem_euclid(12)).ok()? + 1;
    Some((year, month))
}

/// The date `year-month-day`, or `None` if that month has no such day.
///
/// Never clamps: day 31 in a 30-day month is `None`, not the 30th.
pub fn exact_date(year: i32, month: u32, day: u32) -> Option<NaiveDate> {
    if day == 0 || day > days_in_month(year, month) {
        return None;
    }
    NaiveDate::from_ymd_opt(year, month, day)
}

/// Same month and day one year later; Feb 29 rolls over to Mar 1.
pub fn one_year_later(date: NaiveDate) -> Option<NaiveDate> {
    let year = date.year().checked_add(1)?;
    exact_date(year, date.month(), date.day())
        .or_else(|| NaiveDate::from_ymd_opt(year, date.month() + 1, 1))
}
