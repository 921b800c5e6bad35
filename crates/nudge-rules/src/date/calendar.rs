//! Gregorian calendar helpers

use chrono::{Datelike, NaiveDate, TimeDelta};

/// Divisible by 4, except centuries unless divisible by 400
pub fn is_leap_year(year: i64) -> bool {
    (year % 4 == 0 && year % 100 != 0) || year % 400 == 0
}

/// Length of `month` (1-12) in `year`; 0 for an invalid month
pub fn days_in_month(year: i64, month: i64) -> i64 {
    match month {
        1 | 3 | 5 | 7 | 8 | 10 | 12 => 31,
        4 | 6 | 9 | 11 => 30,
        2 if is_leap_year(year) => 29,
        2 => 28,
        _ => 0,
    }
}

pub fn is_valid_date(year: i64, month: i64, day: i64) -> bool {
    (1..=12).contains(&month) && day >= 1 && day <= days_in_month(year, month)
}

/// Add `months` to a year/month pair, carrying into the year
pub fn add_months(year: i64, month: i64, months: i64) -> (i64, i64) {
    let total = year * 12 + (month - 1) + months;
    (total.div_euclid(12), total.rem_euclid(12) + 1)
}

/// Shift a date by `days`, carrying through months and years.
///
/// Valid dates go through chrono. A date that is already out of range (a
/// preserved day 31 in a 30-day month, say) is normalized by walking month
/// lengths, so `Feb 31 + 1` lands on `Mar 4` in a common year.
pub fn add_days(year: i64, month: i64, day: i64, days: i64) -> Option<(i64, i64, i64)> {
    if is_valid_date(year, month, day) {
        let date = NaiveDate::from_ymd_opt(
            i32::try_from(year).ok()?,
            u32::try_from(month).ok()?,
            u32::try_from(day).ok()?,
        )?;
        let shifted = date.checked_add_signed(TimeDelta::try_days(days)?)?;
        return Some((
            i64::from(shifted.year()),
            i64::from(shifted.month()),
            i64::from(shifted.day()),
        ));
    }

    if !(1..=12).contains(&month) {
        return None;
    }
    let (mut year, mut month) = (year, month);
    let mut day = day.checked_add(days)?;
    while day > days_in_month(year, month) {
        day -= days_in_month(year, month);
        (year, month) = add_months(year, month, 1);
    }
    while day < 1 {
        (year, month) = add_months(year, month, -1);
        day += days_in_month(year, month);
    }
    Some((year, month, day))
}
