//! Lexical validators for request parameters.
//!
//! Dates and times arrive as plain query-string values. These functions
//! decide whether a value is well formed before anything reaches the
//! database, and provide the typed forms used when binding statements.

use chrono::{Local, NaiveDate, NaiveDateTime, NaiveTime, Timelike};

/// Returns `true` if `s` is an optionally signed run of ASCII digits.
///
/// No range limits apply.
pub fn is_int(s: &str) -> bool {
    let digits = s.strip_prefix(['+', '-']).unwrap_or(s);
    is_digits(digits)
}

/// Returns `true` if `s` parses as a floating point number.
pub fn is_decimal(s: &str) -> bool {
    s.trim().parse::<f64>().is_ok()
}

/// Returns `true` if `s` is a patient social security number: 11 digits.
pub fn is_ssn(s: &str) -> bool {
    s.len() == 11 && is_digits(s)
}

/// Returns `true` if `s` is a doctor tax number: 9 digits.
pub fn is_nif(s: &str) -> bool {
    s.len() == 9 && is_digits(s)
}

/// Returns `true` if `s` is a calendar date in `YYYY-MM-DD` form.
pub fn is_date(s: &str) -> bool {
    parse_date(s).is_some()
}

/// Returns `true` if `s` is a clock time in `HH:MM:SS` form.
pub fn is_time(s: &str) -> bool {
    parse_time(s).is_some()
}

/// Parses a `YYYY-MM-DD` date.
///
/// Each part must be numeric; the day must exist in the given month,
/// following the Gregorian leap-year rule for February.
pub fn parse_date(s: &str) -> Option<NaiveDate> {
    let [year, month, day] = split_numeric::<3>(s, '-')?;

    if year < 1 || !(1..=12).contains(&month) {
        return None;
    }
    if day < 1 || day > days_in_month(year, month) {
        return None;
    }

    let year = i32::try_from(year).ok()?;
    NaiveDate::from_ymd_opt(year, month as u32, day as u32)
}

/// Parses a `HH:MM:SS` time with hour in `[0, 24)` and minute/second in `[0, 60)`.
pub fn parse_time(s: &str) -> Option<NaiveTime> {
    let [hour, minute, second] = split_numeric::<3>(s, ':')?;

    if hour >= 24 || minute >= 60 || second >= 60 {
        return None;
    }

    NaiveTime::from_hms_opt(hour as u32, minute as u32, second as u32)
}

/// Returns `true` if both values are well formed and name a moment strictly
/// after the current local wall-clock time.
pub fn is_future_date_and_time(date: &str, time: &str) -> bool {
    is_future_at(date, time, Local::now().naive_local())
}

/// Same as [`is_future_date_and_time`] against an explicit `now`.
///
/// `now` is truncated to whole seconds, so a value equal to the current
/// second is not in the future.
pub fn is_future_at(date: &str, time: &str, now: NaiveDateTime) -> bool {
    match (parse_date(date), parse_time(time)) {
        (Some(date), Some(time)) => date.and_time(time) > truncate_to_seconds(now),
        _ => false,
    }
}

pub(crate) fn truncate_to_seconds(now: NaiveDateTime) -> NaiveDateTime {
    now.with_nanosecond(0).unwrap_or(now)
}

fn is_leap_year(year: u64) -> bool {
    (year % 4 == 0 && year % 100 != 0) || year % 400 == 0
}

fn days_in_month(year: u64, month: u64) -> u64 {
    match month {
        1 | 3 | 5 | 7 | 8 | 10 | 12 => 31,
        4 | 6 | 9 | 11 => 30,
        2 if is_leap_year(year) => 29,
        2 => 28,
        _ => 0,
    }
}

fn is_digits(s: &str) -> bool {
    !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit())
}

/// Splits `s` on `sep` into exactly `N` numeric parts.
fn split_numeric<const N: usize>(s: &str, sep: char) -> Option<[u64; N]> {
    let mut out = [0u64; N];
    let mut parts = s.split(sep);

    for slot in out.iter_mut() {
        let part = parts.next()?;
        if !is_digits(part) {
            return None;
        }
        *slot = part.parse().ok()?;
    }

    if parts.next().is_some() {
        return None;
    }
    Some(out)
}
