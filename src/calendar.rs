//! calendar.rs
//!
//! Calendar arithmetic used by every projection:
//!     add_years(date, n)         -> date, clamped to the end of the month
//!     whole_days_between(a, b)   -> floor((a - b) / 1 day), sign-preserving
//!     calendar_span(from, to)    -> "X years, Y months, Z days" between dates
//!
//! Month and year shifts build the target year/month/day triple directly and,
//! when that day does not exist, fall back to the last day of the same month.

use std::fmt;

use chrono::{DateTime, Datelike, NaiveDate, NaiveTime, Utc};

pub const MS_PER_SECOND: i64 = 1_000;
pub const MS_PER_MINUTE: i64 = 60 * MS_PER_SECOND;
pub const MS_PER_HOUR: i64 = 60 * MS_PER_MINUTE;
pub const MS_PER_DAY: i64 = 24 * MS_PER_HOUR;

/// Shifts `date` by `years` calendar years.
///
/// Month and day are preserved when the day exists in the destination year.
/// Otherwise the result is the last day of the same month (2000-02-29 + 1
/// year is 2001-02-28, never 2001-03-01). Returns `None` only when the target
/// year is outside chrono's representable range.
pub fn add_years(date: NaiveDate, years: i32) -> Option<NaiveDate> {
    add_months(date, years.checked_mul(12)?)
}

/// Shifts `date` by `months`, clamping the day to the target month's length.
pub fn add_months(date: NaiveDate, months: i32) -> Option<NaiveDate> {
    let index = i64::from(date.year()) * 12 + i64::from(date.month0()) + i64::from(months);
    let year = i32::try_from(index.div_euclid(12)).ok()?;
    let month = index.rem_euclid(12) as u32 + 1;

    NaiveDate::from_ymd_opt(year, month, date.day())
        .or_else(|| NaiveDate::from_ymd_opt(year, month, days_in_month(year, month)))
}

/// Number of whole 24-hour days from `b` to `a`, rounded toward negative infinity.
pub fn whole_days_between(a: DateTime<Utc>, b: DateTime<Utc>) -> i64 {
    (a - b).num_milliseconds().div_euclid(MS_PER_DAY)
}

/// The instant a calendar date starts, anchored at midnight UTC.
pub fn start_of_day(date: NaiveDate) -> DateTime<Utc> {
    date.and_time(NaiveTime::MIN).and_utc()
}

/// Calendar distance between two dates, in whole years, months and days.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CalendarSpan {
    pub years: u32,
    pub months: u32,
    pub days: u32,
}

impl fmt::Display for CalendarSpan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let plural = |n: u32| if n == 1 { "" } else { "s" };
        write!(
            f,
            "{} year{}, {} month{}, {} day{}",
            self.years,
            plural(self.years),
            self.months,
            plural(self.months),
            self.days,
            plural(self.days)
        )
    }
}

/// Whole months from `from` (clamped like `add_months`), then leftover days.
///
/// Zero when `to` is not after `from`.
pub fn calendar_span(from: NaiveDate, to: NaiveDate) -> CalendarSpan {
    if to <= from {
        return CalendarSpan::default();
    }

    let mut months = (to.year() - from.year()) * 12 + to.month() as i32 - from.month() as i32;
    let anchor = match add_months(from, months) {
        Some(anchor) if anchor <= to => anchor,
        _ => {
            months -= 1;
            // One month short of `to`'s month is always representable.
            match add_months(from, months) {
                Some(anchor) => anchor,
                None => return CalendarSpan::default(),
            }
        }
    };

    CalendarSpan {
        years: (months / 12) as u32,
        months: (months % 12) as u32,
        days: (to - anchor).num_days() as u32,
    }
}

/// Returns number of days in a given year/month (handles leap years)
pub fn days_in_month(year: i32, month: u32) -> u32 {
    match month {
        4 | 6 | 9 | 11 => 30,
        2 if is_leap_year(year) => 29,
        2 => 28,
        _ => 31,
    }
}

/// Gregorian leap-year rule: every 4th year, except centuries not divisible by 400.
pub fn is_leap_year(year: i32) -> bool {
    (year % 4 == 0 && year % 100 != 0) || year % 400 == 0
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn add_years_keeps_month_and_day() {
        assert_eq!(add_years(date(1990, 1, 15), 80), Some(date(2070, 1, 15)));
    }

    #[test]
    fn leap_day_into_leap_year_is_kept() {
        assert_eq!(add_years(date(1992, 2, 29), 80), Some(date(2072, 2, 29)));
    }

    #[test]
    fn leap_day_into_common_year_clamps_to_feb_28() {
        assert_eq!(add_years(date(2000, 2, 29), 81), Some(date(2081, 2, 28)));
        assert_eq!(add_years(date(2000, 2, 29), 100), Some(date(2100, 2, 28)));
    }

    #[test]
    fn add_years_accepts_negative_shift() {
        assert_eq!(add_years(date(2004, 2, 29), -1), Some(date(2003, 2, 28)));
    }

    #[test]
    fn add_years_out_of_range_is_none() {
        assert_eq!(add_years(date(2000, 1, 1), i32::MAX), None);
        assert_eq!(add_years(date(2000, 1, 1), 300_000), None);
    }

    #[test]
    fn leap_year_day_count() {
        let a = start_of_day(date(2001, 1, 1));
        let b = start_of_day(date(2000, 1, 1));
        assert_eq!(whole_days_between(a, b), 366);
        assert_eq!(whole_days_between(b, a), -366);
    }

    #[test]
    fn partial_days_floor_toward_negative_infinity() {
        let a = Utc.with_ymd_and_hms(2024, 1, 2, 11, 59, 59).unwrap();
        let b = Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap();
        assert_eq!(whole_days_between(a, b), 0);
        assert_eq!(whole_days_between(b, a), -1);
    }

    #[test]
    fn start_of_day_is_midnight_utc() {
        let start = start_of_day(date(2024, 3, 31));
        assert_eq!(start, Utc.with_ymd_and_hms(2024, 3, 31, 0, 0, 0).unwrap());
    }

    #[test]
    fn add_months_clamps_to_month_end() {
        assert_eq!(add_months(date(2023, 1, 31), 1), Some(date(2023, 2, 28)));
        assert_eq!(add_months(date(2024, 1, 31), 1), Some(date(2024, 2, 29)));
        assert_eq!(add_months(date(2024, 3, 31), -1), Some(date(2024, 2, 29)));
        assert_eq!(add_months(date(2023, 11, 15), 3), Some(date(2024, 2, 15)));
    }

    #[test]
    fn span_borrows_across_months() {
        let span = calendar_span(date(1992, 6, 14), date(2024, 3, 10));
        assert_eq!(
            span,
            CalendarSpan {
                years: 31,
                months: 8,
                days: 25,
            }
        );
        assert_eq!(span.to_string(), "31 years, 8 months, 25 days");
        assert_eq!(
            calendar_span(date(2000, 1, 1), date(2001, 2, 2)).to_string(),
            "1 year, 1 month, 1 day"
        );
    }

    #[test]
    fn span_from_month_end_never_goes_negative() {
        // Jan 31 + 1 month clamps to Feb 28, leaving one day to Mar 1
        assert_eq!(
            calendar_span(date(2023, 1, 31), date(2023, 3, 1)).to_string(),
            "0 years, 1 month, 1 day"
        );
    }

    #[test]
    fn span_until_projected_end() {
        let end = add_years(date(1990, 1, 15), 80).unwrap();
        assert_eq!(
            calendar_span(date(2024, 1, 1), end).to_string(),
            "46 years, 0 months, 14 days"
        );
    }

    #[test]
    fn span_after_the_end_is_zero() {
        assert_eq!(
            calendar_span(date(2030, 1, 1), date(2024, 1, 1)),
            CalendarSpan::default()
        );
        assert_eq!(
            calendar_span(date(2024, 1, 1), date(2024, 1, 1)).to_string(),
            "0 years, 0 months, 0 days"
        );
    }

    #[test]
    fn month_lengths() {
        assert_eq!(days_in_month(2024, 2), 29);
        assert_eq!(days_in_month(1900, 2), 28);
        assert_eq!(days_in_month(2000, 2), 29);
        assert_eq!(days_in_month(2023, 4), 30);
        assert_eq!(days_in_month(2023, 12), 31);
    }
}
