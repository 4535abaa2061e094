//! projection.rs
//!
//! Everything derived from a (birth date, lifespan) pair:
//!     end date, countdown, lived percent, week buckets.
//!
//! All functions take `now` explicitly so results are reproducible. A
//! zero-length or inverted interval is treated as fully elapsed: the
//! countdown is zero and the lived percent is 100.

use std::time::Duration;

use chrono::{DateTime, NaiveDate, Utc};

use crate::calendar::{
    MS_PER_DAY, MS_PER_HOUR, MS_PER_MINUTE, MS_PER_SECOND, add_years, start_of_day,
    whole_days_between,
};
use crate::error::{Error, Result};

/// Granularity of the live countdown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Precision {
    /// Tick every second and report seconds.
    #[default]
    Seconds,
    /// Tick every minute; the seconds field is always 0.
    Minutes,
}

impl Precision {
    pub fn from_show_seconds(show_seconds: bool) -> Self {
        if show_seconds {
            Precision::Seconds
        } else {
            Precision::Minutes
        }
    }

    pub fn shows_seconds(self) -> bool {
        matches!(self, Precision::Seconds)
    }

    pub fn period_ms(self) -> i64 {
        match self {
            Precision::Seconds => MS_PER_SECOND,
            Precision::Minutes => MS_PER_MINUTE,
        }
    }

    pub fn period(self) -> Duration {
        Duration::from_millis(self.period_ms() as u64)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CountdownSnapshot {
    pub days: u64,
    pub hours: u32,
    pub minutes: u32,
    pub seconds: u32,
}

impl CountdownSnapshot {
    pub const ZERO: CountdownSnapshot = CountdownSnapshot {
        days: 0,
        hours: 0,
        minutes: 0,
        seconds: 0,
    };

    pub fn is_zero(&self) -> bool {
        *self == Self::ZERO
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WeekBucket {
    pub index: usize,
    pub is_past: bool,
}

/// The lifespan cut into week-long buckets.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct WeekBuckets {
    pub total_weeks: usize,
    pub weeks_past: usize,
    pub buckets: Vec<WeekBucket>,
}

impl WeekBuckets {
    /// Index of the bucket containing `now`, if the lifespan has not run out.
    pub fn current(&self) -> Option<usize> {
        (self.weeks_past < self.total_weeks).then_some(self.weeks_past)
    }
}

/// One sample of the live clock.
#[derive(Debug, Clone, PartialEq)]
pub struct Tick {
    pub countdown: CountdownSnapshot,
    pub lived_percent: f64,
    pub end_date: NaiveDate,
    pub sampled_at: DateTime<Utc>,
}

/// A birth date with its projected end date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Projection {
    birth: NaiveDate,
    lifespan_years: i32,
    end: NaiveDate,
}

impl Projection {
    /// Parses a `YYYY-MM-DD` birth date and projects it.
    pub fn from_input(birth: &str, lifespan_years: i32) -> Result<Self> {
        project(parse_birth_date(birth)?, lifespan_years)
    }

    pub fn birth(&self) -> NaiveDate {
        self.birth
    }

    pub fn lifespan_years(&self) -> i32 {
        self.lifespan_years
    }

    pub fn end(&self) -> NaiveDate {
        self.end
    }

    pub fn birth_instant(&self) -> DateTime<Utc> {
        start_of_day(self.birth)
    }

    pub fn end_instant(&self) -> DateTime<Utc> {
        start_of_day(self.end)
    }

    pub fn countdown(&self, now: DateTime<Utc>, precision: Precision) -> CountdownSnapshot {
        compute_countdown(self.birth_instant(), self.end_instant(), now, precision)
    }

    pub fn lived_percent(&self, now: DateTime<Utc>) -> f64 {
        compute_lived_percent(self.birth_instant(), self.end_instant(), now)
    }

    pub fn week_buckets(&self, now: DateTime<Utc>) -> WeekBuckets {
        compute_week_buckets(self.birth_instant(), self.end_instant(), now)
    }

    pub fn sample(&self, now: DateTime<Utc>, precision: Precision) -> Tick {
        Tick {
            countdown: self.countdown(now, precision),
            lived_percent: self.lived_percent(now),
            end_date: self.end,
            sampled_at: now,
        }
    }
}

pub fn parse_birth_date(input: &str) -> Result<NaiveDate> {
    let input = input.trim();
    if input.is_empty() {
        return Err(Error::invalid("birth date is missing"));
    }
    NaiveDate::parse_from_str(input, "%Y-%m-%d")
        .map_err(|e| Error::invalid(format!("birth date {input:?} is not YYYY-MM-DD: {e}")))
}

/// Projects the end date `lifespan_years` after `birth`.
pub fn project(birth: NaiveDate, lifespan_years: i32) -> Result<Projection> {
    if lifespan_years <= 0 {
        return Err(Error::invalid(format!(
            "lifespan must be a positive number of years, got {lifespan_years}"
        )));
    }
    let end = add_years(birth, lifespan_years).ok_or_else(|| {
        Error::invalid(format!(
            "end date for {birth} + {lifespan_years} years is out of range"
        ))
    })?;

    Ok(Projection {
        birth,
        lifespan_years,
        end,
    })
}

/// Remaining time until `end`, floored unit by unit, largest first.
pub fn compute_countdown(
    birth: DateTime<Utc>,
    end: DateTime<Utc>,
    now: DateTime<Utc>,
    precision: Precision,
) -> CountdownSnapshot {
    if end <= birth {
        return CountdownSnapshot::ZERO;
    }
    let remaining = (end - now).num_milliseconds().max(0);

    let days = remaining / MS_PER_DAY;
    let hours = (remaining % MS_PER_DAY) / MS_PER_HOUR;
    let minutes = (remaining % MS_PER_HOUR) / MS_PER_MINUTE;
    let seconds = if precision.shows_seconds() {
        (remaining % MS_PER_MINUTE) / MS_PER_SECOND
    } else {
        0
    };

    CountdownSnapshot {
        days: days as u64,
        hours: hours as u32,
        minutes: minutes as u32,
        seconds: seconds as u32,
    }
}

/// Share of the birth..end interval already elapsed, in `[0, 100]`.
pub fn compute_lived_percent(birth: DateTime<Utc>, end: DateTime<Utc>, now: DateTime<Utc>) -> f64 {
    if end <= birth {
        return 100.0;
    }
    let lived = (now - birth).num_milliseconds() as f64;
    let total = (end - birth).num_milliseconds() as f64;
    (lived / total * 100.0).clamp(0.0, 100.0)
}

/// Splits birth..end into weeks; a partial last week is still a bucket, a
/// partial current week is not yet past.
pub fn compute_week_buckets(
    birth: DateTime<Utc>,
    end: DateTime<Utc>,
    now: DateTime<Utc>,
) -> WeekBuckets {
    let total_days = whole_days_between(end, birth).max(0) as u64;
    let total_weeks = total_days.div_ceil(7) as usize;

    let weeks_past = whole_days_between(now, birth)
        .div_euclid(7)
        .clamp(0, total_weeks as i64) as usize;

    let buckets = (0..total_weeks)
        .map(|index| WeekBucket {
            index,
            is_past: index < weeks_past,
        })
        .collect();

    WeekBuckets {
        total_weeks,
        weeks_past,
        buckets,
    }
}
