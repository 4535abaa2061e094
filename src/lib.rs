//! memento
//!
//! Projects an end date from a birth date and a lifespan in years, then
//! exposes a live countdown, a lived percentage and a week-by-week calendar
//! of the whole span.

pub mod calendar;
pub mod config;
pub mod driver;
pub mod error;
pub mod grid;
pub mod projection;
pub mod svg;

pub use driver::{Clock, LiveClock, Subscription, SystemClock};
pub use error::{Error, Result};
pub use projection::{
    CountdownSnapshot, Precision, Projection, Tick, WeekBucket, WeekBuckets, compute_countdown,
    compute_lived_percent, compute_week_buckets, project,
};
