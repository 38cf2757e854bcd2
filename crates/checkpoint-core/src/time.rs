//! Time primitives for the checkpoint
//!
//! Timestamps are calendar-aware (year through second, plus milliseconds)
//! because dwell durations and the ready-screen clock are shown to people.
//! Ordering and elapsed-time arithmetic are what the state machine needs;
//! the formatting helpers exist for the presentation adapters.

use std::fmt;
use std::ops::{Add, Sub};
use std::time::Duration;

use chrono::{NaiveDate, NaiveDateTime, TimeDelta, Timelike};

/// Wall-clock timestamp with millisecond precision
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Timestamp(NaiveDateTime);

impl Timestamp {
    #[inline]
    pub fn from_naive(value: NaiveDateTime) -> Self {
        Timestamp(value)
    }

    /// Build from calendar fields; `None` if any field is out of range
    pub fn from_ymd_hms(year: i32, month: u32, day: u32, hour: u32, min: u32, sec: u32) -> Option<Self> {
        NaiveDate::from_ymd_opt(year, month, day)
            .and_then(|d| d.and_hms_opt(hour, min, sec))
            .map(Timestamp)
    }

    #[inline]
    pub fn as_naive(self) -> NaiveDateTime {
        self.0
    }

    /// Time elapsed since `earlier`, zero if `earlier` is in the future
    #[inline]
    pub fn elapsed_since(self, earlier: Timestamp) -> Duration {
        (self.0 - earlier.0).to_std().unwrap_or(Duration::ZERO)
    }

    #[inline]
    pub fn saturating_add(self, duration: Duration) -> Self {
        let delta = TimeDelta::from_std(duration).unwrap_or(TimeDelta::MAX);
        Timestamp(self.0.checked_add_signed(delta).unwrap_or(NaiveDateTime::MAX))
    }

    /// Minute of the day; the ready screen refreshes when this changes
    #[inline]
    pub fn minute_of_day(self) -> u32 {
        self.0.hour() * 60 + self.0.minute()
    }

    pub fn hh_mm(self) -> String {
        self.0.format("%H:%M").to_string()
    }

    pub fn hh_mm_ss(self) -> String {
        self.0.format("%H:%M:%S").to_string()
    }

    pub fn date_time(self) -> String {
        self.0.format("%Y-%m-%d %H:%M:%S").to_string()
    }
}

impl Add<Duration> for Timestamp {
    type Output = Timestamp;

    #[inline]
    fn add(self, rhs: Duration) -> Self::Output {
        self.saturating_add(rhs)
    }
}

impl Sub<Timestamp> for Timestamp {
    type Output = Duration;

    #[inline]
    fn sub(self, rhs: Timestamp) -> Self::Output {
        self.elapsed_since(rhs)
    }
}

impl fmt::Debug for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "t({})", self.0.format("%Y-%m-%d %H:%M:%S%.3f"))
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.date_time())
    }
}

/// Format a dwell duration as `HH:MM:SS`. Hours do not wrap at 24.
pub fn format_dwell(dwell: Duration) -> String {
    let secs = dwell.as_secs();
    format!("{:02}:{:02}:{:02}", secs / 3600, (secs / 60) % 60, secs % 60)
}
