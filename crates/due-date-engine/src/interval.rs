//! Immutable, timezone-aware half-open intervals.
//!
//! An [`Interval`] is `[begin, begin + duration)`: the begin instant is
//! included, the end instant never is. Constructing an interval whose end is
//! not strictly after its begin is not an error; the interval collapses to
//! zero duration at `begin`. An end past the last instant chrono can represent
//! is cut short there.
//!
//! Adjacency checks ([`Interval::abuts`], [`Interval::gap`]) compare instants
//! at millisecond granularity. Timestamps regularly travel through text and
//! lose anything below a millisecond on the way, so comparing nanoseconds would
//! report two intervals that touched before the round trip as separate after it.

use std::fmt;

use chrono::{DateTime, Duration, FixedOffset, NaiveDateTime, TimeZone};
use chrono_tz::Tz;

use crate::clock::Clock;
use crate::error::{DueDateError, Result};
use crate::timestamp::{format_timestamp, to_time_point, TimePoint};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Interval {
    begin: TimePoint,
    duration: Duration,
}

impl Interval {
    /// Create an interval from two zoned instants.
    ///
    /// The interval takes its zone from `begin`. If `end` is not strictly after
    /// `begin`, the result has zero duration.
    ///
    /// # Examples
    ///
    /// ```
    /// use chrono::{Duration, TimeZone, Utc};
    /// use due_date_engine::Interval;
    ///
    /// let begin = Utc.with_ymd_and_hms(2026, 3, 16, 9, 0, 0).unwrap();
    /// let end = Utc.with_ymd_and_hms(2026, 3, 16, 17, 0, 0).unwrap();
    /// let iv = Interval::new(&begin, &end);
    /// assert_eq!(iv.duration(), Duration::hours(8));
    ///
    /// // inverted bounds collapse instead of failing
    /// assert!(Interval::new(&end, &begin).is_empty());
    /// ```
    pub fn new<A: TimeZone, B: TimeZone>(begin: &DateTime<A>, end: &DateTime<B>) -> Self {
        let begin = to_time_point(begin);
        let end = to_time_point(end);
        Self::with_duration(begin, end.signed_duration_since(begin))
    }

    /// Create an interval of `duration` starting at `begin`.
    ///
    /// A negative duration collapses to zero. A duration reaching past the
    /// last representable instant is cut short there.
    pub fn with_duration(begin: TimePoint, duration: Duration) -> Self {
        let duration = if duration <= Duration::zero() {
            Duration::zero()
        } else if begin.checked_add_signed(duration).is_some() {
            duration
        } else {
            latest_instant(&begin).signed_duration_since(begin)
        };
        Self { begin, duration }
    }

    /// Create an interval from local (zone-less) datetimes interpreted in `tz`.
    ///
    /// Ambiguous local times resolve to the earliest instant.
    ///
    /// # Errors
    ///
    /// Returns [`DueDateError::InvalidDatetime`] if either local time does not
    /// exist in `tz` (it falls into a DST gap).
    pub fn from_local(begin: NaiveDateTime, end: NaiveDateTime, tz: &Tz) -> Result<Self> {
        let resolve = |naive: NaiveDateTime| {
            tz.from_local_datetime(&naive).earliest().ok_or_else(|| {
                DueDateError::InvalidDatetime(format!(
                    "'{}' does not exist in {}",
                    naive,
                    tz.name()
                ))
            })
        };
        Ok(Self::new(&resolve(begin)?, &resolve(end)?))
    }

    /// Create an interval from epoch milliseconds, expressed in `offset`.
    ///
    /// # Errors
    ///
    /// Returns [`DueDateError::InvalidDatetime`] if either value is outside the
    /// representable range.
    pub fn from_millis(begin_ms: i64, end_ms: i64, offset: FixedOffset) -> Result<Self> {
        let resolve = |ms: i64| {
            offset.timestamp_millis_opt(ms).single().ok_or_else(|| {
                DueDateError::InvalidDatetime(format!("epoch millis {} out of range", ms))
            })
        };
        Ok(Self::new(&resolve(begin_ms)?, &resolve(end_ms)?))
    }

    /// A zero-length interval at the current instant of `clock`.
    pub fn now(clock: &dyn Clock) -> Self {
        Self::with_duration(clock.now(), Duration::zero())
    }

    /// Inclusive begin.
    pub fn start(&self) -> TimePoint {
        self.begin
    }

    /// Exclusive end.
    pub fn end(&self) -> TimePoint {
        self.begin
            .checked_add_signed(self.duration)
            .unwrap_or_else(|| latest_instant(&self.begin))
    }

    pub fn duration(&self) -> Duration {
        self.duration
    }

    /// The offset the interval is expressed in, taken from its begin.
    pub fn zone(&self) -> FixedOffset {
        *self.begin.offset()
    }

    pub fn is_empty(&self) -> bool {
        self.duration.is_zero()
    }

    /// Whether `point` lies in `[begin, end)`.
    ///
    /// The begin of a zero-duration interval is still contained.
    pub fn contains<Z: TimeZone>(&self, point: &DateTime<Z>) -> bool {
        let point = to_time_point(point);
        point == self.begin || (point > self.begin && point < self.end())
    }

    /// Whether one interval ends exactly where the other begins, to the
    /// millisecond. Symmetric.
    pub fn abuts(&self, other: &Interval) -> bool {
        millis(&self.end()) == millis(&other.begin) || millis(&other.end()) == millis(&self.begin)
    }

    /// [`Interval::abuts`] against the current instant of `clock`.
    pub fn abuts_now(&self, clock: &dyn Clock) -> bool {
        self.abuts(&Interval::now(clock))
    }

    /// Whether the two intervals share at least one instant.
    pub fn overlaps(&self, other: &Interval) -> bool {
        if self.is_empty() {
            return other.contains(&self.begin);
        }
        if other.is_empty() {
            return self.contains(&other.begin);
        }
        self.begin < other.end() && other.begin < self.end()
    }

    /// The interval strictly between `self` and `other`.
    ///
    /// Returns `None` when they overlap or abut. The gap is expressed in the
    /// zone of whichever interval comes first.
    pub fn gap(&self, other: &Interval) -> Option<Interval> {
        if self.overlaps(other) || self.abuts(other) {
            return None;
        }
        let (earlier, later) = if self.begin <= other.begin {
            (self, other)
        } else {
            (other, self)
        };
        let from = earlier.end();
        let to = later.begin.with_timezone(&earlier.zone());
        Some(Interval::new(&from, &to))
    }
}

impl fmt::Display for Interval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}/{}",
            format_timestamp(&self.begin),
            format_timestamp(&self.end())
        )
    }
}

/// The last instant representable in `point`'s offset.
fn latest_instant(point: &TimePoint) -> TimePoint {
    let offset = *point.offset();
    let east = i64::from(offset.local_minus_utc().max(0));
    offset.from_utc_datetime(&(NaiveDateTime::MAX - Duration::seconds(east + 1)))
}

fn millis(dt: &TimePoint) -> i64 {
    dt.timestamp_millis()
}
