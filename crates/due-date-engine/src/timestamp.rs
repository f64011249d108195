//! Canonical textual form for timestamps crossing the library boundary.
//!
//! Every [`TimePoint`] exchanged with callers is rendered as RFC 3339 with
//! millisecond precision and an explicit UTC offset. Two timestamps are the
//! same instant when they are equal after truncation to the millisecond:
//! anything finer is an artifact of formatting and parsing, not a semantic
//! difference.

use chrono::{DateTime, NaiveDate, NaiveTime, Offset, SecondsFormat, TimeZone};
use chrono_tz::Tz;

use crate::error::{DueDateError, Result};

/// A zoned instant. Never a naive, zone-less value.
pub type TimePoint = DateTime<chrono::FixedOffset>;

/// Render a timestamp in canonical form, e.g. `2020-11-17T23:59:59.000-05:00`.
///
/// UTC is rendered with a `Z` suffix.
pub fn format_timestamp(dt: &TimePoint) -> String {
    dt.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Parse an RFC 3339 timestamp, keeping the offset it was written with.
///
/// # Errors
///
/// Returns [`DueDateError::InvalidDatetime`] if the string is not RFC 3339.
pub fn parse_timestamp(s: &str) -> Result<TimePoint> {
    DateTime::parse_from_rfc3339(s.trim())
        .map_err(|e| DueDateError::InvalidDatetime(format!("'{}': {}", s, e)))
}

/// Parse an IANA timezone name into [`Tz`].
///
/// # Errors
///
/// Returns [`DueDateError::InvalidTimezone`] for unknown names.
pub fn parse_timezone(s: &str) -> Result<Tz> {
    s.parse::<Tz>()
        .map_err(|_| DueDateError::InvalidTimezone(format!("'{}'", s)))
}

/// Whether two timestamps denote the same instant once both are truncated to
/// the millisecond.
///
/// Truncation, not rounding: 0.9 ms and 1.1 ms past a second are different
/// instants, while 1.1 ms and 1.9 ms are the same.
pub fn same_instant<A: TimeZone, B: TimeZone>(a: &DateTime<A>, b: &DateTime<B>) -> bool {
    a.timestamp_millis() == b.timestamp_millis()
}

/// Convert a datetime in any zone to a [`TimePoint`] with the offset in effect
/// at that instant.
pub fn to_time_point<Z: TimeZone>(dt: &DateTime<Z>) -> TimePoint {
    let offset = dt.offset().fix();
    dt.with_timezone(&offset)
}

/// Resolve a local date and time in `tz`.
///
/// Ambiguous local times (DST fall-back) resolve to the earliest instant.
///
/// # Errors
///
/// Returns [`DueDateError::InvalidDatetime`] when the local time falls into a
/// DST gap and does not exist in `tz`.
pub fn local_time_point(date: NaiveDate, time: NaiveTime, tz: &Tz) -> Result<TimePoint> {
    let naive = date.and_time(time);
    tz.from_local_datetime(&naive)
        .earliest()
        .map(|dt| to_time_point(&dt))
        .ok_or_else(|| {
            DueDateError::InvalidDatetime(format!("'{}' does not exist in {}", naive, tz.name()))
        })
}

/// 23:59:59.000 local time on `date` in `tz`.
pub fn end_of_day(date: NaiveDate, tz: &Tz) -> Result<TimePoint> {
    local_time_point(date, end_of_day_time(), tz)
}

/// Local midnight at the start of `date` in `tz`.
///
/// Zones whose DST transition swallows midnight start the day at the first
/// instant that exists.
pub fn start_of_day(date: NaiveDate, tz: &Tz) -> Result<TimePoint> {
    local_time_point(date, NaiveTime::MIN, tz).or_else(|_| {
        // 01:00 exists wherever a midnight gap does
        let one_am = NaiveTime::from_hms_opt(1, 0, 0).unwrap_or(NaiveTime::MIN);
        local_time_point(date, one_am, tz)
    })
}

pub(crate) fn end_of_day_time() -> NaiveTime {
    NaiveTime::from_hms_opt(23, 59, 59).unwrap_or(NaiveTime::MIN)
}
