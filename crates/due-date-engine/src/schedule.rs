//! Service point opening schedules.
//!
//! A schedule is read-only input: an ordered run of calendar dates, each with
//! the hours the service point is open on that date, interpreted in the
//! service point's time zone. How it was fetched or cached is the caller's
//! business.

use chrono::{Duration, NaiveDate, NaiveTime};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

use crate::error::{DueDateError, Result};
use crate::interval::Interval;
use crate::timestamp::{local_time_point, start_of_day, TimePoint};

/// One open range within a day, in local time.
///
/// An `end` of `00:00:00` means midnight at the end of the day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OpeningHour {
    pub start: NaiveTime,
    pub end: NaiveTime,
}

impl OpeningHour {
    pub fn new(start: NaiveTime, end: NaiveTime) -> Self {
        Self { start, end }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OpeningDay {
    pub date: NaiveDate,
    #[serde(default = "default_open")]
    pub open: bool,
    #[serde(default)]
    pub all_day: bool,
    #[serde(default)]
    pub hours: Vec<OpeningHour>,
}

fn default_open() -> bool {
    true
}

impl OpeningDay {
    /// A day the service point does not open at all.
    pub fn closed(date: NaiveDate) -> Self {
        Self {
            date,
            open: false,
            all_day: false,
            hours: Vec::new(),
        }
    }

    /// A day open around the clock.
    pub fn all_day(date: NaiveDate) -> Self {
        Self {
            date,
            open: true,
            all_day: true,
            hours: Vec::new(),
        }
    }

    /// A day open during `hours`.
    pub fn with_hours(date: NaiveDate, hours: Vec<OpeningHour>) -> Self {
        Self {
            date,
            open: true,
            all_day: false,
            hours,
        }
    }

    pub fn is_open(&self) -> bool {
        self.open && (self.all_day || !self.hours.is_empty())
    }

    /// The open ranges of this day as zoned intervals, in chronological order.
    ///
    /// Closed days yield nothing.
    ///
    /// # Errors
    ///
    /// Returns [`DueDateError::InvalidDatetime`] if an opening time does not
    /// exist in `tz` on this date.
    pub fn intervals(&self, tz: &Tz) -> Result<Vec<Interval>> {
        if !self.is_open() {
            return Ok(Vec::new());
        }
        let next_midnight = start_of_day(next_date(self.date)?, tz)?;
        if self.all_day {
            let begin = start_of_day(self.date, tz)?;
            return Ok(vec![Interval::new(&begin, &next_midnight)]);
        }

        let mut intervals = self
            .hours
            .iter()
            .map(|hour| -> Result<Interval> {
                let begin = local_time_point(self.date, hour.start, tz)?;
                let end = if hour.end == NaiveTime::MIN {
                    next_midnight
                } else {
                    local_time_point(self.date, hour.end, tz)?
                };
                Ok(Interval::new(&begin, &end))
            })
            .collect::<Result<Vec<_>>>()?;
        intervals.sort_by_key(Interval::start);
        Ok(intervals)
    }
}

/// Opening days for one service point, ordered by date.
///
/// Every way of building one, deserialization included, orders the days.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "ScheduleDocument")]
pub struct OpeningSchedule {
    zone: Tz,
    days: Vec<OpeningDay>,
}

/// Wire shape of a schedule before its days are ordered.
#[derive(Deserialize)]
struct ScheduleDocument {
    zone: Tz,
    days: Vec<OpeningDay>,
}

impl From<ScheduleDocument> for OpeningSchedule {
    fn from(document: ScheduleDocument) -> Self {
        Self::new(document.zone, document.days)
    }
}

impl OpeningSchedule {
    /// Build a schedule, ordering `days` by date.
    pub fn new(zone: Tz, mut days: Vec<OpeningDay>) -> Self {
        days.sort_by_key(|day| day.date);
        Self { zone, days }
    }

    /// A schedule with no known opening days.
    pub fn empty(zone: Tz) -> Self {
        Self {
            zone,
            days: Vec::new(),
        }
    }

    /// Parse a schedule from JSON, ordering its days by date.
    ///
    /// # Errors
    ///
    /// Returns [`DueDateError::Configuration`] if the document is malformed.
    pub fn from_json_str(input: &str) -> Result<Self> {
        serde_json::from_str(input)
            .map_err(|e| DueDateError::Configuration(format!("opening schedule: {e}")))
    }

    /// The service point's time zone.
    pub fn zone(&self) -> Tz {
        self.zone
    }

    /// All known days, open or closed, in date order.
    pub fn days(&self) -> &[OpeningDay] {
        &self.days
    }

    pub fn day(&self, date: NaiveDate) -> Option<&OpeningDay> {
        self.days
            .binary_search_by_key(&date, |day| day.date)
            .ok()
            .map(|idx| &self.days[idx])
    }

    /// Calendar date of `point` in the schedule's zone.
    pub fn local_date(&self, point: &TimePoint) -> NaiveDate {
        point.with_timezone(&self.zone).date_naive()
    }

    /// Open days with dates in `[from, to]`.
    pub fn days_between(
        &self,
        from: NaiveDate,
        to: NaiveDate,
    ) -> impl DoubleEndedIterator<Item = &OpeningDay> {
        let lo = self.days.partition_point(|day| day.date < from);
        let hi = self.days.partition_point(|day| day.date <= to);
        self.days[lo..hi.max(lo)].iter().filter(|day| day.is_open())
    }

    /// Open intervals of all days with dates in `[from, to]`, in order.
    pub fn open_intervals_between(&self, from: NaiveDate, to: NaiveDate) -> Result<Vec<Interval>> {
        let mut intervals = Vec::new();
        for day in self.days_between(from, to) {
            intervals.extend(day.intervals(&self.zone)?);
        }
        Ok(intervals)
    }

    /// The open interval containing `point`, if any.
    pub fn open_interval_at(&self, point: &TimePoint) -> Result<Option<Interval>> {
        let date = self.local_date(point);
        // ranges ending at midnight belong to the previous day's entry
        let from = date.pred_opt().unwrap_or(date);
        Ok(self
            .open_intervals_between(from, date)?
            .into_iter()
            .find(|interval| interval.contains(point)))
    }

    pub fn is_open_at(&self, point: &TimePoint) -> Result<bool> {
        Ok(self.open_interval_at(point)?.is_some())
    }
}

fn next_date(date: NaiveDate) -> Result<NaiveDate> {
    date.checked_add_signed(Duration::days(1))
        .ok_or_else(|| DueDateError::InvalidDatetime(format!("no date after {date}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::timestamp::parse_timestamp;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn hm(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    fn new_york() -> Tz {
        "America/New_York".parse().unwrap()
    }

    #[test]
    fn test_closed_day_has_no_intervals() {
        let day = OpeningDay::closed(date(2026, 3, 16));
        assert!(!day.is_open());
        assert!(day.intervals(&new_york()).unwrap().is_empty());
    }

    #[test]
    fn test_open_flag_without_hours_is_closed() {
        let day = OpeningDay::with_hours(date(2026, 3, 16), Vec::new());
        assert!(!day.is_open());
    }

    #[test]
    fn test_all_day_spans_local_midnights() {
        let day = OpeningDay::all_day(date(2026, 1, 15));
        let intervals = day.intervals(&new_york()).unwrap();
        assert_eq!(intervals.len(), 1);
        assert_eq!(intervals[0].start(), parse_timestamp("2026-01-15T00:00:00-05:00").unwrap());
        assert_eq!(intervals[0].end(), parse_timestamp("2026-01-16T00:00:00-05:00").unwrap());
    }

    #[test]
    fn test_hours_are_sorted_and_zoned() {
        let day = OpeningDay::with_hours(
            date(2026, 1, 15),
            vec![
                OpeningHour::new(hm(13, 0), hm(17, 0)),
                OpeningHour::new(hm(9, 0), hm(12, 0)),
            ],
        );
        let intervals = day.intervals(&new_york()).unwrap();
        assert_eq!(intervals.len(), 2);
        assert_eq!(intervals[0].start(), parse_timestamp("2026-01-15T14:00:00Z").unwrap());
        assert_eq!(intervals[1].end(), parse_timestamp("2026-01-15T22:00:00Z").unwrap());
    }

    #[test]
    fn test_midnight_end_runs_to_next_day() {
        let day = OpeningDay::with_hours(
            date(2026, 1, 15),
            vec![OpeningHour::new(hm(18, 0), NaiveTime::MIN)],
        );
        let intervals = day.intervals(&new_york()).unwrap();
        assert_eq!(intervals[0].duration(), Duration::hours(6));
    }

    #[test]
    fn test_schedule_orders_days_and_looks_up() {
        let schedule = OpeningSchedule::new(
            new_york(),
            vec![
                OpeningDay::all_day(date(2026, 1, 17)),
                OpeningDay::closed(date(2026, 1, 16)),
                OpeningDay::all_day(date(2026, 1, 15)),
            ],
        );
        assert_eq!(schedule.days()[0].date, date(2026, 1, 15));
        assert!(!schedule.day(date(2026, 1, 16)).unwrap().is_open());
        assert!(schedule.day(date(2026, 1, 18)).is_none());
        let open: Vec<_> = schedule
            .days_between(date(2026, 1, 15), date(2026, 1, 17))
            .map(|day| day.date)
            .collect();
        assert_eq!(open, vec![date(2026, 1, 15), date(2026, 1, 17)]);
    }

    #[test]
    fn test_days_between_inverted_range_is_empty() {
        let schedule = OpeningSchedule::new(new_york(), vec![OpeningDay::all_day(date(2026, 1, 15))]);
        assert_eq!(schedule.days_between(date(2026, 1, 16), date(2026, 1, 14)).count(), 0);
    }

    #[test]
    fn test_is_open_at() {
        let schedule = OpeningSchedule::new(
            new_york(),
            vec![OpeningDay::with_hours(
                date(2026, 1, 15),
                vec![OpeningHour::new(hm(9, 0), hm(17, 0))],
            )],
        );
        let inside = parse_timestamp("2026-01-15T10:00:00-05:00").unwrap();
        let closing = parse_timestamp("2026-01-15T17:00:00-05:00").unwrap();
        assert!(schedule.is_open_at(&inside).unwrap());
        assert!(!schedule.is_open_at(&closing).unwrap());
    }

    #[test]
    fn test_open_at_late_hours_from_previous_day() {
        let schedule = OpeningSchedule::new(
            new_york(),
            vec![OpeningDay::with_hours(
                date(2026, 1, 15),
                vec![OpeningHour::new(hm(18, 0), NaiveTime::MIN)],
            )],
        );
        // 23:30 local, expressed in UTC on the following calendar day
        let late = parse_timestamp("2026-01-16T04:30:00Z").unwrap();
        assert!(schedule.is_open_at(&late).unwrap());
    }

    #[test]
    fn test_from_json_str() {
        let schedule = OpeningSchedule::from_json_str(
            r#"{
                "zone": "Europe/Berlin",
                "days": [
                    {"date": "2026-01-16", "open": false},
                    {"date": "2026-01-15", "hours": [{"start": "08:00:00", "end": "20:00:00"}]},
                    {"date": "2026-01-17", "all_day": true}
                ]
            }"#,
        )
        .unwrap();
        assert_eq!(schedule.zone(), chrono_tz::Europe::Berlin);
        assert_eq!(schedule.days().len(), 3);
        assert!(schedule.days()[0].is_open());
        assert!(!schedule.days()[1].is_open());
        assert!(schedule.days()[2].all_day);
    }

    #[test]
    fn test_serde_deserialize_orders_days() {
        let schedule: OpeningSchedule = serde_json::from_str(
            r#"{
                "zone": "America/New_York",
                "days": [
                    {"date": "2026-01-16", "all_day": true},
                    {"date": "2026-01-13", "all_day": true},
                    {"date": "2026-01-18", "open": false}
                ]
            }"#,
        )
        .unwrap();
        let dates: Vec<_> = schedule.days().iter().map(|day| day.date).collect();
        assert_eq!(dates, vec![date(2026, 1, 13), date(2026, 1, 16), date(2026, 1, 18)]);
        assert!(schedule.day(date(2026, 1, 16)).unwrap().is_open());

        let friday_noon = parse_timestamp("2026-01-16T12:00:00-05:00").unwrap();
        assert!(schedule.is_open_at(&friday_noon).unwrap());
        let last_open: Vec<_> = schedule
            .days_between(date(2026, 1, 12), date(2026, 1, 18))
            .map(|day| day.date)
            .collect();
        assert_eq!(last_open, vec![date(2026, 1, 13), date(2026, 1, 16)]);
    }

    #[test]
    fn test_from_json_str_rejects_bad_zone() {
        let err = OpeningSchedule::from_json_str(r#"{"zone": "Nowhere/Land", "days": []}"#)
            .unwrap_err()
            .to_string();
        assert!(err.contains("Configuration error"), "got: {err}");
    }
}
