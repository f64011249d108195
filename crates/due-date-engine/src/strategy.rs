//! Closed-library due-date strategies.
//!
//! When a naive due date lands while a service point is closed, the loan
//! policy picks one of a fixed set of adjustments. Each adjustment is a
//! variant of [`ClosedLibraryStrategy`]; all of them are pure functions of the
//! requested date and the opening schedule.
//!
//! # Variants
//!
//! - [`ClosedLibraryStrategy::KeepCurrentDate`] — same calendar date, end of day
//! - [`ClosedLibraryStrategy::KeepCurrentDateTime`] — unchanged (24-hour access)
//! - [`ClosedLibraryStrategy::EndOfPreviousOpenDay`] — end of the nearest open day at or before
//! - [`ClosedLibraryStrategy::EndOfNextOpenDay`] — end of the nearest open day at or after
//! - [`ClosedLibraryStrategy::EndOfPreviousOpenHours`] — close of the nearest preceding opening hours
//! - [`ClosedLibraryStrategy::BeginningOfNextOpenHours`] — start of the nearest following opening hours
//!
//! The rollover variants never look further than their [`SearchHorizon`] and
//! report [`DueDateError::Configuration`] when nothing qualifies.

use std::fmt;

use chrono::{Duration, NaiveDate};
use chrono_tz::Tz;

use crate::error::{DueDateError, Result};
use crate::interval::Interval;
use crate::schedule::OpeningSchedule;
use crate::timestamp::{end_of_day, format_timestamp, to_time_point, TimePoint};

/// How many days a rollover search may look away from the requested date.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchHorizon(u32);

impl SearchHorizon {
    pub const DEFAULT_DAYS: u32 = 365;

    /// # Errors
    ///
    /// Returns [`DueDateError::Configuration`] for a zero-day horizon.
    pub fn days(days: u32) -> Result<Self> {
        if days == 0 {
            return Err(DueDateError::Configuration(
                "search horizon must be at least one day".to_string(),
            ));
        }
        Ok(Self(days))
    }

    pub fn as_days(&self) -> u32 {
        self.0
    }

    fn back_from(&self, date: NaiveDate) -> NaiveDate {
        date.checked_sub_signed(Duration::days(i64::from(self.0)))
            .unwrap_or(NaiveDate::MIN)
    }

    fn forward_from(&self, date: NaiveDate) -> NaiveDate {
        date.checked_add_signed(Duration::days(i64::from(self.0)))
            .unwrap_or(NaiveDate::MAX)
    }
}

impl Default for SearchHorizon {
    fn default() -> Self {
        Self(Self::DEFAULT_DAYS)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClosedLibraryStrategy {
    /// Keep the requested calendar date, at 23:59:59 in `zone`.
    KeepCurrentDate { zone: Tz },
    /// Keep the requested instant as is.
    KeepCurrentDateTime,
    /// End of the requested day if it is open, otherwise end of the nearest
    /// earlier open day.
    EndOfPreviousOpenDay { horizon: SearchHorizon },
    /// End of the requested day if it is open, otherwise end of the nearest
    /// later open day.
    EndOfNextOpenDay { horizon: SearchHorizon },
    /// Unchanged while open, otherwise the end of the latest opening hours
    /// that close at or before the requested instant.
    EndOfPreviousOpenHours { horizon: SearchHorizon },
    /// Unchanged while open, otherwise the start of the earliest opening
    /// hours after the requested instant.
    BeginningOfNextOpenHours { horizon: SearchHorizon },
}

impl ClosedLibraryStrategy {
    pub fn keep_current_date(zone: Tz) -> Self {
        Self::KeepCurrentDate { zone }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::KeepCurrentDate { .. } => "keep-current-date",
            Self::KeepCurrentDateTime => "keep-current-date-time",
            Self::EndOfPreviousOpenDay { .. } => "end-of-previous-open-day",
            Self::EndOfNextOpenDay { .. } => "end-of-next-open-day",
            Self::EndOfPreviousOpenHours { .. } => "end-of-previous-open-hours",
            Self::BeginningOfNextOpenHours { .. } => "beginning-of-next-open-hours",
        }
    }

    /// Adjust `requested` for the closures in `schedule`.
    ///
    /// # Errors
    ///
    /// Returns [`DueDateError::Configuration`] if a rollover variant finds no
    /// open period within its horizon, and [`DueDateError::InvalidDatetime`]
    /// if the adjusted local time does not exist in the target zone.
    ///
    /// # Examples
    ///
    /// ```
    /// use due_date_engine::{format_timestamp, parse_timestamp, ClosedLibraryStrategy, OpeningSchedule};
    ///
    /// let zone: chrono_tz::Tz = "Etc/GMT+5".parse().unwrap();
    /// let strategy = ClosedLibraryStrategy::keep_current_date(zone);
    /// let requested = parse_timestamp("2020-11-17T09:47:00Z").unwrap();
    /// let due = strategy
    ///     .calculate_due_date(requested, &OpeningSchedule::empty(zone))
    ///     .unwrap();
    /// assert_eq!(format_timestamp(&due), "2020-11-17T23:59:59.000-05:00");
    /// ```
    pub fn calculate_due_date(
        &self,
        requested: TimePoint,
        schedule: &OpeningSchedule,
    ) -> Result<TimePoint> {
        let due = match self {
            Self::KeepCurrentDate { zone } => end_of_day(requested.date_naive(), zone),
            Self::KeepCurrentDateTime => Ok(requested),
            Self::EndOfPreviousOpenDay { horizon } => {
                end_of_previous_open_day(&requested, schedule, *horizon)
            }
            Self::EndOfNextOpenDay { horizon } => {
                end_of_next_open_day(&requested, schedule, *horizon)
            }
            Self::EndOfPreviousOpenHours { horizon } => {
                end_of_previous_open_hours(&requested, schedule, *horizon)
            }
            Self::BeginningOfNextOpenHours { horizon } => {
                beginning_of_next_open_hours(&requested, schedule, *horizon)
            }
        }?;

        tracing::debug!(
            strategy = self.name(),
            requested = %format_timestamp(&requested),
            due = %format_timestamp(&due),
            "calculated due date"
        );
        Ok(due)
    }
}

impl fmt::Display for ClosedLibraryStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

fn end_of_previous_open_day(
    requested: &TimePoint,
    schedule: &OpeningSchedule,
    horizon: SearchHorizon,
) -> Result<TimePoint> {
    let date = schedule.local_date(requested);
    let open_day = schedule
        .days_between(horizon.back_from(date), date)
        .next_back()
        .ok_or_else(|| no_open_period("on or before", requested, horizon))?;
    end_of_day(open_day.date, &schedule.zone())
}

fn end_of_next_open_day(
    requested: &TimePoint,
    schedule: &OpeningSchedule,
    horizon: SearchHorizon,
) -> Result<TimePoint> {
    let date = schedule.local_date(requested);
    let open_day = schedule
        .days_between(date, horizon.forward_from(date))
        .next()
        .ok_or_else(|| no_open_period("on or after", requested, horizon))?;
    end_of_day(open_day.date, &schedule.zone())
}

fn end_of_previous_open_hours(
    requested: &TimePoint,
    schedule: &OpeningSchedule,
    horizon: SearchHorizon,
) -> Result<TimePoint> {
    if schedule.is_open_at(requested)? {
        return Ok(in_zone(requested, &schedule.zone()));
    }
    let date = schedule.local_date(requested);
    schedule
        .open_intervals_between(horizon.back_from(date), date)?
        .into_iter()
        .map(|interval| interval.end())
        .filter(|end| end <= requested)
        .max()
        .map(|end| in_zone(&end, &schedule.zone()))
        .ok_or_else(|| no_open_period("before", requested, horizon))
}

fn beginning_of_next_open_hours(
    requested: &TimePoint,
    schedule: &OpeningSchedule,
    horizon: SearchHorizon,
) -> Result<TimePoint> {
    if schedule.is_open_at(requested)? {
        return Ok(in_zone(requested, &schedule.zone()));
    }
    let date = schedule.local_date(requested);
    schedule
        .open_intervals_between(date, horizon.forward_from(date))?
        .iter()
        .map(Interval::start)
        .filter(|start| start > requested)
        .min()
        .map(|start| in_zone(&start, &schedule.zone()))
        .ok_or_else(|| no_open_period("after", requested, horizon))
}

fn in_zone(point: &TimePoint, zone: &Tz) -> TimePoint {
    to_time_point(&point.with_timezone(zone))
}

fn no_open_period(direction: &str, requested: &TimePoint, horizon: SearchHorizon) -> DueDateError {
    tracing::warn!(
        requested = %format_timestamp(requested),
        horizon_days = horizon.as_days(),
        "no open period {direction} requested due date"
    );
    DueDateError::Configuration(format!(
        "no open period {} {} within {} days",
        direction,
        format_timestamp(requested),
        horizon.as_days()
    ))
}
