//! Sources of "now".
//!
//! Nothing in this crate reads the system clock directly. Components that need
//! the current time take a [`Clock`], so tests can supply a [`FixedClock`] or a
//! [`SteppingClock`] and production code a [`SystemClock`].
//!
//! [`SharedClock`] is a swappable holder for code that must hand out one clock
//! for a whole process while still allowing test setup to override it. A swap
//! replaces a single `Arc` under a lock, so concurrent readers always observe
//! either the old or the new clock, never a partially written one.

use std::sync::Arc;

use chrono::{Duration, NaiveDate, Utc};
use parking_lot::{Mutex, RwLock};

use crate::timestamp::{to_time_point, TimePoint};

/// Abstraction over the current instant.
pub trait Clock: Send + Sync {
    fn now(&self) -> TimePoint;

    /// The calendar date of [`Clock::now`] in the clock's own offset.
    fn today(&self) -> NaiveDate {
        self.now().date_naive()
    }
}

/// Real wall-clock time in UTC.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> TimePoint {
        to_time_point(&Utc::now())
    }
}

/// A clock that never moves.
#[derive(Debug, Clone)]
pub struct FixedClock {
    now: TimePoint,
}

impl FixedClock {
    pub fn new(now: TimePoint) -> Self {
        Self { now }
    }
}

impl Clock for FixedClock {
    fn now(&self) -> TimePoint {
        self.now
    }
}

/// A clock that returns `start` on the first read and advances by `step` on
/// every read after that.
#[derive(Debug)]
pub struct SteppingClock {
    next: Mutex<TimePoint>,
    step: Duration,
}

impl SteppingClock {
    pub fn new(start: TimePoint, step: Duration) -> Self {
        Self {
            next: Mutex::new(start),
            step,
        }
    }
}

impl Clock for SteppingClock {
    fn now(&self) -> TimePoint {
        let mut next = self.next.lock();
        let current = *next;
        *next = current + self.step;
        current
    }
}

/// A process-lifetime clock holder whose clock can be replaced.
///
/// Production paths only call [`SharedClock::now`] (or use it as a
/// [`Clock`]); replacing the clock is for test setup and teardown.
pub struct SharedClock {
    inner: RwLock<Arc<dyn Clock>>,
}

impl SharedClock {
    /// A holder reading real time.
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(Arc::new(SystemClock)),
        }
    }

    /// A holder reading `clock`.
    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self {
            inner: RwLock::new(clock),
        }
    }

    /// Read the currently configured clock.
    pub fn now(&self) -> TimePoint {
        let clock = Arc::clone(&*self.inner.read());
        clock.now()
    }

    /// Replace the configured clock.
    pub fn set_clock(&self, clock: Arc<dyn Clock>) {
        tracing::debug!("overriding shared clock");
        *self.inner.write() = clock;
    }

    /// Go back to real system time in UTC.
    pub fn set_default_clock(&self) {
        tracing::debug!("restoring default system clock");
        *self.inner.write() = Arc::new(SystemClock);
    }

    /// Override the clock until the returned guard is dropped.
    ///
    /// The default clock is restored on drop, including when a test panics
    /// while the guard is alive.
    #[must_use = "the override is undone as soon as the guard is dropped"]
    pub fn override_with(&self, clock: Arc<dyn Clock>) -> ClockOverride<'_> {
        self.set_clock(clock);
        ClockOverride { holder: self }
    }
}

impl Default for SharedClock {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for SharedClock {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SharedClock").finish_non_exhaustive()
    }
}

impl Clock for SharedClock {
    fn now(&self) -> TimePoint {
        SharedClock::now(self)
    }
}

/// Guard returned by [`SharedClock::override_with`].
pub struct ClockOverride<'a> {
    holder: &'a SharedClock,
}

impl Drop for ClockOverride<'_> {
    fn drop(&mut self) {
        self.holder.set_default_clock();
    }
}
