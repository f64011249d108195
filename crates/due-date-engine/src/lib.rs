//! # due-date-engine
//!
//! Due-date computation for library circulation.
//!
//! The engine adjusts a loan's naive due date when it falls while a service
//! point is closed, using one of a fixed set of policy-selected strategies,
//! and checks that renewals strictly advance the due date. Underneath sits
//! immutable, timezone-aware interval arithmetic that stays correct when
//! timestamps round-trip through text at millisecond precision.
//!
//! ## Modules
//!
//! - [`clock`] — Injectable sources of "now" and a swappable shared clock
//! - [`timestamp`] — Canonical timestamp text form and zone helpers
//! - [`interval`] — Half-open `[begin, end)` intervals
//! - [`schedule`] — Service point opening schedules
//! - [`strategy`] — Closed-library due-date strategies
//! - [`policy`] — Loan-policy configuration selecting a strategy
//! - [`renewal`] — Renewal due-date progression check
//! - [`error`] — Error types

pub mod clock;
pub mod error;
pub mod interval;
pub mod policy;
pub mod renewal;
pub mod schedule;
pub mod strategy;
pub mod timestamp;

pub use clock::{Clock, ClockOverride, FixedClock, SharedClock, SteppingClock, SystemClock};
pub use error::{DueDateError, ValidationFailure};
pub use interval::Interval;
pub use policy::{DueDateManagement, PolicyConfig};
pub use renewal::{error_when_earlier_or_same_due_date, Loan, LoanSnapshot};
pub use schedule::{OpeningDay, OpeningHour, OpeningSchedule};
pub use strategy::{ClosedLibraryStrategy, SearchHorizon};
pub use timestamp::{
    format_timestamp, parse_timestamp, parse_timezone, same_instant, TimePoint,
};
