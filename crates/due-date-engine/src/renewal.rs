//! Renewal due-date progression.
//!
//! A renewal must move the due date strictly forward. This is checked before
//! the caller commits anything; the loan itself is never mutated here.

use crate::error::{DueDateError, Result, ValidationFailure};
use crate::timestamp::{format_timestamp, TimePoint};

pub const RENEWAL_WOULD_NOT_CHANGE_DUE_DATE: &str = "renewal would not change the due date";

/// Read-only view of a loan.
pub trait Loan {
    fn due_date(&self) -> TimePoint;
}

/// An immutable loan state carrying only its due date.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoanSnapshot {
    due_date: TimePoint,
}

impl LoanSnapshot {
    pub fn new(due_date: TimePoint) -> Self {
        Self { due_date }
    }

    /// A new snapshot with `due_date`; `self` is left untouched.
    pub fn with_due_date(&self, due_date: TimePoint) -> Self {
        Self { due_date }
    }

    /// Validate `proposed` against this loan and return the renewed snapshot.
    pub fn renew(&self, proposed: TimePoint) -> Result<Self> {
        error_when_earlier_or_same_due_date(self, proposed).map(|due| self.with_due_date(due))
    }
}

impl Loan for LoanSnapshot {
    fn due_date(&self) -> TimePoint {
        self.due_date
    }
}

/// Accept `proposed` only if it is strictly after the loan's current due date.
///
/// Both instants are truncated to the millisecond before comparing, so a
/// proposal within the same millisecond as the current date counts as the
/// same date.
///
/// # Errors
///
/// Returns [`DueDateError::Validation`] with the message
/// "renewal would not change the due date" and a `dueDate` parameter when
/// `proposed` is earlier than or equal to the current due date.
pub fn error_when_earlier_or_same_due_date<L: Loan + ?Sized>(
    loan: &L,
    proposed: TimePoint,
) -> Result<TimePoint> {
    let current = loan.due_date();
    if proposed.timestamp_millis() <= current.timestamp_millis() {
        tracing::debug!(
            current = %format_timestamp(&current),
            proposed = %format_timestamp(&proposed),
            "rejected renewal that does not advance the due date"
        );
        return Err(DueDateError::Validation(
            ValidationFailure::new(RENEWAL_WOULD_NOT_CHANGE_DUE_DATE)
                .with_parameter("dueDate", format_timestamp(&proposed)),
        ));
    }
    Ok(proposed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::timestamp::parse_timestamp;
    use chrono::Duration;

    fn current() -> TimePoint {
        parse_timestamp("2026-03-16T23:59:59-04:00").unwrap()
    }

    fn assert_rejected(result: Result<TimePoint>) {
        let err = result.unwrap_err();
        let failure = err.as_validation().expect("validation failure");
        assert_eq!(failure.message, "renewal would not change the due date");
        assert!(failure.parameters.contains_key("dueDate"));
    }

    #[test]
    fn test_earlier_due_date_rejected() {
        let loan = LoanSnapshot::new(current());
        assert_rejected(error_when_earlier_or_same_due_date(
            &loan,
            current() - Duration::weeks(2),
        ));
    }

    #[test]
    fn test_later_due_date_accepted() {
        let loan = LoanSnapshot::new(current());
        let proposed = current() + Duration::weeks(1);
        assert_eq!(
            error_when_earlier_or_same_due_date(&loan, proposed).unwrap(),
            proposed
        );
    }

    #[test]
    fn test_same_due_date_rejected() {
        let loan = LoanSnapshot::new(current());
        assert_rejected(error_when_earlier_or_same_due_date(&loan, current()));
    }

    #[test]
    fn test_same_instant_in_other_offset_rejected() {
        let loan = LoanSnapshot::new(current());
        let same = parse_timestamp("2026-03-17T03:59:59Z").unwrap();
        assert_rejected(error_when_earlier_or_same_due_date(&loan, same));
    }

    #[test]
    fn test_sub_millisecond_advance_rejected() {
        let loan = LoanSnapshot::new(current());
        let proposed = current() + Duration::microseconds(500);
        assert_rejected(error_when_earlier_or_same_due_date(&loan, proposed));
    }

    #[test]
    fn test_advance_across_millisecond_boundary_accepted() {
        let loan = LoanSnapshot::new(current() + Duration::microseconds(900));
        let proposed = current() + Duration::microseconds(1_100);
        assert!(error_when_earlier_or_same_due_date(&loan, proposed).is_ok());
    }

    #[test]
    fn test_one_millisecond_advance_accepted() {
        let loan = LoanSnapshot::new(current());
        let proposed = current() + Duration::milliseconds(1);
        assert!(error_when_earlier_or_same_due_date(&loan, proposed).is_ok());
    }

    #[test]
    fn test_failure_message_in_error_display() {
        let loan = LoanSnapshot::new(current());
        let err = error_when_earlier_or_same_due_date(&loan, current()).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Validation failed: renewal would not change the due date"
        );
    }

    #[test]
    fn test_renew_returns_new_snapshot() {
        let loan = LoanSnapshot::new(current());
        let renewed = loan.renew(current() + Duration::weeks(3)).unwrap();
        assert_eq!(renewed.due_date(), current() + Duration::weeks(3));
        assert_eq!(loan.due_date(), current());
        assert!(loan.renew(current()).is_err());
    }

    #[test]
    fn test_works_with_trait_objects() {
        let loan: Box<dyn Loan> = Box::new(LoanSnapshot::new(current()));
        assert!(error_when_earlier_or_same_due_date(loan.as_ref(), current()).is_err());
    }
}
