//! Loan-policy configuration for closed-library handling.

use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

use crate::error::{DueDateError, Result};
use crate::strategy::{ClosedLibraryStrategy, SearchHorizon};
use crate::timestamp::parse_timezone;

/// What to do with a due date that falls while the service point is closed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DueDateManagement {
    KeepTheCurrentDueDate,
    KeepTheCurrentDueDateTime,
    MoveToTheEndOfThePreviousOpenDay,
    MoveToTheEndOfTheNextOpenDay,
    MoveToEndOfCurrentServicePointHours,
    MoveToBeginningOfNextOpenServicePointHours,
}

/// Closed-library section of a loan policy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PolicyConfig {
    pub due_date_management: DueDateManagement,
    /// IANA zone used by [`DueDateManagement::KeepTheCurrentDueDate`].
    #[serde(default = "default_timezone")]
    pub timezone: String,
    #[serde(default = "default_search_horizon_days")]
    pub search_horizon_days: u32,
}

fn default_timezone() -> String {
    "UTC".to_string()
}

fn default_search_horizon_days() -> u32 {
    SearchHorizon::DEFAULT_DAYS
}

impl PolicyConfig {
    pub fn new(due_date_management: DueDateManagement) -> Self {
        Self {
            due_date_management,
            timezone: default_timezone(),
            search_horizon_days: default_search_horizon_days(),
        }
    }

    /// Validate zone and horizon values.
    pub fn validate(&self) -> Result<()> {
        self.zone()?;
        self.horizon()?;
        Ok(())
    }

    /// Parse a policy from a JSON string and validate it.
    pub fn from_json_str(input: &str) -> Result<Self> {
        let cfg: PolicyConfig = serde_json::from_str(input)
            .map_err(|e| DueDateError::Configuration(format!("parse error: {e}")))?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn zone(&self) -> Result<Tz> {
        parse_timezone(&self.timezone)
    }

    pub fn horizon(&self) -> Result<SearchHorizon> {
        SearchHorizon::days(self.search_horizon_days)
    }

    /// The strategy this policy selects.
    pub fn strategy(&self) -> Result<ClosedLibraryStrategy> {
        let horizon = self.horizon()?;
        let strategy = match self.due_date_management {
            DueDateManagement::KeepTheCurrentDueDate => {
                ClosedLibraryStrategy::keep_current_date(self.zone()?)
            }
            DueDateManagement::KeepTheCurrentDueDateTime => {
                ClosedLibraryStrategy::KeepCurrentDateTime
            }
            DueDateManagement::MoveToTheEndOfThePreviousOpenDay => {
                ClosedLibraryStrategy::EndOfPreviousOpenDay { horizon }
            }
            DueDateManagement::MoveToTheEndOfTheNextOpenDay => {
                ClosedLibraryStrategy::EndOfNextOpenDay { horizon }
            }
            DueDateManagement::MoveToEndOfCurrentServicePointHours => {
                ClosedLibraryStrategy::EndOfPreviousOpenHours { horizon }
            }
            DueDateManagement::MoveToBeginningOfNextOpenServicePointHours => {
                ClosedLibraryStrategy::BeginningOfNextOpenHours { horizon }
            }
        };
        tracing::debug!(policy = ?self.due_date_management, %strategy, "selected closed-library strategy");
        Ok(strategy)
    }
}
