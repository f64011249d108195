//! Error types for due-date calculations.

use std::collections::BTreeMap;
use std::fmt;

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DueDateError {
    #[error("Invalid datetime: {0}")]
    InvalidDatetime(String),

    #[error("Invalid timezone: {0}")]
    InvalidTimezone(String),

    #[error("Validation failed: {0}")]
    Validation(ValidationFailure),

    #[error("Configuration error: {0}")]
    Configuration(String),
}

/// A structured, client-reportable validation failure.
///
/// Carries a human-readable message plus the parameters that caused it, so
/// calling layers can aggregate several failures before responding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationFailure {
    pub message: String,
    pub parameters: BTreeMap<String, String>,
}

impl ValidationFailure {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            parameters: BTreeMap::new(),
        }
    }

    pub fn with_parameter(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.parameters.insert(key.into(), value.into());
        self
    }
}

impl fmt::Display for ValidationFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl DueDateError {
    /// The validation failure, if this error is one.
    pub fn as_validation(&self) -> Option<&ValidationFailure> {
        match self {
            DueDateError::Validation(failure) => Some(failure),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, DueDateError>;
