//! Named domain records for the tuition ledger.
//!
//! # Responsibility
//! - Define the entity structs returned by every store operation.
//! - Own input validation for the write paths.
//!
//! # Invariants
//! - Query results are always mapped into these records, never exposed as
//!   positional rows.
//! - Write paths must pass `validate()` before any SQL mutation.

use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod guardian;
pub mod payment;
pub mod period;
pub mod settings;
pub mod student;

/// Input validation failure. The caller fixes the input and retries;
/// these are never storage problems.
#[derive(Debug, Clone, PartialEq)]
pub enum ValidationError {
    EmptyGuardianName,
    InvalidEmail(String),
    EmptyStudentName,
    NonPositiveAmount(f64),
    UnknownPeriod(String),
    EmptySchoolName,
    BillingDayOutOfRange(u8),
}

impl Display for ValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyGuardianName => write!(f, "guardian name must not be empty"),
            Self::InvalidEmail(value) => write!(f, "invalid email address: `{value}`"),
            Self::EmptyStudentName => write!(f, "student name must not be empty"),
            Self::NonPositiveAmount(value) => {
                write!(f, "payment amount must be positive, got {value}")
            }
            Self::UnknownPeriod(value) => write!(f, "unknown billing period: `{value}`"),
            Self::EmptySchoolName => write!(f, "school name must not be empty"),
            Self::BillingDayOutOfRange(value) => {
                write!(f, "billing day must be between 1 and 31, got {value}")
            }
        }
    }
}

impl Error for ValidationError {}

/// Trims an optional field down to its meaningful content.
///
/// Blank-or-missing collapses to `None`, so storage never distinguishes
/// "" from absent.
pub(crate) fn non_blank(value: &Option<String>) -> Option<&str> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|trimmed| !trimmed.is_empty())
}
