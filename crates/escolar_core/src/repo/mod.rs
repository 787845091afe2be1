//! Repository layer: typed persistence contracts over the ledger schema.
//!
//! # Responsibility
//! - Define the error taxonomy shared by every store operation.
//! - Host the per-entity repository traits and their SQLite implementations.
//!
//! # Invariants
//! - Write paths validate input before SQL mutations.
//! - Read paths reject invalid persisted state instead of masking it.
//! - Validation and constraint errors are recoverable by the caller;
//!   storage errors are surfaced and the operation is abandoned.

use crate::db::DbError;
use crate::model::guardian::GuardianId;
use crate::model::period::Month;
use crate::model::student::StudentId;
use crate::model::ValidationError;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod guardian_repo;
pub mod payment_repo;
pub mod settings_repo;
pub mod student_repo;

pub type LedgerResult<T> = Result<T, LedgerError>;

/// Entity names carried by not-found errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    Guardian,
    Student,
    Payment,
}

impl Display for EntityKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Guardian => "guardian",
            Self::Student => "student",
            Self::Payment => "payment",
        };
        f.write_str(name)
    }
}

/// A dependency or uniqueness rule blocked the mutation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConstraintViolation {
    /// Guardian is still referenced by enrolled students.
    GuardianHasStudents {
        guardian_id: GuardianId,
        student_count: u32,
    },
    /// Bulk guardian deletion attempted while students remain enrolled.
    StudentsStillEnrolled { student_count: u32 },
    /// Same `(name, grade)` pair already enrolled. Advisory
    /// check-then-insert guard, safe under the single-writer model.
    DuplicateEnrollment { name: String, grade: String },
    /// `(student_id, period)` already has a payment row. Enforced by the
    /// unique index, so the check and the insert are one atomic step.
    DuplicatePayment {
        student_id: StudentId,
        period: Month,
    },
}

impl Display for ConstraintViolation {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::GuardianHasStudents {
                guardian_id,
                student_count,
            } => write!(
                f,
                "guardian {guardian_id} still has {student_count} enrolled student(s)"
            ),
            Self::StudentsStillEnrolled { student_count } => write!(
                f,
                "cannot clear guardians while {student_count} student(s) remain enrolled"
            ),
            Self::DuplicateEnrollment { name, grade } => {
                write!(f, "student `{name}` is already enrolled in grade `{grade}`")
            }
            Self::DuplicatePayment { student_id, period } => write!(
                f,
                "student {student_id} already has a payment recorded for {period}"
            ),
        }
    }
}

impl Error for ConstraintViolation {}

/// Failure of any ledger store operation.
#[derive(Debug)]
pub enum LedgerError {
    /// Malformed input; the caller corrects and retries.
    Validation(ValidationError),
    /// A referenced id does not exist.
    NotFound { entity: EntityKind, id: i64 },
    /// A dependency or uniqueness rule blocked the mutation.
    Constraint(ConstraintViolation),
    /// I/O or connection failure; unexpected, never retried automatically.
    Storage(DbError),
    /// Persisted state violates a model invariant.
    InvalidData(String),
}

impl Display for LedgerError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::NotFound { entity, id } => write!(f, "{entity} not found: {id}"),
            Self::Constraint(err) => write!(f, "{err}"),
            Self::Storage(err) => write!(f, "{err}"),
            Self::InvalidData(message) => write!(f, "invalid persisted ledger data: {message}"),
        }
    }
}

impl Error for LedgerError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Constraint(err) => Some(err),
            Self::Storage(err) => Some(err),
            Self::NotFound { .. } => None,
            Self::InvalidData(_) => None,
        }
    }
}

impl From<ValidationError> for LedgerError {
    fn from(value: ValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<DbError> for LedgerError {
    fn from(value: DbError) -> Self {
        Self::Storage(value)
    }
}

impl From<rusqlite::Error> for LedgerError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Storage(DbError::Sqlite(value))
    }
}

/// Matches SQLite's extended unique-constraint code so index violations
/// can be mapped to the typed duplicate errors.
pub(crate) fn is_unique_violation(err: &rusqlite::Error) -> bool {
    matches!(
        err,
        rusqlite::Error::SqliteFailure(failure, _)
            if failure.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE
    )
}
