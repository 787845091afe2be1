//! Student domain model.
//!
//! # Responsibility
//! - Define the persisted student record, its creation draft and the
//!   guardian-joined read projection.
//!
//! # Invariants
//! - Every student references an existing guardian.
//! - Deleting a student removes its payment rows in the same transaction.

use crate::model::guardian::GuardianId;
use crate::model::ValidationError;
use serde::{Deserialize, Serialize};

/// Stable identifier for a student row.
pub type StudentId = i64;

/// Persisted student record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Student {
    pub id: StudentId,
    pub name: String,
    /// Free-form grade label, e.g. `5° Básico`. May be empty.
    pub grade: String,
    pub guardian_id: GuardianId,
    /// Unix epoch milliseconds, assigned by the store at creation.
    pub registered_at: i64,
}

/// Input draft for enrolling or updating a student.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewStudent {
    pub name: String,
    pub grade: String,
    pub guardian_id: GuardianId,
}

impl NewStudent {
    pub fn new(name: impl Into<String>, grade: impl Into<String>, guardian_id: GuardianId) -> Self {
        Self {
            name: name.into(),
            grade: grade.into(),
            guardian_id,
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.name.trim().is_empty() {
            return Err(ValidationError::EmptyStudentName);
        }
        Ok(())
    }
}

/// Student joined with guardian contact fields.
///
/// The fixed-shape listing row handed to report/messaging collaborators.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StudentWithGuardian {
    pub student_id: StudentId,
    pub name: String,
    pub grade: String,
    pub registered_at: i64,
    pub guardian_id: GuardianId,
    pub guardian_name: String,
    pub guardian_phone: Option<String>,
    pub guardian_email: Option<String>,
}

/// Per-grade headcount for the dashboard collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GradeCount {
    pub grade: String,
    pub students: u32,
}
