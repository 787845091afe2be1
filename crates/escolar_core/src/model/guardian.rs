//! Guardian domain model.
//!
//! # Responsibility
//! - Define the persisted guardian record and its creation draft.
//! - Validate guardian input before it reaches storage.
//!
//! # Invariants
//! - `id` is store-assigned, monotonically increasing and never reused.
//! - A guardian with enrolled students cannot be deleted.

use crate::model::{non_blank, ValidationError};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

static EMAIL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[a-zA-Z0-9_.+-]+@[a-zA-Z0-9-]+\.[a-zA-Z0-9-.]+$").expect("valid email regex")
});

/// Stable identifier for a guardian row.
///
/// Kept as a type alias to make semantic intent explicit in signatures.
pub type GuardianId = i64;

/// Persisted guardian record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Guardian {
    pub id: GuardianId,
    pub name: String,
    /// Free-form contact phone; blank input collapses to `None`.
    pub phone: Option<String>,
    /// Must match the `local@domain.tld` shape when present.
    pub email: Option<String>,
    /// Unix epoch milliseconds, assigned by the store at creation.
    pub registered_at: i64,
}

/// Input draft for creating or updating a guardian.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewGuardian {
    pub name: String,
    pub phone: Option<String>,
    pub email: Option<String>,
}

impl NewGuardian {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            phone: None,
            email: None,
        }
    }

    /// Checks the draft before any SQL mutation.
    ///
    /// Phone is intentionally not format-checked: contact numbers arrive in
    /// too many regional shapes, and the messaging collaborator copes.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.name.trim().is_empty() {
            return Err(ValidationError::EmptyGuardianName);
        }
        if let Some(email) = non_blank(&self.email) {
            if !EMAIL_RE.is_match(email) {
                return Err(ValidationError::InvalidEmail(email.to_string()));
            }
        }
        Ok(())
    }
}

/// Contact row consumed by the messaging collaborator.
///
/// Only guardians with a usable phone appear in this projection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GuardianContact {
    pub guardian_id: GuardianId,
    pub name: String,
    pub phone: String,
}
