//! Payment domain model.
//!
//! # Responsibility
//! - Define the persisted payment record, its creation draft and the
//!   joined read projections for receipts and export.
//!
//! # Invariants
//! - `amount` is strictly positive.
//! - At most one payment row exists per `(student_id, period)` pair.
//! - `paid` is always `true` at creation and is never toggled; a row's
//!   existence is what marks the period as paid.

use crate::model::period::Month;
use crate::model::student::StudentId;
use crate::model::ValidationError;
use serde::{Deserialize, Serialize};

/// Stable identifier for a payment row.
pub type PaymentId = i64;

/// Persisted tuition payment record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentRecord {
    pub id: PaymentId,
    pub student_id: StudentId,
    pub amount: f64,
    pub period: Month,
    /// Carried by the ledger-file format; reports ignore it and treat row
    /// existence as "paid".
    pub paid: bool,
    /// Unix epoch milliseconds, assigned by the store at creation.
    pub paid_at: i64,
}

/// Input draft for recording a payment.
#[derive(Debug, Clone, PartialEq)]
pub struct NewPayment {
    pub student_id: StudentId,
    pub amount: f64,
    pub period: Month,
}

impl NewPayment {
    pub fn new(student_id: StudentId, amount: f64, period: Month) -> Self {
        Self {
            student_id,
            amount,
            period,
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        validate_amount(self.amount)
    }
}

/// Shared amount rule for create and update paths.
pub(crate) fn validate_amount(amount: f64) -> Result<(), ValidationError> {
    if amount > 0.0 {
        Ok(())
    } else {
        Err(ValidationError::NonPositiveAmount(amount))
    }
}

/// Per-student payment line, most recent first.
///
/// Consumed by the receipt collaborator and the delinquency calculator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StudentPayment {
    pub period: Month,
    pub amount: f64,
    pub paid_at: i64,
}

/// Payment history row joined with student identity.
///
/// The fixed-shape record handed to the export collaborator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentRow {
    pub payment_id: PaymentId,
    pub student_id: StudentId,
    pub student_name: String,
    pub grade: String,
    pub amount: f64,
    pub period: Month,
    pub paid: bool,
    pub paid_at: i64,
}

/// Aggregates shown on the dashboard.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardStats {
    pub student_count: u32,
    /// Summed income over the selected billing period.
    pub period_income: f64,
}
