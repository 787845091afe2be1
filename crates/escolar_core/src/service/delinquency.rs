//! Arrears computation over ledger reads.
//!
//! # Responsibility
//! - Derive which billing periods a student owes, given the academic
//!   cycle start and the billing cutoff day.
//! - Produce the delinquency report rows for collaborators.
//!
//! # Invariants
//! - Pure functions: no mutation, no clock access; callers supply `today`.
//! - Debt is always a subset of the required periods, in required order.
//! - A student enrolled mid-cycle still owes all periods from cycle
//!   start; there is no partial-enrollment exemption.

use crate::model::period::Month;
use crate::model::student::{StudentId, StudentWithGuardian};
use crate::repo::LedgerResult;
use crate::store::LedgerStore;
use chrono::{Datelike, NaiveDate};
use log::info;
use std::collections::HashMap;

/// One delinquent-student row for the report surface.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DelinquentStudent {
    pub student_id: StudentId,
    pub student_name: String,
    pub grade: String,
    pub guardian_name: String,
    pub guardian_phone: Option<String>,
    /// Owed periods, oldest first. Never empty in a report row.
    pub owed_periods: Vec<Month>,
}

impl DelinquentStudent {
    /// Owed periods joined for display, oldest first.
    pub fn owed_label(&self) -> String {
        self.owed_periods
            .iter()
            .map(|month| month.label())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// Billing period the scan runs against, derived from the calendar.
///
/// Before the cutoff day the current month is not yet due, so the
/// previous month is used instead. In January that underflows the year:
/// the result is `None` and nothing is due yet.
pub fn reference_month(today: NaiveDate, billing_day: u8) -> Option<Month> {
    let mut index = today.month0() as usize;
    if today.day() < u32::from(billing_day) {
        if index == 0 {
            return None;
        }
        index -= 1;
    }
    Month::from_index(index)
}

/// Canonical month sequence from cycle start through `reference`,
/// inclusive. Empty when the reference predates the cycle start: no
/// obligations exist before the academic cycle begins.
pub fn required_periods(cycle_start: Month, reference: Month) -> &'static [Month] {
    if reference.index() < cycle_start.index() {
        return &[];
    }
    &Month::ALL[cycle_start.index()..=reference.index()]
}

/// Required periods minus the paid ones, preserving required order.
pub fn debt_for(required: &[Month], paid: &[Month]) -> Vec<Month> {
    required
        .iter()
        .copied()
        .filter(|month| !paid.contains(month))
        .collect()
}

/// Pure report assembly over pre-read slices.
///
/// Includes only students with non-empty debt; zero-debt students are
/// excluded rather than marked "paid". Row order follows the student
/// listing order (grade, then name).
pub fn delinquency_report(
    students: &[StudentWithGuardian],
    payment_periods: &[(StudentId, Month)],
    required: &[Month],
) -> Vec<DelinquentStudent> {
    if required.is_empty() {
        return Vec::new();
    }

    let mut paid_by_student: HashMap<StudentId, Vec<Month>> = HashMap::new();
    for (student_id, period) in payment_periods {
        paid_by_student.entry(*student_id).or_default().push(*period);
    }

    let mut rows = Vec::new();
    for student in students {
        let paid = paid_by_student
            .get(&student.student_id)
            .map(Vec::as_slice)
            .unwrap_or(&[]);

        let owed_periods = debt_for(required, paid);
        if owed_periods.is_empty() {
            continue;
        }

        rows.push(DelinquentStudent {
            student_id: student.student_id,
            student_name: student.name.clone(),
            grade: student.grade.clone(),
            guardian_name: student.guardian_name.clone(),
            guardian_phone: student.guardian_phone.clone(),
            owed_periods,
        });
    }

    rows
}

/// Reads the whole ledger once and assembles the report.
pub fn scan_ledger(
    store: &LedgerStore,
    required: &[Month],
) -> LedgerResult<Vec<DelinquentStudent>> {
    let students = store.list_students()?;
    let payment_periods = store.all_payment_periods()?;
    let rows = delinquency_report(&students, &payment_periods, required);

    info!(
        "event=delinquency_scan module=delinquency status=ok students={} required={} delinquent={}",
        students.len(),
        required.len(),
        rows.len()
    );

    Ok(rows)
}

/// Owed periods for a single student.
pub fn student_debt(
    store: &LedgerStore,
    student_id: StudentId,
    required: &[Month],
) -> LedgerResult<Vec<Month>> {
    let payments = store.payments_for_student(student_id)?;
    let paid: Vec<Month> = payments.iter().map(|payment| payment.period).collect();
    Ok(debt_for(required, &paid))
}
