//! One-connection-per-operation facade over the ledger repositories.
//!
//! # Responsibility
//! - Bind one ledger file and expose every read/write operation on it.
//! - Keep connection lifetime inside each operation (single-writer model).
//!
//! # Invariants
//! - `open` fully migrates the file before the store is handed out.
//! - No connection outlives a single operation; every write commits on
//!   its own connection and is immediately durable.

use crate::db::open_db;
use crate::model::guardian::{Guardian, GuardianContact, GuardianId, NewGuardian};
use crate::model::payment::{
    DashboardStats, NewPayment, PaymentId, PaymentRecord, PaymentRow, StudentPayment,
};
use crate::model::period::Month;
use crate::model::settings::SchoolSettings;
use crate::model::student::{GradeCount, NewStudent, Student, StudentId, StudentWithGuardian};
use crate::repo::guardian_repo::{GuardianRepository, SqliteGuardianRepository};
use crate::repo::payment_repo::{PaymentRepository, SqlitePaymentRepository};
use crate::repo::settings_repo::{SettingsRepository, SqliteSettingsRepository};
use crate::repo::student_repo::{SqliteStudentRepository, StudentRepository};
use crate::repo::LedgerResult;
use rusqlite::Connection;
use std::path::{Path, PathBuf};

/// Handle to one ledger file.
///
/// The store owns only the path. Every operation opens a connection,
/// performs its work and closes it, so a `LedgerStore` can be dropped or
/// replaced (ledger switch) without tracking connection state.
pub struct LedgerStore {
    path: PathBuf,
}

impl LedgerStore {
    /// Opens (creating if absent) and migrates the ledger at `path`.
    pub fn open(path: impl AsRef<Path>) -> LedgerResult<Self> {
        let path = path.as_ref().to_path_buf();
        // Migrate eagerly so later per-operation opens find a ready schema.
        open_db(&path)?;
        Ok(Self { path })
    }

    /// Ledger file backing this store.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn connection(&self) -> LedgerResult<Connection> {
        Ok(open_db(&self.path)?)
    }

    pub fn create_guardian(&self, draft: &NewGuardian) -> LedgerResult<Guardian> {
        let conn = self.connection()?;
        SqliteGuardianRepository::new(&conn).create_guardian(draft)
    }

    pub fn update_guardian(&self, id: GuardianId, draft: &NewGuardian) -> LedgerResult<Guardian> {
        let conn = self.connection()?;
        SqliteGuardianRepository::new(&conn).update_guardian(id, draft)
    }

    pub fn get_guardian(&self, id: GuardianId) -> LedgerResult<Option<Guardian>> {
        let conn = self.connection()?;
        SqliteGuardianRepository::new(&conn).get_guardian(id)
    }

    pub fn list_guardians(&self) -> LedgerResult<Vec<Guardian>> {
        let conn = self.connection()?;
        SqliteGuardianRepository::new(&conn).list_guardians()
    }

    /// Guardians with a usable phone, for the messaging collaborator.
    pub fn guardian_contacts(&self) -> LedgerResult<Vec<GuardianContact>> {
        let conn = self.connection()?;
        SqliteGuardianRepository::new(&conn).guardian_contacts()
    }

    /// Fails while any student still references the guardian.
    pub fn delete_guardian(&self, id: GuardianId) -> LedgerResult<()> {
        let conn = self.connection()?;
        SqliteGuardianRepository::new(&conn).delete_guardian(id)
    }

    pub fn delete_all_guardians(&self) -> LedgerResult<usize> {
        let conn = self.connection()?;
        SqliteGuardianRepository::new(&conn).delete_all_guardians()
    }

    pub fn enroll_student(&self, draft: &NewStudent) -> LedgerResult<Student> {
        let mut conn = self.connection()?;
        SqliteStudentRepository::new(&mut conn).enroll_student(draft)
    }

    pub fn update_student(&self, id: StudentId, draft: &NewStudent) -> LedgerResult<Student> {
        let mut conn = self.connection()?;
        SqliteStudentRepository::new(&mut conn).update_student(id, draft)
    }

    pub fn get_student(&self, id: StudentId) -> LedgerResult<Option<Student>> {
        let mut conn = self.connection()?;
        SqliteStudentRepository::new(&mut conn).get_student(id)
    }

    pub fn student_with_guardian(
        &self,
        id: StudentId,
    ) -> LedgerResult<Option<StudentWithGuardian>> {
        let mut conn = self.connection()?;
        SqliteStudentRepository::new(&mut conn).student_with_guardian(id)
    }

    /// All students joined with their guardians, ordered by grade then name.
    pub fn list_students(&self) -> LedgerResult<Vec<StudentWithGuardian>> {
        let mut conn = self.connection()?;
        SqliteStudentRepository::new(&mut conn).list_students_with_guardian()
    }

    /// Case-insensitive substring search on student name.
    pub fn search_students(&self, term: &str) -> LedgerResult<Vec<StudentWithGuardian>> {
        let mut conn = self.connection()?;
        SqliteStudentRepository::new(&mut conn).search_students(term)
    }

    pub fn students_per_grade(&self) -> LedgerResult<Vec<GradeCount>> {
        let mut conn = self.connection()?;
        SqliteStudentRepository::new(&mut conn).students_per_grade()
    }

    /// Removes the student and its payments in one transaction.
    pub fn delete_student(&self, id: StudentId) -> LedgerResult<()> {
        let mut conn = self.connection()?;
        SqliteStudentRepository::new(&mut conn).delete_student(id)
    }

    pub fn delete_all_students(&self) -> LedgerResult<usize> {
        let mut conn = self.connection()?;
        SqliteStudentRepository::new(&mut conn).delete_all_students()
    }

    pub fn record_payment(&self, draft: &NewPayment) -> LedgerResult<PaymentRecord> {
        let conn = self.connection()?;
        SqlitePaymentRepository::new(&conn).record_payment(draft)
    }

    pub fn update_payment(
        &self,
        id: PaymentId,
        amount: f64,
        period: Month,
    ) -> LedgerResult<PaymentRecord> {
        let conn = self.connection()?;
        SqlitePaymentRepository::new(&conn).update_payment(id, amount, period)
    }

    pub fn delete_payment(&self, id: PaymentId) -> LedgerResult<()> {
        let conn = self.connection()?;
        SqlitePaymentRepository::new(&conn).delete_payment(id)
    }

    /// Payment lines for one student, most recent first.
    pub fn payments_for_student(&self, student_id: StudentId) -> LedgerResult<Vec<StudentPayment>> {
        let conn = self.connection()?;
        SqlitePaymentRepository::new(&conn).payments_for_student(student_id)
    }

    /// Every `(student, period)` pair, for bulk delinquency scans.
    pub fn all_payment_periods(&self) -> LedgerResult<Vec<(StudentId, Month)>> {
        let conn = self.connection()?;
        SqlitePaymentRepository::new(&conn).all_payment_periods()
    }

    pub fn payment_history(&self) -> LedgerResult<Vec<PaymentRow>> {
        let conn = self.connection()?;
        SqlitePaymentRepository::new(&conn).payment_history()
    }

    pub fn search_payments(&self, term: &str) -> LedgerResult<Vec<PaymentRow>> {
        let conn = self.connection()?;
        SqlitePaymentRepository::new(&conn).search_payments(term)
    }

    pub fn payment_detail(&self, id: PaymentId) -> LedgerResult<Option<PaymentRow>> {
        let conn = self.connection()?;
        SqlitePaymentRepository::new(&conn).payment_detail(id)
    }

    pub fn delete_all_payments(&self) -> LedgerResult<usize> {
        let conn = self.connection()?;
        SqlitePaymentRepository::new(&conn).delete_all_payments()
    }

    /// Headcount plus summed income for the selected period.
    pub fn dashboard_stats(&self, period: Month) -> LedgerResult<DashboardStats> {
        let mut conn = self.connection()?;
        let student_count = SqliteStudentRepository::new(&mut conn).count_students()?;
        let period_income = SqlitePaymentRepository::new(&conn).income_for_period(period)?;
        Ok(DashboardStats {
            student_count,
            period_income,
        })
    }

    pub fn setting(&self, key: &str) -> LedgerResult<Option<String>> {
        let conn = self.connection()?;
        SqliteSettingsRepository::new(&conn).get_setting(key)
    }

    pub fn set_setting(&self, key: &str, value: &str) -> LedgerResult<()> {
        let conn = self.connection()?;
        SqliteSettingsRepository::new(&conn).set_setting(key, value)
    }

    /// Typed snapshot of the school settings, defaults applied.
    pub fn school_settings(&self) -> LedgerResult<SchoolSettings> {
        let conn = self.connection()?;
        SqliteSettingsRepository::new(&conn).school_settings()
    }

    pub fn save_school_settings(&self, settings: &SchoolSettings) -> LedgerResult<()> {
        let conn = self.connection()?;
        SqliteSettingsRepository::new(&conn).save_school_settings(settings)
    }
}
