//! Payment repository contract and SQLite implementation.
//!
//! # Responsibility
//! - Record and query tuition payments over the `payments` table.
//! - Map unique-index violations to the typed duplicate-payment error.
//!
//! # Invariants
//! - Write paths validate the amount before SQL mutations.
//! - The `(student_id, period)` unique index is the duplicate guard; the
//!   check and the insert are one atomic step.
//! - Periods are stored as canonical labels and re-parsed on read; rows
//!   holding unknown labels are rejected as invalid data.

use crate::model::payment::{
    validate_amount, NewPayment, PaymentId, PaymentRecord, PaymentRow, StudentPayment,
};
use crate::model::period::Month;
use crate::model::student::StudentId;
use crate::repo::{
    is_unique_violation, ConstraintViolation, EntityKind, LedgerError, LedgerResult,
};
use rusqlite::{params, Connection, Row};

const PAYMENT_SELECT_SQL: &str =
    "SELECT id, student_id, amount, period, paid, paid_at FROM payments";

const HISTORY_SELECT_SQL: &str = "SELECT
    p.id AS payment_id,
    p.student_id AS student_id,
    s.name AS student_name,
    s.grade AS grade,
    p.amount AS amount,
    p.period AS period,
    p.paid AS paid,
    p.paid_at AS paid_at
FROM payments p
JOIN students s ON s.id = p.student_id";

/// Repository interface for payment operations.
pub trait PaymentRepository {
    /// Records one payment; duplicates per `(student, period)` fail.
    fn record_payment(&self, draft: &NewPayment) -> LedgerResult<PaymentRecord>;
    /// Rewrites amount and period of an existing payment.
    fn update_payment(
        &self,
        id: PaymentId,
        amount: f64,
        period: Month,
    ) -> LedgerResult<PaymentRecord>;
    fn delete_payment(&self, id: PaymentId) -> LedgerResult<()>;
    /// Payment lines for one student, most recent first.
    fn payments_for_student(&self, student_id: StudentId) -> LedgerResult<Vec<StudentPayment>>;
    /// Every `(student, period)` pair, for bulk delinquency scans.
    fn all_payment_periods(&self) -> LedgerResult<Vec<(StudentId, Month)>>;
    /// Full history joined with student identity, most recent first.
    fn payment_history(&self) -> LedgerResult<Vec<PaymentRow>>;
    /// History filtered by student-name substring, same ordering.
    fn search_payments(&self, term: &str) -> LedgerResult<Vec<PaymentRow>>;
    /// One joined history row, for receipt generation.
    fn payment_detail(&self, id: PaymentId) -> LedgerResult<Option<PaymentRow>>;
    /// Summed income over one billing period.
    fn income_for_period(&self, period: Month) -> LedgerResult<f64>;
    fn delete_all_payments(&self) -> LedgerResult<usize>;
}

/// SQLite-backed payment repository.
pub struct SqlitePaymentRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqlitePaymentRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl PaymentRepository for SqlitePaymentRepository<'_> {
    fn record_payment(&self, draft: &NewPayment) -> LedgerResult<PaymentRecord> {
        draft.validate()?;

        if !student_exists(self.conn, draft.student_id)? {
            return Err(LedgerError::NotFound {
                entity: EntityKind::Student,
                id: draft.student_id,
            });
        }

        let inserted = self.conn.execute(
            "INSERT INTO payments (student_id, amount, period) VALUES (?1, ?2, ?3);",
            params![draft.student_id, draft.amount, draft.period.label()],
        );

        match inserted {
            Ok(_) => load_required_payment(self.conn, self.conn.last_insert_rowid()),
            Err(err) if is_unique_violation(&err) => Err(LedgerError::Constraint(
                ConstraintViolation::DuplicatePayment {
                    student_id: draft.student_id,
                    period: draft.period,
                },
            )),
            Err(err) => Err(err.into()),
        }
    }

    fn update_payment(
        &self,
        id: PaymentId,
        amount: f64,
        period: Month,
    ) -> LedgerResult<PaymentRecord> {
        validate_amount(amount)?;

        let existing = get_payment(self.conn, id)?.ok_or(LedgerError::NotFound {
            entity: EntityKind::Payment,
            id,
        })?;

        let updated = self.conn.execute(
            "UPDATE payments SET amount = ?1, period = ?2 WHERE id = ?3;",
            params![amount, period.label(), id],
        );

        match updated {
            Ok(_) => load_required_payment(self.conn, id),
            Err(err) if is_unique_violation(&err) => Err(LedgerError::Constraint(
                ConstraintViolation::DuplicatePayment {
                    student_id: existing.student_id,
                    period,
                },
            )),
            Err(err) => Err(err.into()),
        }
    }

    fn delete_payment(&self, id: PaymentId) -> LedgerResult<()> {
        let changed = self
            .conn
            .execute("DELETE FROM payments WHERE id = ?1;", [id])?;

        if changed == 0 {
            return Err(LedgerError::NotFound {
                entity: EntityKind::Payment,
                id,
            });
        }

        Ok(())
    }

    fn payments_for_student(&self, student_id: StudentId) -> LedgerResult<Vec<StudentPayment>> {
        let mut stmt = self.conn.prepare(
            "SELECT period, amount, paid_at FROM payments
             WHERE student_id = ?1
             ORDER BY id DESC;",
        )?;

        let mut rows = stmt.query([student_id])?;
        let mut payments = Vec::new();
        while let Some(row) = rows.next()? {
            let period_text: String = row.get("period")?;
            payments.push(StudentPayment {
                period: parse_period_text(&period_text)?,
                amount: row.get("amount")?,
                paid_at: row.get("paid_at")?,
            });
        }

        Ok(payments)
    }

    fn all_payment_periods(&self) -> LedgerResult<Vec<(StudentId, Month)>> {
        let mut stmt = self
            .conn
            .prepare("SELECT student_id, period FROM payments;")?;

        let mut rows = stmt.query([])?;
        let mut pairs = Vec::new();
        while let Some(row) = rows.next()? {
            let student_id: StudentId = row.get("student_id")?;
            let period_text: String = row.get("period")?;
            pairs.push((student_id, parse_period_text(&period_text)?));
        }

        Ok(pairs)
    }

    fn payment_history(&self) -> LedgerResult<Vec<PaymentRow>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{HISTORY_SELECT_SQL} ORDER BY p.id DESC;"))?;

        let mut rows = stmt.query([])?;
        let mut history = Vec::new();
        while let Some(row) = rows.next()? {
            history.push(parse_history_row(row)?);
        }

        Ok(history)
    }

    fn search_payments(&self, term: &str) -> LedgerResult<Vec<PaymentRow>> {
        let mut stmt = self.conn.prepare(&format!(
            "{HISTORY_SELECT_SQL} WHERE s.name LIKE ?1 ORDER BY p.id DESC;"
        ))?;

        let pattern = format!("%{}%", term.trim());
        let mut rows = stmt.query([pattern])?;
        let mut history = Vec::new();
        while let Some(row) = rows.next()? {
            history.push(parse_history_row(row)?);
        }

        Ok(history)
    }

    fn payment_detail(&self, id: PaymentId) -> LedgerResult<Option<PaymentRow>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{HISTORY_SELECT_SQL} WHERE p.id = ?1;"))?;

        let mut rows = stmt.query([id])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_history_row(row)?));
        }

        Ok(None)
    }

    fn income_for_period(&self, period: Month) -> LedgerResult<f64> {
        let income = self.conn.query_row(
            "SELECT COALESCE(SUM(amount), 0.0) FROM payments WHERE period = ?1;",
            [period.label()],
            |row| row.get(0),
        )?;
        Ok(income)
    }

    fn delete_all_payments(&self) -> LedgerResult<usize> {
        let removed = self.conn.execute("DELETE FROM payments;", [])?;
        Ok(removed)
    }
}

fn student_exists(conn: &Connection, id: StudentId) -> LedgerResult<bool> {
    let exists: i64 = conn.query_row(
        "SELECT EXISTS(SELECT 1 FROM students WHERE id = ?1);",
        [id],
        |row| row.get(0),
    )?;
    Ok(exists != 0)
}

fn get_payment(conn: &Connection, id: PaymentId) -> LedgerResult<Option<PaymentRecord>> {
    let mut stmt = conn.prepare(&format!("{PAYMENT_SELECT_SQL} WHERE id = ?1;"))?;

    let mut rows = stmt.query([id])?;
    if let Some(row) = rows.next()? {
        return Ok(Some(parse_payment_row(row)?));
    }

    Ok(None)
}

fn load_required_payment(conn: &Connection, id: PaymentId) -> LedgerResult<PaymentRecord> {
    get_payment(conn, id)?
        .ok_or_else(|| LedgerError::InvalidData(format!("payment {id} missing right after write")))
}

fn parse_payment_row(row: &Row<'_>) -> LedgerResult<PaymentRecord> {
    let period_text: String = row.get("period")?;

    Ok(PaymentRecord {
        id: row.get("id")?,
        student_id: row.get("student_id")?,
        amount: row.get("amount")?,
        period: parse_period_text(&period_text)?,
        paid: parse_paid_flag(row.get("paid")?)?,
        paid_at: row.get("paid_at")?,
    })
}

fn parse_history_row(row: &Row<'_>) -> LedgerResult<PaymentRow> {
    let period_text: String = row.get("period")?;

    Ok(PaymentRow {
        payment_id: row.get("payment_id")?,
        student_id: row.get("student_id")?,
        student_name: row.get("student_name")?,
        grade: row.get("grade")?,
        amount: row.get("amount")?,
        period: parse_period_text(&period_text)?,
        paid: parse_paid_flag(row.get("paid")?)?,
        paid_at: row.get("paid_at")?,
    })
}

fn parse_period_text(value: &str) -> LedgerResult<Month> {
    Month::parse(value).ok_or_else(|| {
        LedgerError::InvalidData(format!(
            "invalid billing period `{value}` in payments.period"
        ))
    })
}

fn parse_paid_flag(value: i64) -> LedgerResult<bool> {
    match value {
        0 => Ok(false),
        1 => Ok(true),
        other => Err(LedgerError::InvalidData(format!(
            "invalid paid value `{other}` in payments.paid"
        ))),
    }
}
