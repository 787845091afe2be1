//! Student repository contract and SQLite implementation.
//!
//! # Responsibility
//! - Provide student CRUD plus the guardian-joined listing projections.
//! - Own the payment-cascade deletion logic with atomic semantics.
//!
//! # Invariants
//! - Every student write verifies the referenced guardian exists.
//! - Deleting a student removes its payments in the same transaction;
//!   both steps succeed or neither does.
//! - Listings are ordered by grade, then name (case-insensitive), then id.

use crate::model::guardian::GuardianId;
use crate::model::student::{GradeCount, NewStudent, Student, StudentId, StudentWithGuardian};
use crate::repo::{ConstraintViolation, EntityKind, LedgerError, LedgerResult};
use rusqlite::{params, Connection, Row, TransactionBehavior};

const STUDENT_SELECT_SQL: &str =
    "SELECT id, name, grade, guardian_id, registered_at FROM students";

const JOINED_SELECT_SQL: &str = "SELECT
    s.id AS student_id,
    s.name AS name,
    s.grade AS grade,
    s.registered_at AS registered_at,
    s.guardian_id AS guardian_id,
    g.name AS guardian_name,
    g.phone AS guardian_phone,
    g.email AS guardian_email
FROM students s
JOIN guardians g ON g.id = s.guardian_id";

const JOINED_ORDER_SQL: &str =
    "ORDER BY s.grade COLLATE NOCASE ASC, s.name COLLATE NOCASE ASC, s.id ASC";

/// Repository interface for student operations.
pub trait StudentRepository {
    /// Enrolls a student; rejects an identical `(name, grade)` pair.
    fn enroll_student(&self, draft: &NewStudent) -> LedgerResult<Student>;
    fn update_student(&self, id: StudentId, draft: &NewStudent) -> LedgerResult<Student>;
    fn get_student(&self, id: StudentId) -> LedgerResult<Option<Student>>;
    /// One student joined with guardian contact fields.
    fn student_with_guardian(&self, id: StudentId) -> LedgerResult<Option<StudentWithGuardian>>;
    /// All students joined with their guardians, grade/name ordering.
    fn list_students_with_guardian(&self) -> LedgerResult<Vec<StudentWithGuardian>>;
    /// Case-insensitive substring match on student name, same ordering.
    fn search_students(&self, term: &str) -> LedgerResult<Vec<StudentWithGuardian>>;
    fn count_students(&self) -> LedgerResult<u32>;
    /// Per-grade headcounts ordered by grade.
    fn students_per_grade(&self) -> LedgerResult<Vec<GradeCount>>;
    /// Removes the student and all of its payments in one transaction.
    fn delete_student(&mut self, id: StudentId) -> LedgerResult<()>;
    /// Clears students and every payment row in one transaction.
    fn delete_all_students(&mut self) -> LedgerResult<usize>;
}

/// SQLite-backed student repository.
///
/// Holds a mutable connection borrow because the cascade deletes run
/// inside an immediate transaction.
pub struct SqliteStudentRepository<'conn> {
    conn: &'conn mut Connection,
}

impl<'conn> SqliteStudentRepository<'conn> {
    pub fn new(conn: &'conn mut Connection) -> Self {
        Self { conn }
    }
}

impl StudentRepository for SqliteStudentRepository<'_> {
    fn enroll_student(&self, draft: &NewStudent) -> LedgerResult<Student> {
        draft.validate()?;

        if !guardian_exists(self.conn, draft.guardian_id)? {
            return Err(LedgerError::NotFound {
                entity: EntityKind::Guardian,
                id: draft.guardian_id,
            });
        }

        let name = draft.name.trim();
        let grade = draft.grade.trim();
        if enrollment_exists(self.conn, name, grade)? {
            return Err(LedgerError::Constraint(
                ConstraintViolation::DuplicateEnrollment {
                    name: name.to_string(),
                    grade: grade.to_string(),
                },
            ));
        }

        self.conn.execute(
            "INSERT INTO students (name, grade, guardian_id) VALUES (?1, ?2, ?3);",
            params![name, grade, draft.guardian_id],
        )?;

        load_required_student(self.conn, self.conn.last_insert_rowid())
    }

    fn update_student(&self, id: StudentId, draft: &NewStudent) -> LedgerResult<Student> {
        draft.validate()?;

        if !guardian_exists(self.conn, draft.guardian_id)? {
            return Err(LedgerError::NotFound {
                entity: EntityKind::Guardian,
                id: draft.guardian_id,
            });
        }

        let changed = self.conn.execute(
            "UPDATE students SET name = ?1, grade = ?2, guardian_id = ?3 WHERE id = ?4;",
            params![draft.name.trim(), draft.grade.trim(), draft.guardian_id, id],
        )?;

        if changed == 0 {
            return Err(LedgerError::NotFound {
                entity: EntityKind::Student,
                id,
            });
        }

        load_required_student(self.conn, id)
    }

    fn get_student(&self, id: StudentId) -> LedgerResult<Option<Student>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{STUDENT_SELECT_SQL} WHERE id = ?1;"))?;

        let mut rows = stmt.query([id])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_student_row(row)?));
        }

        Ok(None)
    }

    fn student_with_guardian(&self, id: StudentId) -> LedgerResult<Option<StudentWithGuardian>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{JOINED_SELECT_SQL} WHERE s.id = ?1;"))?;

        let mut rows = stmt.query([id])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_joined_row(row)?));
        }

        Ok(None)
    }

    fn list_students_with_guardian(&self) -> LedgerResult<Vec<StudentWithGuardian>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{JOINED_SELECT_SQL} {JOINED_ORDER_SQL};"))?;

        let mut rows = stmt.query([])?;
        let mut students = Vec::new();
        while let Some(row) = rows.next()? {
            students.push(parse_joined_row(row)?);
        }

        Ok(students)
    }

    fn search_students(&self, term: &str) -> LedgerResult<Vec<StudentWithGuardian>> {
        let mut stmt = self.conn.prepare(&format!(
            "{JOINED_SELECT_SQL} WHERE s.name LIKE ?1 {JOINED_ORDER_SQL};"
        ))?;

        let pattern = format!("%{}%", term.trim());
        let mut rows = stmt.query([pattern])?;
        let mut students = Vec::new();
        while let Some(row) = rows.next()? {
            students.push(parse_joined_row(row)?);
        }

        Ok(students)
    }

    fn count_students(&self) -> LedgerResult<u32> {
        let count = self
            .conn
            .query_row("SELECT COUNT(*) FROM students;", [], |row| row.get(0))?;
        Ok(count)
    }

    fn students_per_grade(&self) -> LedgerResult<Vec<GradeCount>> {
        let mut stmt = self.conn.prepare(
            "SELECT grade, COUNT(*) AS students FROM students
             GROUP BY grade
             ORDER BY grade COLLATE NOCASE ASC;",
        )?;

        let mut rows = stmt.query([])?;
        let mut counts = Vec::new();
        while let Some(row) = rows.next()? {
            counts.push(GradeCount {
                grade: row.get("grade")?,
                students: row.get("students")?,
            });
        }

        Ok(counts)
    }

    fn delete_student(&mut self, id: StudentId) -> LedgerResult<()> {
        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;

        tx.execute("DELETE FROM payments WHERE student_id = ?1;", [id])?;
        let changed = tx.execute("DELETE FROM students WHERE id = ?1;", [id])?;
        if changed == 0 {
            // Dropping the uncommitted transaction rolls the cascade back.
            return Err(LedgerError::NotFound {
                entity: EntityKind::Student,
                id,
            });
        }

        tx.commit()?;
        Ok(())
    }

    fn delete_all_students(&mut self) -> LedgerResult<usize> {
        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;

        tx.execute("DELETE FROM payments;", [])?;
        let removed = tx.execute("DELETE FROM students;", [])?;
        tx.commit()?;

        Ok(removed)
    }
}

fn guardian_exists(conn: &Connection, id: GuardianId) -> LedgerResult<bool> {
    let exists: i64 = conn.query_row(
        "SELECT EXISTS(SELECT 1 FROM guardians WHERE id = ?1);",
        [id],
        |row| row.get(0),
    )?;
    Ok(exists != 0)
}

fn enrollment_exists(conn: &Connection, name: &str, grade: &str) -> LedgerResult<bool> {
    let exists: i64 = conn.query_row(
        "SELECT EXISTS(SELECT 1 FROM students WHERE name = ?1 AND grade = ?2);",
        params![name, grade],
        |row| row.get(0),
    )?;
    Ok(exists != 0)
}

fn load_required_student(conn: &Connection, id: StudentId) -> LedgerResult<Student> {
    let mut stmt = conn.prepare(&format!("{STUDENT_SELECT_SQL} WHERE id = ?1;"))?;

    let mut rows = stmt.query([id])?;
    if let Some(row) = rows.next()? {
        return parse_student_row(row);
    }

    Err(LedgerError::InvalidData(format!(
        "student {id} missing right after write"
    )))
}

fn parse_student_row(row: &Row<'_>) -> LedgerResult<Student> {
    Ok(Student {
        id: row.get("id")?,
        name: row.get("name")?,
        grade: row.get("grade")?,
        guardian_id: row.get("guardian_id")?,
        registered_at: row.get("registered_at")?,
    })
}

fn parse_joined_row(row: &Row<'_>) -> LedgerResult<StudentWithGuardian> {
    Ok(StudentWithGuardian {
        student_id: row.get("student_id")?,
        name: row.get("name")?,
        grade: row.get("grade")?,
        registered_at: row.get("registered_at")?,
        guardian_id: row.get("guardian_id")?,
        guardian_name: row.get("guardian_name")?,
        guardian_phone: row.get("guardian_phone")?,
        guardian_email: row.get("guardian_email")?,
    })
}
