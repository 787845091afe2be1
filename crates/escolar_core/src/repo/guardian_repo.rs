//! Guardian repository contract and SQLite implementation.
//!
//! # Responsibility
//! - Provide guardian CRUD over the `guardians` table.
//! - Enforce the no-orphaned-students rule on deletion.
//!
//! # Invariants
//! - Write paths call `NewGuardian::validate()` before SQL mutations.
//! - A guardian referenced by any student row is never deleted.
//! - Name/phone/email are stored trimmed; blank optionals become NULL.

use crate::model::guardian::{Guardian, GuardianContact, GuardianId, NewGuardian};
use crate::model::non_blank;
use crate::repo::{ConstraintViolation, EntityKind, LedgerError, LedgerResult};
use rusqlite::{params, Connection, Row};

const GUARDIAN_SELECT_SQL: &str = "SELECT id, name, phone, email, registered_at FROM guardians";

/// Repository interface for guardian operations.
pub trait GuardianRepository {
    fn create_guardian(&self, draft: &NewGuardian) -> LedgerResult<Guardian>;
    fn update_guardian(&self, id: GuardianId, draft: &NewGuardian) -> LedgerResult<Guardian>;
    fn get_guardian(&self, id: GuardianId) -> LedgerResult<Option<Guardian>>;
    /// All guardians ordered by name.
    fn list_guardians(&self) -> LedgerResult<Vec<Guardian>>;
    /// Guardians with a usable phone, for the messaging collaborator.
    fn guardian_contacts(&self) -> LedgerResult<Vec<GuardianContact>>;
    fn delete_guardian(&self, id: GuardianId) -> LedgerResult<()>;
    /// Clears the table; fails while any student still references a row.
    fn delete_all_guardians(&self) -> LedgerResult<usize>;
}

/// SQLite-backed guardian repository.
pub struct SqliteGuardianRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteGuardianRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl GuardianRepository for SqliteGuardianRepository<'_> {
    fn create_guardian(&self, draft: &NewGuardian) -> LedgerResult<Guardian> {
        draft.validate()?;

        self.conn.execute(
            "INSERT INTO guardians (name, phone, email) VALUES (?1, ?2, ?3);",
            params![
                draft.name.trim(),
                non_blank(&draft.phone),
                non_blank(&draft.email),
            ],
        )?;

        load_required_guardian(self.conn, self.conn.last_insert_rowid())
    }

    fn update_guardian(&self, id: GuardianId, draft: &NewGuardian) -> LedgerResult<Guardian> {
        draft.validate()?;

        let changed = self.conn.execute(
            "UPDATE guardians SET name = ?1, phone = ?2, email = ?3 WHERE id = ?4;",
            params![
                draft.name.trim(),
                non_blank(&draft.phone),
                non_blank(&draft.email),
                id,
            ],
        )?;

        if changed == 0 {
            return Err(LedgerError::NotFound {
                entity: EntityKind::Guardian,
                id,
            });
        }

        load_required_guardian(self.conn, id)
    }

    fn get_guardian(&self, id: GuardianId) -> LedgerResult<Option<Guardian>> {
        get_guardian(self.conn, id)
    }

    fn list_guardians(&self) -> LedgerResult<Vec<Guardian>> {
        let mut stmt = self.conn.prepare(&format!(
            "{GUARDIAN_SELECT_SQL} ORDER BY name COLLATE NOCASE ASC, id ASC;"
        ))?;

        let mut rows = stmt.query([])?;
        let mut guardians = Vec::new();
        while let Some(row) = rows.next()? {
            guardians.push(parse_guardian_row(row)?);
        }

        Ok(guardians)
    }

    fn guardian_contacts(&self) -> LedgerResult<Vec<GuardianContact>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, name, phone FROM guardians
             WHERE phone IS NOT NULL AND TRIM(phone) <> ''
             ORDER BY name COLLATE NOCASE ASC, id ASC;",
        )?;

        let mut rows = stmt.query([])?;
        let mut contacts = Vec::new();
        while let Some(row) = rows.next()? {
            contacts.push(GuardianContact {
                guardian_id: row.get("id")?,
                name: row.get("name")?,
                phone: row.get("phone")?,
            });
        }

        Ok(contacts)
    }

    fn delete_guardian(&self, id: GuardianId) -> LedgerResult<()> {
        let student_count = count_students_for(self.conn, id)?;
        if student_count > 0 {
            return Err(LedgerError::Constraint(
                ConstraintViolation::GuardianHasStudents {
                    guardian_id: id,
                    student_count,
                },
            ));
        }

        let changed = self
            .conn
            .execute("DELETE FROM guardians WHERE id = ?1;", [id])?;

        if changed == 0 {
            return Err(LedgerError::NotFound {
                entity: EntityKind::Guardian,
                id,
            });
        }

        Ok(())
    }

    fn delete_all_guardians(&self) -> LedgerResult<usize> {
        let student_count: u32 =
            self.conn
                .query_row("SELECT COUNT(*) FROM students;", [], |row| row.get(0))?;
        if student_count > 0 {
            return Err(LedgerError::Constraint(
                ConstraintViolation::StudentsStillEnrolled { student_count },
            ));
        }

        let removed = self.conn.execute("DELETE FROM guardians;", [])?;
        Ok(removed)
    }
}

pub(crate) fn get_guardian(conn: &Connection, id: GuardianId) -> LedgerResult<Option<Guardian>> {
    let mut stmt = conn.prepare(&format!("{GUARDIAN_SELECT_SQL} WHERE id = ?1;"))?;

    let mut rows = stmt.query([id])?;
    if let Some(row) = rows.next()? {
        return Ok(Some(parse_guardian_row(row)?));
    }

    Ok(None)
}

fn load_required_guardian(conn: &Connection, id: GuardianId) -> LedgerResult<Guardian> {
    get_guardian(conn, id)?.ok_or_else(|| {
        LedgerError::InvalidData(format!("guardian {id} missing right after write"))
    })
}

fn count_students_for(conn: &Connection, guardian_id: GuardianId) -> LedgerResult<u32> {
    let count = conn.query_row(
        "SELECT COUNT(*) FROM students WHERE guardian_id = ?1;",
        [guardian_id],
        |row| row.get(0),
    )?;
    Ok(count)
}

fn parse_guardian_row(row: &Row<'_>) -> LedgerResult<Guardian> {
    Ok(Guardian {
        id: row.get("id")?,
        name: row.get("name")?,
        phone: row.get("phone")?,
        email: row.get("email")?,
        registered_at: row.get("registered_at")?,
    })
}
