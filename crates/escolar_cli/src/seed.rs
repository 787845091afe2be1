//! Deterministic demo-data seeding.
//!
//! # Responsibility
//! - Populate an empty ledger with a small, reproducible data set so the
//!   read surfaces have something to show.

use escolar_core::{LedgerStore, Month, NewGuardian, NewPayment, NewStudent};

const GUARDIANS: [&str; 5] = [
    "Juan Perez",
    "Maria Gomez",
    "Pedro Rodriguez",
    "Ana Fernandez",
    "Luis Lopez",
];

const STUDENTS: [(&str, &str); 15] = [
    ("Sofia Perez", "1° Básico"),
    ("Carlos Gomez", "1° Básico"),
    ("Lucia Rodriguez", "2° Básico"),
    ("Diego Fernandez", "2° Básico"),
    ("Valentina Lopez", "3° Básico"),
    ("Juan Martinez", "3° Básico"),
    ("Maria Gonzalez", "4° Básico"),
    ("Pedro Sanchez", "4° Básico"),
    ("Ana Perez", "5° Básico"),
    ("Luis Gomez", "5° Básico"),
    ("Sofia Rodriguez", "1° Medio"),
    ("Carlos Fernandez", "1° Medio"),
    ("Lucia Lopez", "2° Medio"),
    ("Diego Martinez", "2° Medio"),
    ("Valentina Gonzalez", "2° Medio"),
];

const AMOUNTS: [f64; 3] = [50000.0, 60000.0, 75000.0];

/// Seeds guardians, students and a staggered payment spread into an
/// empty ledger. A ledger that already has students is left untouched.
pub fn seed(store: &LedgerStore) -> Result<String, String> {
    let existing = store.list_students().map_err(|err| err.to_string())?;
    if !existing.is_empty() {
        return Ok("ledger already has students; nothing seeded".to_string());
    }

    let mut guardian_ids = Vec::new();
    for (index, name) in GUARDIANS.iter().enumerate() {
        let mut draft = NewGuardian::new(*name);
        draft.phone = Some(format!("+569{}", 10_000_000 + index * 1_111_111));
        draft.email = Some(format!(
            "{}@example.com",
            name.to_lowercase().replace(' ', ".")
        ));

        let guardian = store.create_guardian(&draft).map_err(|err| err.to_string())?;
        guardian_ids.push(guardian.id);
    }

    let mut payment_count = 0;
    for (index, (name, grade)) in STUDENTS.iter().enumerate() {
        let guardian_id = guardian_ids[index % guardian_ids.len()];
        let student = store
            .enroll_student(&NewStudent::new(*name, *grade, guardian_id))
            .map_err(|err| err.to_string())?;

        // Student N has paid N % 7 periods from the cycle start, so the
        // delinquency report always has a mix of states to show.
        let paid_periods = index % 7;
        let cycle = &Month::ALL[Month::Marzo.index()..];
        for (offset, month) in cycle.iter().take(paid_periods).enumerate() {
            let amount = AMOUNTS[(index + offset) % AMOUNTS.len()];
            store
                .record_payment(&NewPayment::new(student.id, amount, *month))
                .map_err(|err| err.to_string())?;
            payment_count += 1;
        }
    }

    Ok(format!(
        "seeded {} guardians, {} students, {payment_count} payments",
        GUARDIANS.len(),
        STUDENTS.len()
    ))
}
