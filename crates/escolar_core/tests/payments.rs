use escolar_core::{
    ConstraintViolation, EntityKind, LedgerError, LedgerStore, Month, NewGuardian, NewPayment,
    NewStudent, StudentId, ValidationError,
};
use tempfile::{tempdir, TempDir};

#[test]
fn record_payment_roundtrips() {
    let dir = tempdir().unwrap();
    let store = open_store(&dir);
    let leo = enroll(&store, "Leo Diaz", "5° Básico");

    let payment = store
        .record_payment(&NewPayment::new(leo, 50000.0, Month::Marzo))
        .unwrap();
    assert_eq!(payment.id, 1);
    assert_eq!(payment.student_id, leo);
    assert_eq!(payment.amount, 50000.0);
    assert_eq!(payment.period, Month::Marzo);
    assert!(payment.paid);
    assert!(payment.paid_at > 0);

    let lines = store.payments_for_student(leo).unwrap();
    assert_eq!(lines.len(), 1);
    assert_eq!(lines[0].period, Month::Marzo);
    assert_eq!(lines[0].amount, 50000.0);
    assert_eq!(lines[0].paid_at, payment.paid_at);
}

#[test]
fn second_payment_for_same_period_is_rejected() {
    let dir = tempdir().unwrap();
    let store = open_store(&dir);
    let leo = enroll(&store, "Leo Diaz", "5° Básico");
    let mia = enroll(&store, "Mia Vidal", "2° Básico");

    store
        .record_payment(&NewPayment::new(leo, 50000.0, Month::Marzo))
        .unwrap();

    let err = store
        .record_payment(&NewPayment::new(leo, 45000.0, Month::Marzo))
        .unwrap_err();
    assert!(matches!(
        err,
        LedgerError::Constraint(ConstraintViolation::DuplicatePayment {
            student_id,
            period: Month::Marzo,
        }) if student_id == leo
    ));

    // The same period for another student, and another period for the
    // same student, are both fine.
    store
        .record_payment(&NewPayment::new(mia, 50000.0, Month::Marzo))
        .unwrap();
    store
        .record_payment(&NewPayment::new(leo, 50000.0, Month::Abril))
        .unwrap();

    assert_eq!(store.payments_for_student(leo).unwrap().len(), 2);
}

#[test]
fn record_payment_rejects_bad_amount_and_unknown_student() {
    let dir = tempdir().unwrap();
    let store = open_store(&dir);
    let leo = enroll(&store, "Leo Diaz", "5° Básico");

    let err = store
        .record_payment(&NewPayment::new(leo, 0.0, Month::Marzo))
        .unwrap_err();
    assert!(matches!(
        err,
        LedgerError::Validation(ValidationError::NonPositiveAmount(_))
    ));

    let err = store
        .record_payment(&NewPayment::new(404, 50000.0, Month::Marzo))
        .unwrap_err();
    assert!(matches!(
        err,
        LedgerError::NotFound {
            entity: EntityKind::Student,
            id: 404
        }
    ));
}

#[test]
fn update_payment_rewrites_amount_and_period() {
    let dir = tempdir().unwrap();
    let store = open_store(&dir);
    let leo = enroll(&store, "Leo Diaz", "5° Básico");
    let payment = store
        .record_payment(&NewPayment::new(leo, 50000.0, Month::Marzo))
        .unwrap();

    let updated = store
        .update_payment(payment.id, 47000.0, Month::Abril)
        .unwrap();
    assert_eq!(updated.id, payment.id);
    assert_eq!(updated.amount, 47000.0);
    assert_eq!(updated.period, Month::Abril);

    let err = store.update_payment(999, 1000.0, Month::Marzo).unwrap_err();
    assert!(matches!(
        err,
        LedgerError::NotFound {
            entity: EntityKind::Payment,
            id: 999
        }
    ));

    let err = store
        .update_payment(payment.id, -1.0, Month::Marzo)
        .unwrap_err();
    assert!(matches!(
        err,
        LedgerError::Validation(ValidationError::NonPositiveAmount(_))
    ));
}

#[test]
fn update_payment_cannot_land_on_an_occupied_period() {
    let dir = tempdir().unwrap();
    let store = open_store(&dir);
    let leo = enroll(&store, "Leo Diaz", "5° Básico");

    store
        .record_payment(&NewPayment::new(leo, 50000.0, Month::Marzo))
        .unwrap();
    let abril = store
        .record_payment(&NewPayment::new(leo, 50000.0, Month::Abril))
        .unwrap();

    let err = store
        .update_payment(abril.id, 50000.0, Month::Marzo)
        .unwrap_err();
    assert!(matches!(
        err,
        LedgerError::Constraint(ConstraintViolation::DuplicatePayment {
            student_id,
            period: Month::Marzo,
        }) if student_id == leo
    ));

    // Rewriting a row onto its own period is not a duplicate.
    store
        .update_payment(abril.id, 52000.0, Month::Abril)
        .unwrap();
}

#[test]
fn delete_payment_removes_one_row() {
    let dir = tempdir().unwrap();
    let store = open_store(&dir);
    let leo = enroll(&store, "Leo Diaz", "5° Básico");
    let payment = store
        .record_payment(&NewPayment::new(leo, 50000.0, Month::Marzo))
        .unwrap();

    store.delete_payment(payment.id).unwrap();
    assert!(store.payments_for_student(leo).unwrap().is_empty());

    let err = store.delete_payment(payment.id).unwrap_err();
    assert!(matches!(
        err,
        LedgerError::NotFound {
            entity: EntityKind::Payment,
            ..
        }
    ));
}

#[test]
fn payment_history_is_most_recent_first_and_joined() {
    let dir = tempdir().unwrap();
    let store = open_store(&dir);
    let leo = enroll(&store, "Leo Diaz", "5° Básico");
    let mia = enroll(&store, "Mia Vidal", "2° Básico");

    store
        .record_payment(&NewPayment::new(leo, 50000.0, Month::Marzo))
        .unwrap();
    store
        .record_payment(&NewPayment::new(mia, 45000.0, Month::Marzo))
        .unwrap();
    store
        .record_payment(&NewPayment::new(leo, 50000.0, Month::Abril))
        .unwrap();

    let history = store.payment_history().unwrap();
    assert_eq!(history.len(), 3);
    assert_eq!(history[0].period, Month::Abril);
    assert_eq!(history[0].student_name, "Leo Diaz");
    assert_eq!(history[0].grade, "5° Básico");
    assert_eq!(history[1].student_name, "Mia Vidal");
    assert_eq!(history[2].period, Month::Marzo);
    assert_eq!(history[2].student_name, "Leo Diaz");
}

#[test]
fn search_payments_filters_by_student_name() {
    let dir = tempdir().unwrap();
    let store = open_store(&dir);
    let leo = enroll(&store, "Leo Diaz", "5° Básico");
    let mia = enroll(&store, "Mia Vidal", "2° Básico");

    store
        .record_payment(&NewPayment::new(leo, 50000.0, Month::Marzo))
        .unwrap();
    store
        .record_payment(&NewPayment::new(mia, 45000.0, Month::Marzo))
        .unwrap();

    let hits = store.search_payments("vidal").unwrap();
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].student_name, "Mia Vidal");

    assert!(store.search_payments("nadie").unwrap().is_empty());
}

#[test]
fn payment_detail_returns_joined_row_or_none() {
    let dir = tempdir().unwrap();
    let store = open_store(&dir);
    let leo = enroll(&store, "Leo Diaz", "5° Básico");
    let payment = store
        .record_payment(&NewPayment::new(leo, 50000.0, Month::Marzo))
        .unwrap();

    let detail = store.payment_detail(payment.id).unwrap().unwrap();
    assert_eq!(detail.payment_id, payment.id);
    assert_eq!(detail.student_name, "Leo Diaz");
    assert_eq!(detail.amount, 50000.0);

    assert!(store.payment_detail(404).unwrap().is_none());
}

#[test]
fn dashboard_stats_sum_only_the_selected_period() {
    let dir = tempdir().unwrap();
    let store = open_store(&dir);
    let leo = enroll(&store, "Leo Diaz", "5° Básico");
    let mia = enroll(&store, "Mia Vidal", "2° Básico");

    store
        .record_payment(&NewPayment::new(leo, 50000.0, Month::Marzo))
        .unwrap();
    store
        .record_payment(&NewPayment::new(mia, 30000.0, Month::Marzo))
        .unwrap();
    store
        .record_payment(&NewPayment::new(leo, 20000.0, Month::Abril))
        .unwrap();

    let stats = store.dashboard_stats(Month::Marzo).unwrap();
    assert_eq!(stats.student_count, 2);
    assert_eq!(stats.period_income, 80000.0);

    let empty = store.dashboard_stats(Month::Diciembre).unwrap();
    assert_eq!(empty.period_income, 0.0);
}

#[test]
fn all_payment_periods_lists_every_pair() {
    let dir = tempdir().unwrap();
    let store = open_store(&dir);
    let leo = enroll(&store, "Leo Diaz", "5° Básico");
    let mia = enroll(&store, "Mia Vidal", "2° Básico");

    store
        .record_payment(&NewPayment::new(leo, 50000.0, Month::Marzo))
        .unwrap();
    store
        .record_payment(&NewPayment::new(leo, 50000.0, Month::Abril))
        .unwrap();
    store
        .record_payment(&NewPayment::new(mia, 45000.0, Month::Marzo))
        .unwrap();

    let mut pairs = store.all_payment_periods().unwrap();
    pairs.sort();
    let mut expected = vec![(leo, Month::Marzo), (leo, Month::Abril), (mia, Month::Marzo)];
    expected.sort();
    assert_eq!(pairs, expected);
}

#[test]
fn delete_all_payments_reports_removed_count() {
    let dir = tempdir().unwrap();
    let store = open_store(&dir);
    let leo = enroll(&store, "Leo Diaz", "5° Básico");

    store
        .record_payment(&NewPayment::new(leo, 50000.0, Month::Marzo))
        .unwrap();
    store
        .record_payment(&NewPayment::new(leo, 50000.0, Month::Abril))
        .unwrap();

    assert_eq!(store.delete_all_payments().unwrap(), 2);
    assert!(store.payment_history().unwrap().is_empty());
    assert_eq!(store.delete_all_payments().unwrap(), 0);
}

fn open_store(dir: &TempDir) -> LedgerStore {
    LedgerStore::open(dir.path().join("escolares.db")).unwrap()
}

fn enroll(store: &LedgerStore, name: &str, grade: &str) -> StudentId {
    let guardian = store
        .create_guardian(&NewGuardian::new(format!("Apoderado de {name}")))
        .unwrap();
    store
        .enroll_student(&NewStudent::new(name, grade, guardian.id))
        .unwrap()
        .id
}
