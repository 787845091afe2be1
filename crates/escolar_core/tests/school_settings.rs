use escolar_core::{LedgerError, LedgerStore, Month, SchoolSettings, ValidationError};
use tempfile::{tempdir, TempDir};

#[test]
fn fresh_ledger_answers_with_defaults_and_stores_nothing() {
    let dir = tempdir().unwrap();
    let store = open_store(&dir);

    assert_eq!(store.school_settings().unwrap(), SchoolSettings::default());

    // Defaults are applied at read time; opening seeds no rows.
    assert_eq!(store.setting("nombre_escuela").unwrap(), None);
    assert_eq!(store.setting("dia_cobranza").unwrap(), None);
}

#[test]
fn saved_settings_roundtrip_through_their_string_forms() {
    let dir = tempdir().unwrap();
    let store = open_store(&dir);

    let custom = SchoolSettings {
        school_name: "Colegio Norte".to_string(),
        show_chart: false,
        admin_phone: "+56911112222".to_string(),
        billing_day: 10,
        cycle_start: Month::Abril,
    };
    store.save_school_settings(&custom).unwrap();

    assert_eq!(store.school_settings().unwrap(), custom);
    assert_eq!(
        store.setting("nombre_escuela").unwrap().as_deref(),
        Some("Colegio Norte")
    );
    assert_eq!(
        store.setting("mostrar_grafico").unwrap().as_deref(),
        Some("0")
    );
    assert_eq!(store.setting("dia_cobranza").unwrap().as_deref(), Some("10"));
    assert_eq!(
        store.setting("inicio_clases_idx").unwrap().as_deref(),
        Some("3")
    );
}

#[test]
fn unparseable_stored_values_fall_back_to_defaults() {
    let dir = tempdir().unwrap();
    let store = open_store(&dir);

    store.set_setting("dia_cobranza", "quince").unwrap();
    store.set_setting("mostrar_grafico", "yes").unwrap();
    store.set_setting("inicio_clases_idx", "99").unwrap();
    store.set_setting("nombre_escuela", "Colegio Norte").unwrap();

    let settings = store.school_settings().unwrap();
    assert_eq!(settings.school_name, "Colegio Norte");
    assert_eq!(settings.billing_day, 5);
    assert!(settings.show_chart);
    assert_eq!(settings.cycle_start, Month::Marzo);
}

#[test]
fn blank_stored_names_fall_back_and_stored_names_are_trimmed() {
    let dir = tempdir().unwrap();
    let store = open_store(&dir);

    store.set_setting("nombre_escuela", "   ").unwrap();
    store.set_setting("admin_telefono", "").unwrap();
    let settings = store.school_settings().unwrap();
    assert_eq!(settings.school_name, "Escuela Modelo");
    assert_eq!(settings.admin_phone, "+56959920613");

    store.set_setting("nombre_escuela", "  Colegio Norte  ").unwrap();
    let settings = store.school_settings().unwrap();
    assert_eq!(settings.school_name, "Colegio Norte");
}

#[test]
fn save_rejects_invalid_snapshots() {
    let dir = tempdir().unwrap();
    let store = open_store(&dir);

    let mut bad = SchoolSettings::default();
    bad.school_name = " ".to_string();
    let err = store.save_school_settings(&bad).unwrap_err();
    assert!(matches!(
        err,
        LedgerError::Validation(ValidationError::EmptySchoolName)
    ));

    let mut bad = SchoolSettings::default();
    bad.billing_day = 32;
    let err = store.save_school_settings(&bad).unwrap_err();
    assert!(matches!(
        err,
        LedgerError::Validation(ValidationError::BillingDayOutOfRange(32))
    ));

    // Nothing was written by the rejected saves.
    assert_eq!(store.setting("nombre_escuela").unwrap(), None);
}

#[test]
fn set_setting_upserts_and_keeps_unknown_keys() {
    let dir = tempdir().unwrap();
    let store = open_store(&dir);

    store.set_setting("tema", "claro").unwrap();
    store.set_setting("tema", "oscuro").unwrap();
    assert_eq!(store.setting("tema").unwrap().as_deref(), Some("oscuro"));

    // Unknown keys never disturb the typed snapshot.
    assert_eq!(store.school_settings().unwrap(), SchoolSettings::default());
}

fn open_store(dir: &TempDir) -> LedgerStore {
    LedgerStore::open(dir.path().join("escolares.db")).unwrap()
}
