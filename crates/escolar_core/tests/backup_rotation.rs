use escolar_core::service::backup;
use std::fs;
use std::path::Path;
use tempfile::tempdir;

#[test]
fn missing_source_is_a_silent_no_op() {
    let dir = tempdir().unwrap();
    let source = dir.path().join("escolares.db");
    let backup_dir = dir.path().join("backups");

    assert_eq!(backup::snapshot(&source, &backup_dir, 10), None);
    assert!(!backup_dir.exists());
}

#[test]
fn snapshot_copies_the_ledger_under_a_timestamped_name() {
    let dir = tempdir().unwrap();
    let source = dir.path().join("escolares.db");
    let backup_dir = dir.path().join("backups");
    fs::write(&source, b"ledger bytes").unwrap();

    let backup_path = backup::snapshot(&source, &backup_dir, 10).unwrap();

    assert_eq!(backup_path.parent().unwrap(), backup_dir);
    let name = backup_path.file_name().unwrap().to_str().unwrap();
    assert!(name.starts_with("escolares_auto_"));
    assert!(name.ends_with(".db"));
    assert_eq!(fs::read(&backup_path).unwrap(), b"ledger bytes");
}

#[test]
fn retention_prunes_the_oldest_backups() {
    let dir = tempdir().unwrap();
    let source = dir.path().join("escolares.db");
    let backup_dir = dir.path().join("backups");
    fs::write(&source, b"ledger bytes").unwrap();
    fs::create_dir_all(&backup_dir).unwrap();

    // Seed a dozen stale backups; creation order and name order agree,
    // so the prune ordering is deterministic either way.
    for index in 0..12 {
        let name = format!("escolares_auto_20240101_0000{index:02}.db");
        fs::write(backup_dir.join(name), b"old").unwrap();
    }

    let backup_path = backup::snapshot(&source, &backup_dir, 10).unwrap();

    let remaining = db_files(&backup_dir);
    assert_eq!(remaining.len(), 10);
    assert!(backup_path.exists());
    for index in 0..3 {
        let name = format!("escolares_auto_20240101_0000{index:02}.db");
        assert!(!remaining.contains(&name), "{name} should have been pruned");
    }
    for index in 3..12 {
        let name = format!("escolares_auto_20240101_0000{index:02}.db");
        assert!(remaining.contains(&name), "{name} should have survived");
    }
}

#[test]
fn files_with_other_extensions_are_untouched() {
    let dir = tempdir().unwrap();
    let source = dir.path().join("escolares.db");
    let backup_dir = dir.path().join("backups");
    fs::write(&source, b"ledger bytes").unwrap();
    fs::create_dir_all(&backup_dir).unwrap();

    fs::write(backup_dir.join("notas.txt"), b"keep me").unwrap();
    fs::write(backup_dir.join("export.json"), b"keep me too").unwrap();
    for index in 0..5 {
        let name = format!("escolares_auto_20240101_0000{index:02}.db");
        fs::write(backup_dir.join(name), b"old").unwrap();
    }

    backup::snapshot(&source, &backup_dir, 3).unwrap();

    assert!(backup_dir.join("notas.txt").exists());
    assert!(backup_dir.join("export.json").exists());
    assert_eq!(db_files(&backup_dir).len(), 3);
}

#[test]
fn unwritable_backup_dir_fails_soft() {
    let dir = tempdir().unwrap();
    let source = dir.path().join("escolares.db");
    fs::write(&source, b"ledger bytes").unwrap();

    // A plain file where the backup directory should be.
    let backup_dir = dir.path().join("backups");
    fs::write(&backup_dir, b"in the way").unwrap();

    assert_eq!(backup::snapshot(&source, &backup_dir, 10), None);
    assert_eq!(fs::read(&source).unwrap(), b"ledger bytes");
}

fn db_files(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = fs::read_dir(dir)
        .unwrap()
        .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
        .filter(|name| name.ends_with(".db"))
        .collect();
    names.sort();
    names
}
