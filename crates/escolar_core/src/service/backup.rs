//! Timestamped ledger snapshots with bounded retention.
//!
//! # Responsibility
//! - Copy the active ledger file into the backup directory on session
//!   open and ledger switch.
//! - Prune the oldest backups beyond the retention limit.
//!
//! # Invariants
//! - Backups are best-effort: every I/O failure is logged and swallowed,
//!   never surfaced to the startup/switch flow.
//! - A missing source file is a silent no-op, not an error.
//! - After a snapshot, at most `retention_limit` backup files remain.

use chrono::Local;
use log::{debug, error, info};
use std::ffi::OsStr;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

pub const DEFAULT_BACKUP_DIR: &str = "backups";
pub const DEFAULT_RETENTION_LIMIT: usize = 10;

const BACKUP_TAG: &str = "auto";
const BACKUP_TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M%S";

/// Copies `ledger_path` into `backup_dir` under a timestamped name, then
/// prunes the oldest backups down to `retention_limit`.
///
/// Returns the created backup path, or `None` when the source does not
/// exist yet or any I/O step failed (logged, never propagated).
pub fn snapshot(ledger_path: &Path, backup_dir: &Path, retention_limit: usize) -> Option<PathBuf> {
    if !ledger_path.exists() {
        debug!("event=backup_snapshot module=backup status=skip reason=source_missing");
        return None;
    }

    match try_snapshot(ledger_path, backup_dir, retention_limit) {
        Ok(backup_path) => {
            info!(
                "event=backup_snapshot module=backup status=ok backup={}",
                backup_path.display()
            );
            Some(backup_path)
        }
        Err(err) => {
            error!("event=backup_snapshot module=backup status=error error={err}");
            None
        }
    }
}

fn try_snapshot(
    ledger_path: &Path,
    backup_dir: &Path,
    retention_limit: usize,
) -> io::Result<PathBuf> {
    fs::create_dir_all(backup_dir)?;

    let stamp = Local::now().format(BACKUP_TIMESTAMP_FORMAT).to_string();
    let backup_path = backup_dir.join(backup_file_name(ledger_path, &stamp));
    fs::copy(ledger_path, &backup_path)?;

    let extension = ledger_path
        .extension()
        .and_then(OsStr::to_str)
        .unwrap_or("db")
        .to_string();
    for removed in prune_backups(backup_dir, &extension, retention_limit)? {
        info!(
            "event=backup_prune module=backup status=ok removed={}",
            removed.display()
        );
    }

    Ok(backup_path)
}

/// `{stem}_auto_{stamp}.{ext}`, sortable by creation order.
fn backup_file_name(source: &Path, stamp: &str) -> String {
    let stem = source
        .file_stem()
        .and_then(OsStr::to_str)
        .unwrap_or("ledger");
    let extension = source.extension().and_then(OsStr::to_str).unwrap_or("db");
    format!("{stem}_{BACKUP_TAG}_{stamp}.{extension}")
}

/// Deletes the oldest files with the given extension until at most
/// `retention_limit` remain. Ordering is modification time ascending with
/// the file name as deterministic tiebreak.
fn prune_backups(
    backup_dir: &Path,
    extension: &str,
    retention_limit: usize,
) -> io::Result<Vec<PathBuf>> {
    let mut backups: Vec<(SystemTime, String, PathBuf)> = Vec::new();
    for entry in fs::read_dir(backup_dir)? {
        let entry = entry?;
        let path = entry.path();
        if !path.is_file() || path.extension().and_then(OsStr::to_str) != Some(extension) {
            continue;
        }

        let modified = entry.metadata()?.modified()?;
        let name = entry.file_name().to_string_lossy().into_owned();
        backups.push((modified, name, path));
    }

    backups.sort_by(|a, b| a.0.cmp(&b.0).then_with(|| a.1.cmp(&b.1)));

    let mut removed = Vec::new();
    while backups.len() > retention_limit {
        let (_, _, path) = backups.remove(0);
        fs::remove_file(&path)?;
        removed.push(path);
    }

    Ok(removed)
}
