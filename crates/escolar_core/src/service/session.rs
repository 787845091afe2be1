//! Active-ledger session lifecycle.
//!
//! # Responsibility
//! - Resolve which ledger file backs the store at startup and on switch.
//! - Persist that choice in the pointer file and trigger backup snapshots.
//!
//! # Invariants
//! - Switching is construct-then-adopt: the previous store stays active
//!   until the replacement has opened and answered a settings read.
//! - Pointer-file writes are best-effort and never abort open/switch.
//! - The session is passed by reference to whoever needs it; there is no
//!   process-wide singleton.

use crate::model::settings::SchoolSettings;
use crate::repo::LedgerResult;
use crate::service::backup;
use crate::store::LedgerStore;
use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

pub const DEFAULT_POINTER_FILE: &str = "config.json";
pub const DEFAULT_LEDGER_FILE: &str = "escolares.db";

/// Where a session finds its pointer file, default ledger and backups.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionConfig {
    pub pointer_path: PathBuf,
    /// Ledger used when the pointer file records nothing usable.
    pub default_ledger_path: PathBuf,
    pub backup_dir: PathBuf,
    pub retention_limit: usize,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            pointer_path: PathBuf::from(DEFAULT_POINTER_FILE),
            default_ledger_path: PathBuf::from(DEFAULT_LEDGER_FILE),
            backup_dir: PathBuf::from(backup::DEFAULT_BACKUP_DIR),
            retention_limit: backup::DEFAULT_RETENTION_LIMIT,
        }
    }
}

/// Pointer-file shape. Keys other than ours are preserved across
/// rewrites, since the file may be shared with outer tooling.
#[derive(Debug, Default, Serialize, Deserialize)]
struct PointerFile {
    #[serde(
        rename = "last_db_path",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    last_ledger_path: Option<PathBuf>,
    #[serde(flatten)]
    extra: serde_json::Map<String, serde_json::Value>,
}

/// Ledger path the session should open: the recorded one when it still
/// exists on disk, the default otherwise. Unreadable or corrupt pointer
/// files are logged and treated as absent.
pub fn resolve_active_ledger_path(pointer_path: &Path, default_ledger_path: &Path) -> PathBuf {
    match load_pointer(pointer_path).last_ledger_path {
        Some(recorded) if recorded.exists() => recorded,
        Some(recorded) => {
            info!(
                "event=session_resolve module=session status=fallback recorded={} reason=missing",
                recorded.display()
            );
            default_ledger_path.to_path_buf()
        }
        None => default_ledger_path.to_path_buf(),
    }
}

/// The active ledger plus its settings snapshot.
pub struct Session {
    config: SessionConfig,
    store: LedgerStore,
    settings: SchoolSettings,
}

impl Session {
    /// Opens a session against the currently recorded ledger, recording
    /// the resolved path back and taking a backup snapshot.
    pub fn open(config: SessionConfig) -> LedgerResult<Session> {
        let resolved =
            resolve_active_ledger_path(&config.pointer_path, &config.default_ledger_path);
        let ledger_path = absolute_or_as_is(resolved);

        let store = LedgerStore::open(&ledger_path)?;
        let settings = store.school_settings()?;

        record_active_ledger(&config.pointer_path, store.path());
        backup::snapshot(store.path(), &config.backup_dir, config.retention_limit);

        info!(
            "event=session_open module=session status=ok ledger={}",
            store.path().display()
        );

        Ok(Self {
            config,
            store,
            settings,
        })
    }

    pub fn store(&self) -> &LedgerStore {
        &self.store
    }

    pub fn settings(&self) -> &SchoolSettings {
        &self.settings
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn ledger_path(&self) -> &Path {
        self.store.path()
    }

    /// Re-reads the settings snapshot from the active ledger.
    pub fn reload_settings(&mut self) -> LedgerResult<()> {
        self.settings = self.store.school_settings()?;
        Ok(())
    }

    /// Persists new settings and refreshes the snapshot from storage.
    pub fn save_settings(&mut self, settings: &SchoolSettings) -> LedgerResult<()> {
        self.store.save_school_settings(settings)?;
        self.reload_settings()
    }

    /// Switches to the ledger at `new_path`, creating it if absent.
    ///
    /// The new store must open and answer a settings read before it is
    /// adopted; on any failure the error is returned and the previous
    /// store remains active. Queries issued right after a successful
    /// switch answer from the new ledger only.
    pub fn switch_ledger(&mut self, new_path: impl AsRef<Path>) -> LedgerResult<()> {
        let target = absolute_or_as_is(new_path.as_ref().to_path_buf());

        let store = match LedgerStore::open(&target) {
            Ok(store) => store,
            Err(err) => {
                warn!(
                    "event=ledger_switch module=session status=error target={} error={err}",
                    target.display()
                );
                return Err(err);
            }
        };
        let settings = match store.school_settings() {
            Ok(settings) => settings,
            Err(err) => {
                warn!(
                    "event=ledger_switch module=session status=error target={} error={err}",
                    target.display()
                );
                return Err(err);
            }
        };

        record_active_ledger(&self.config.pointer_path, store.path());
        backup::snapshot(
            store.path(),
            &self.config.backup_dir,
            self.config.retention_limit,
        );

        self.store = store;
        self.settings = settings;

        info!(
            "event=ledger_switch module=session status=ok ledger={}",
            self.store.path().display()
        );
        Ok(())
    }
}

fn load_pointer(path: &Path) -> PointerFile {
    let raw = match fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(err) => {
            if err.kind() != io::ErrorKind::NotFound {
                warn!(
                    "event=pointer_read module=session status=error path={} error={err}",
                    path.display()
                );
            }
            return PointerFile::default();
        }
    };

    match serde_json::from_str(&raw) {
        Ok(pointer) => pointer,
        Err(err) => {
            warn!(
                "event=pointer_read module=session status=error path={} error={err}",
                path.display()
            );
            PointerFile::default()
        }
    }
}

/// Best-effort pointer rewrite preserving unrelated keys.
fn record_active_ledger(pointer_path: &Path, ledger_path: &Path) {
    let mut pointer = load_pointer(pointer_path);
    pointer.last_ledger_path = Some(ledger_path.to_path_buf());

    let written = serde_json::to_string_pretty(&pointer)
        .map_err(io::Error::from)
        .and_then(|json| write_pointer_file(pointer_path, &json));

    match written {
        Ok(()) => info!(
            "event=pointer_update module=session status=ok ledger={}",
            ledger_path.display()
        ),
        Err(err) => warn!(
            "event=pointer_update module=session status=error path={} error={err}",
            pointer_path.display()
        ),
    }
}

fn write_pointer_file(path: &Path, json: &str) -> io::Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    fs::write(path, json)
}

fn absolute_or_as_is(path: PathBuf) -> PathBuf {
    std::path::absolute(&path).unwrap_or(path)
}
