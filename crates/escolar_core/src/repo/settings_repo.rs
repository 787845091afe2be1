//! Settings repository contract and SQLite implementation.
//!
//! # Responsibility
//! - Raw key/value access over the `settings` table.
//! - Assemble the typed `SchoolSettings` snapshot with defaults applied.
//!
//! # Invariants
//! - Writes are upserts; there is no deletion path.
//! - Reads never fail on a bad stored value: it is logged and replaced by
//!   the documented default. Writes go through `SchoolSettings::validate()`.

use crate::model::settings::{
    flag_to_db, parse_billing_day, parse_cycle_start, parse_flag, SchoolSettings,
    DEFAULT_ADMIN_PHONE, DEFAULT_BILLING_DAY, DEFAULT_CYCLE_START, DEFAULT_SCHOOL_NAME,
    DEFAULT_SHOW_CHART, KEY_ADMIN_PHONE, KEY_BILLING_DAY, KEY_CYCLE_START, KEY_SCHOOL_NAME,
    KEY_SHOW_CHART,
};
use crate::repo::LedgerResult;
use log::warn;
use rusqlite::{params, Connection};

/// Repository interface for settings operations.
pub trait SettingsRepository {
    fn get_setting(&self, key: &str) -> LedgerResult<Option<String>>;
    fn set_setting(&self, key: &str, value: &str) -> LedgerResult<()>;
    /// Typed snapshot of the five school settings, defaults applied.
    fn school_settings(&self) -> LedgerResult<SchoolSettings>;
    /// Validates and upserts all five school settings keys.
    fn save_school_settings(&self, settings: &SchoolSettings) -> LedgerResult<()>;
}

/// SQLite-backed settings repository.
pub struct SqliteSettingsRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteSettingsRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }

    /// Reads one key and runs its parser, falling back to the default on
    /// an unparseable stored value. Reads stay lenient so one bad row
    /// cannot take down startup.
    fn parsed_setting<T>(
        &self,
        key: &str,
        parse: impl Fn(&str) -> Option<T>,
        default: T,
    ) -> LedgerResult<T> {
        match self.get_setting(key)? {
            Some(raw) => match parse(&raw) {
                Some(value) => Ok(value),
                None => {
                    warn!(
                        "event=setting_read module=settings status=fallback key={key} reason=unparseable"
                    );
                    Ok(default)
                }
            },
            None => Ok(default),
        }
    }
}

impl SettingsRepository for SqliteSettingsRepository<'_> {
    fn get_setting(&self, key: &str) -> LedgerResult<Option<String>> {
        let mut stmt = self
            .conn
            .prepare("SELECT value FROM settings WHERE key = ?1;")?;

        let mut rows = stmt.query([key])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(row.get(0)?));
        }

        Ok(None)
    }

    fn set_setting(&self, key: &str, value: &str) -> LedgerResult<()> {
        self.conn.execute(
            "INSERT INTO settings (key, value) VALUES (?1, ?2)
             ON CONFLICT (key) DO UPDATE SET value = excluded.value;",
            params![key, value],
        )?;
        Ok(())
    }

    fn school_settings(&self) -> LedgerResult<SchoolSettings> {
        let school_name = match self.get_setting(KEY_SCHOOL_NAME)? {
            Some(value) if !value.trim().is_empty() => value.trim().to_string(),
            Some(_) => {
                warn!(
                    "event=setting_read module=settings status=fallback key={KEY_SCHOOL_NAME} reason=blank"
                );
                DEFAULT_SCHOOL_NAME.to_string()
            }
            None => DEFAULT_SCHOOL_NAME.to_string(),
        };

        let admin_phone = match self.get_setting(KEY_ADMIN_PHONE)? {
            Some(value) if !value.trim().is_empty() => value.trim().to_string(),
            _ => DEFAULT_ADMIN_PHONE.to_string(),
        };

        Ok(SchoolSettings {
            school_name,
            show_chart: self.parsed_setting(KEY_SHOW_CHART, parse_flag, DEFAULT_SHOW_CHART)?,
            admin_phone,
            billing_day: self.parsed_setting(
                KEY_BILLING_DAY,
                parse_billing_day,
                DEFAULT_BILLING_DAY,
            )?,
            cycle_start: self.parsed_setting(
                KEY_CYCLE_START,
                parse_cycle_start,
                DEFAULT_CYCLE_START,
            )?,
        })
    }

    fn save_school_settings(&self, settings: &SchoolSettings) -> LedgerResult<()> {
        settings.validate()?;

        self.set_setting(KEY_SCHOOL_NAME, settings.school_name.trim())?;
        self.set_setting(KEY_SHOW_CHART, flag_to_db(settings.show_chart))?;
        self.set_setting(KEY_ADMIN_PHONE, settings.admin_phone.trim())?;
        self.set_setting(KEY_BILLING_DAY, &settings.billing_day.to_string())?;
        self.set_setting(KEY_CYCLE_START, &settings.cycle_start.index().to_string())?;

        Ok(())
    }
}
