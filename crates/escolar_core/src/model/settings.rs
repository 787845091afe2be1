//! Typed school configuration.
//!
//! # Responsibility
//! - Name the settings keys carried by the ledger-file format.
//! - Define the typed settings snapshot, its documented defaults and the
//!   string conversions for storage.
//!
//! # Invariants
//! - Every key has a documented default that applies when the stored row
//!   is absent or unparseable.
//! - Values are persisted as strings; parsing failures never fail a read.

use crate::model::period::Month;
use crate::model::ValidationError;
use serde::{Deserialize, Serialize};

// Key strings are part of the ledger-file data format and must not change.
pub const KEY_SCHOOL_NAME: &str = "nombre_escuela";
pub const KEY_SHOW_CHART: &str = "mostrar_grafico";
pub const KEY_ADMIN_PHONE: &str = "admin_telefono";
pub const KEY_BILLING_DAY: &str = "dia_cobranza";
pub const KEY_CYCLE_START: &str = "inicio_clases_idx";

pub const DEFAULT_SCHOOL_NAME: &str = "Escuela Modelo";
pub const DEFAULT_SHOW_CHART: bool = true;
pub const DEFAULT_ADMIN_PHONE: &str = "+56959920613";
pub const DEFAULT_BILLING_DAY: u8 = 5;
/// Academic cycles start in March by default.
pub const DEFAULT_CYCLE_START: Month = Month::Marzo;

/// Typed snapshot of the five school settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchoolSettings {
    pub school_name: String,
    /// Whether the dashboard income chart is shown.
    pub show_chart: bool,
    pub admin_phone: String,
    /// Day of month before which the current month is not yet due, 1-31.
    pub billing_day: u8,
    /// Month the academic/billing cycle starts at.
    pub cycle_start: Month,
}

impl Default for SchoolSettings {
    fn default() -> Self {
        Self {
            school_name: DEFAULT_SCHOOL_NAME.to_string(),
            show_chart: DEFAULT_SHOW_CHART,
            admin_phone: DEFAULT_ADMIN_PHONE.to_string(),
            billing_day: DEFAULT_BILLING_DAY,
            cycle_start: DEFAULT_CYCLE_START,
        }
    }
}

impl SchoolSettings {
    /// Checks a snapshot before it is written back to storage.
    ///
    /// Reads are lenient (defaults cover bad rows); writes are strict.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.school_name.trim().is_empty() {
            return Err(ValidationError::EmptySchoolName);
        }
        if !(1..=31).contains(&self.billing_day) {
            return Err(ValidationError::BillingDayOutOfRange(self.billing_day));
        }
        Ok(())
    }
}

/// Parses the stored chart flag, `"1"` on / `"0"` off.
pub(crate) fn parse_flag(value: &str) -> Option<bool> {
    match value.trim() {
        "1" => Some(true),
        "0" => Some(false),
        _ => None,
    }
}

pub(crate) fn flag_to_db(value: bool) -> &'static str {
    if value {
        "1"
    } else {
        "0"
    }
}

/// Parses the stored billing day, valid only within 1-31.
pub(crate) fn parse_billing_day(value: &str) -> Option<u8> {
    value
        .trim()
        .parse::<u8>()
        .ok()
        .filter(|day| (1..=31).contains(day))
}

/// Parses the stored 0-based cycle-start month index.
pub(crate) fn parse_cycle_start(value: &str) -> Option<Month> {
    value
        .trim()
        .parse::<usize>()
        .ok()
        .and_then(Month::from_index)
}

#[cfg(test)]
mod tests {
    use super::{
        parse_billing_day, parse_cycle_start, parse_flag, SchoolSettings, DEFAULT_BILLING_DAY,
        DEFAULT_CYCLE_START,
    };
    use crate::model::period::Month;
    use crate::model::ValidationError;

    #[test]
    fn defaults_match_the_documented_values() {
        let settings = SchoolSettings::default();
        assert_eq!(settings.school_name, "Escuela Modelo");
        assert!(settings.show_chart);
        assert_eq!(settings.billing_day, DEFAULT_BILLING_DAY);
        assert_eq!(settings.cycle_start, DEFAULT_CYCLE_START);
        assert_eq!(settings.validate(), Ok(()));
    }

    #[test]
    fn validate_rejects_blank_school_name_and_bad_billing_day() {
        let mut settings = SchoolSettings::default();
        settings.school_name = "  ".to_string();
        assert_eq!(settings.validate(), Err(ValidationError::EmptySchoolName));

        let mut settings = SchoolSettings::default();
        settings.billing_day = 0;
        assert_eq!(
            settings.validate(),
            Err(ValidationError::BillingDayOutOfRange(0))
        );

        settings.billing_day = 32;
        assert_eq!(
            settings.validate(),
            Err(ValidationError::BillingDayOutOfRange(32))
        );
    }

    #[test]
    fn stored_value_parsers_reject_garbage() {
        assert_eq!(parse_flag("1"), Some(true));
        assert_eq!(parse_flag(" 0 "), Some(false));
        assert_eq!(parse_flag("yes"), None);

        assert_eq!(parse_billing_day("5"), Some(5));
        assert_eq!(parse_billing_day("31"), Some(31));
        assert_eq!(parse_billing_day("0"), None);
        assert_eq!(parse_billing_day("forty"), None);

        assert_eq!(parse_cycle_start("2"), Some(Month::Marzo));
        assert_eq!(parse_cycle_start("0"), Some(Month::Enero));
        assert_eq!(parse_cycle_start("12"), None);
        assert_eq!(parse_cycle_start("marzo"), None);
    }
}
