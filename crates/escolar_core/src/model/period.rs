//! Canonical billing periods.
//!
//! # Responsibility
//! - Define the fixed twelve-month sequence used as the unit of tuition
//!   obligation.
//! - Convert between 0-based month indices, stored labels and typed values.
//!
//! # Invariants
//! - `Month::ALL` is the canonical billing order; `Enero` has index 0.
//! - Stored payment rows carry the canonical label, never an index.

use crate::model::ValidationError;
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

/// One of the twelve canonical billing-period labels.
///
/// The labels are part of the ledger-file data format. Display-locale
/// resolution is an external concern; the core only ever deals in the
/// canonical names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Month {
    Enero,
    Febrero,
    Marzo,
    Abril,
    Mayo,
    Junio,
    Julio,
    Agosto,
    Septiembre,
    Octubre,
    Noviembre,
    Diciembre,
}

impl Month {
    /// Canonical billing order, January first.
    pub const ALL: [Month; 12] = [
        Month::Enero,
        Month::Febrero,
        Month::Marzo,
        Month::Abril,
        Month::Mayo,
        Month::Junio,
        Month::Julio,
        Month::Agosto,
        Month::Septiembre,
        Month::Octubre,
        Month::Noviembre,
        Month::Diciembre,
    ];

    /// 0-based index within the canonical order.
    pub fn index(self) -> usize {
        self as usize
    }

    /// Month for a 0-based index, `None` outside `0..=11`.
    pub fn from_index(index: usize) -> Option<Month> {
        Self::ALL.get(index).copied()
    }

    /// Canonical label as stored in payment rows.
    pub fn label(self) -> &'static str {
        match self {
            Month::Enero => "Enero",
            Month::Febrero => "Febrero",
            Month::Marzo => "Marzo",
            Month::Abril => "Abril",
            Month::Mayo => "Mayo",
            Month::Junio => "Junio",
            Month::Julio => "Julio",
            Month::Agosto => "Agosto",
            Month::Septiembre => "Septiembre",
            Month::Octubre => "Octubre",
            Month::Noviembre => "Noviembre",
            Month::Diciembre => "Diciembre",
        }
    }

    /// Parses a label, ignoring surrounding whitespace and ASCII case.
    pub fn parse(label: &str) -> Option<Month> {
        let trimmed = label.trim();
        Self::ALL
            .iter()
            .copied()
            .find(|month| month.label().eq_ignore_ascii_case(trimmed))
    }

    /// Parses caller input, surfacing the unparsed label on failure.
    pub fn parse_required(label: &str) -> Result<Month, ValidationError> {
        Self::parse(label).ok_or_else(|| ValidationError::UnknownPeriod(label.trim().to_string()))
    }
}

impl Display for Month {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::Month;
    use crate::model::ValidationError;

    #[test]
    fn canonical_order_starts_at_january() {
        assert_eq!(Month::ALL[0], Month::Enero);
        assert_eq!(Month::ALL[11], Month::Diciembre);
        assert_eq!(Month::Marzo.index(), 2);
    }

    #[test]
    fn index_roundtrip() {
        for month in Month::ALL {
            assert_eq!(Month::from_index(month.index()), Some(month));
        }
        assert_eq!(Month::from_index(12), None);
    }

    #[test]
    fn parse_ignores_case_and_whitespace() {
        assert_eq!(Month::parse("marzo"), Some(Month::Marzo));
        assert_eq!(Month::parse("  SEPTIEMBRE "), Some(Month::Septiembre));
        assert_eq!(Month::parse("Smarch"), None);
    }

    #[test]
    fn parse_required_reports_the_offending_label() {
        let err = Month::parse_required(" Smarch ").unwrap_err();
        assert_eq!(err, ValidationError::UnknownPeriod("Smarch".to_string()));
    }
}
