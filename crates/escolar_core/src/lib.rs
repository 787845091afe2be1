//! Core domain logic for the Escolar tuition ledger.
//! This crate is the single source of truth for ledger invariants.

pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;
pub mod store;

pub use logging::{default_log_level, init_logging, logging_status};
pub use model::guardian::{Guardian, GuardianContact, GuardianId, NewGuardian};
pub use model::payment::{
    DashboardStats, NewPayment, PaymentId, PaymentRecord, PaymentRow, StudentPayment,
};
pub use model::period::Month;
pub use model::settings::SchoolSettings;
pub use model::student::{GradeCount, NewStudent, Student, StudentId, StudentWithGuardian};
pub use model::ValidationError;
pub use repo::{ConstraintViolation, EntityKind, LedgerError, LedgerResult};
pub use service::session::{Session, SessionConfig};
pub use store::LedgerStore;

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
