//! Use-case services on top of the ledger store.
//!
//! # Responsibility
//! - Delinquency computation, session lifecycle, backup rotation and
//!   background task dispatch.
//!
//! # Invariants
//! - Services never reach around the store into raw SQL.

pub mod backup;
pub mod delinquency;
pub mod session;
pub mod tasks;
