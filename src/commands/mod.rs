//! Command implementations.
//!
//! CHANGELOG:
//! - 10/18/2026 - run, status, contacts, import-contacts

pub mod contacts;
pub mod run;
pub mod status;
