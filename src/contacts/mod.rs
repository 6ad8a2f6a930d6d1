//! Contacts: display-name resolution and contacts file import.
//!
//! CHANGELOG:
//! - 10/18/2026 - Split into resolver and manager

pub mod manager;
pub mod resolver;

pub use resolver::{resolve_name, NAME_UNAVAILABLE};
