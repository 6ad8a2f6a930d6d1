//! wolfies-whatsapp library
//!
//! Session bootstrap and message normalization for a WhatsApp account reached
//! through a protocol bridge sidecar.
//!
//! CHANGELOG:
//! - 10/18/2026 - Initial library structure

// Core modules
pub mod bootstrap;
pub mod classifier;
pub mod content;
pub mod error;
pub mod events;
pub mod identity;
pub mod jid;
pub mod pipeline;
pub mod transport;

// Persistence and names
pub mod contacts;
pub mod store;

// Bridge and CLI plumbing
pub mod bridge;
pub mod commands;
pub mod config;
pub mod output;
pub mod render;

pub use error::{Error, Result};
