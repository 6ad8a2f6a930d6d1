//! Protocol bridge: NDJSON over a UNIX socket to the sidecar that speaks WhatsApp.
//!
//! CHANGELOG:
//! - 10/18/2026 - Initial module structure

pub mod client;
pub mod protocol;

pub use client::BridgeClient;
