//! Library error type.
//!
//! CHANGELOG:
//! - 10/18/2026 - Initial implementation

use thiserror::Error;

/// Errors surfaced by the store, the bridge client and the session bootstrap.
#[derive(Error, Debug)]
pub enum Error {
    #[error("Store error: {0}")]
    Store(#[from] rusqlite::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Bridge error [{code}]: {message}")]
    Bridge { code: String, message: String },

    #[error("Bridge connection closed")]
    ConnectionClosed,

    #[error("Invalid JID: {0}")]
    InvalidJid(String),
}

impl Error {
    pub fn bridge(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Bridge {
            code: code.into(),
            message: message.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
