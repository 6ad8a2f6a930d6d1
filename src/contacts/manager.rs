//! Contacts file loading - import saved names into the store.
//!
//! CHANGELOG:
//! - 10/18/2026 - Reworked for WhatsApp JIDs and the SQLite contact store

use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::jid::Jid;
use crate::store::{ContactStore, ContactUpdate};

/// A contact from a contacts JSON file.
///
/// Either `jid` or `phone` must be set; `phone` is reduced to digits.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContactEntry {
    #[serde(default)]
    pub jid: Option<Jid>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(flatten)]
    pub names: ContactUpdate,
}

impl ContactEntry {
    /// Stable identity this entry is keyed by.
    pub fn identity(&self) -> Option<Jid> {
        if let Some(jid) = &self.jid {
            return Some(Jid::user_jid(jid.user.clone()));
        }
        let digits = normalize_phone(self.phone.as_deref()?);
        if digits.is_empty() {
            None
        } else {
            Some(Jid::user_jid(digits))
        }
    }
}

/// Wrapper for the `{"contacts": [...]}` format.
#[derive(Debug, Deserialize)]
struct ContactsFile {
    contacts: Vec<ContactEntry>,
}

/// Load contacts from a JSON file.
///
/// Supports both formats:
/// - `{"contacts": [...]}`
/// - `[...]` (flat array)
pub fn load<P: AsRef<Path>>(path: P) -> Result<Vec<ContactEntry>> {
    let content = std::fs::read_to_string(path.as_ref())
        .with_context(|| format!("Failed to read contacts file: {:?}", path.as_ref()))?;
    parse(&content)
}

fn parse(content: &str) -> Result<Vec<ContactEntry>> {
    if let Ok(wrapper) = serde_json::from_str::<ContactsFile>(content) {
        return Ok(wrapper.contacts);
    }
    serde_json::from_str(content).with_context(|| "Failed to parse contacts JSON")
}

/// Write every entry into the store. Returns how many were imported.
pub fn import(store: &dyn ContactStore, entries: &[ContactEntry]) -> Result<usize> {
    let mut imported = 0;
    for entry in entries {
        let jid = entry
            .identity()
            .ok_or_else(|| anyhow!("Contact entry has neither jid nor phone: {:?}", entry))?;
        store
            .put_contact(&jid, &entry.names)
            .with_context(|| format!("Failed to store contact {}", jid))?;
        imported += 1;
    }
    Ok(imported)
}

/// Normalize phone number to digits only (the JID user form).
fn normalize_phone(phone: &str) -> String {
    phone.chars().filter(|c| c.is_ascii_digit()).collect()
}
