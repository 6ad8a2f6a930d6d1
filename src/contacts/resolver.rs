//! Display-name resolution for a stable identity.
//!
//! CHANGELOG:
//! - 10/18/2026 - Initial implementation

use tracing::debug;

use crate::jid::Jid;
use crate::store::{ContactInfo, ContactStore};

/// Shown when no contact record exists or the lookup failed.
pub const NAME_UNAVAILABLE: &str = "Error fetching name";

/// Best saved name for a contact: full name, then first name, then push name.
///
/// Returns an empty string when the record exists but every field is empty.
pub fn best_name(contact: &ContactInfo) -> &str {
    [&contact.full_name, &contact.first_name, &contact.push_name]
        .into_iter()
        .find(|name| !name.is_empty())
        .map(String::as_str)
        .unwrap_or("")
}

/// Resolve the display name for `identity`. Never fails.
pub fn resolve_name(contacts: &dyn ContactStore, identity: &Jid) -> String {
    match contacts.get_contact(identity) {
        Ok(contact) if contact.found => best_name(&contact).to_string(),
        Ok(_) => NAME_UNAVAILABLE.to_string(),
        Err(e) => {
            debug!(jid = %identity, error = %e, "contact lookup failed");
            NAME_UNAVAILABLE.to_string()
        }
    }
}
