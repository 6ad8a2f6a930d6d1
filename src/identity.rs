//! Sender identity resolution.
//!
//! The network may address the same person by phone-number JID or by hidden-user
//! JID (LID). Everything downstream keys on the phone-number form, so LIDs are
//! mapped back through the store first.
//!
//! CHANGELOG:
//! - 10/18/2026 - Initial implementation

use tracing::debug;

use crate::jid::{AddressKind, Jid};
use crate::store::LidStore;

/// Resolve the user-portion that identifies a sender.
///
/// For a LID sender: the mapped phone number when the store knows one, otherwise
/// the LID's own user-portion. The fallback may not be a real phone number and is
/// not flagged as such.
pub fn resolve_phone_user(lids: &dyn LidStore, sender: &Jid) -> String {
    if sender.kind() != AddressKind::HiddenUser {
        return sender.user.clone();
    }

    match lids.pn_for_lid(sender) {
        Ok(Some(pn)) if !pn.user.is_empty() => pn.user,
        Ok(_) => {
            debug!(lid = %sender, "no phone number mapped for LID, using LID user");
            sender.user.clone()
        }
        Err(e) => {
            debug!(lid = %sender, error = %e, "LID lookup failed, using LID user");
            sender.user.clone()
        }
    }
}

/// Resolve a sender to its stable identity on the standard user server.
pub fn resolve_sender(lids: &dyn LidStore, sender: &Jid) -> Jid {
    Jid::user_jid(resolve_phone_user(lids, sender))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{Error, Result};
    use crate::jid::DEFAULT_USER_SERVER;

    enum Lookup {
        Found(Jid),
        Missing,
        Fails,
    }

    struct FixedLids {
        lookup: Lookup,
        calls: std::sync::atomic::AtomicUsize,
    }

    impl FixedLids {
        fn new(lookup: Lookup) -> Self {
            Self {
                lookup,
                calls: std::sync::atomic::AtomicUsize::new(0),
            }
        }
    }

    impl LidStore for FixedLids {
        fn pn_for_lid(&self, _lid: &Jid) -> Result<Option<Jid>> {
            self.calls.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
            match &self.lookup {
                Lookup::Found(jid) => Ok(Some(jid.clone())),
                Lookup::Missing => Ok(None),
                Lookup::Fails => Err(Error::ConnectionClosed),
            }
        }

        fn put_lid_mapping(&self, _lid: &Jid, _pn: &Jid) -> Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_phone_sender_used_directly() {
        let lids = FixedLids::new(Lookup::Fails);
        let sender: Jid = "15551230000:7@s.whatsapp.net".parse().unwrap();
        let identity = resolve_sender(&lids, &sender);
        assert_eq!(identity, Jid::new("15551230000", DEFAULT_USER_SERVER));
        assert_eq!(lids.calls.load(std::sync::atomic::Ordering::SeqCst), 0);
    }

    #[test]
    fn test_legacy_server_normalized() {
        let lids = FixedLids::new(Lookup::Missing);
        let identity = resolve_sender(&lids, &Jid::new("15551230000", "c.us"));
        assert_eq!(identity.to_string(), "15551230000@s.whatsapp.net");
    }

    #[test]
    fn test_lid_resolved_through_store() {
        let lids = FixedLids::new(Lookup::Found(Jid::user_jid("15559998888")));
        let identity = resolve_sender(&lids, &Jid::new("8327492374", "lid"));
        assert_eq!(identity, Jid::user_jid("15559998888"));
    }

    #[test]
    fn test_lid_fallback_when_missing_or_failing() {
        let sender = Jid::new("8327492374", "lid");
        for lookup in [Lookup::Missing, Lookup::Fails, Lookup::Found(Jid::default())] {
            let lids = FixedLids::new(lookup);
            assert_eq!(resolve_sender(&lids, &sender), Jid::user_jid("8327492374"));
        }
    }

    #[test]
    fn test_agent_segment_not_part_of_identity() {
        let sender: Jid = "8327492374.1:3@lid".parse().unwrap();
        let lids = FixedLids::new(Lookup::Missing);
        assert_eq!(resolve_sender(&lids, &sender), Jid::user_jid("8327492374"));
    }
}
