//! Inbound event classification.
//!
//! CHANGELOG:
//! - 10/18/2026 - Initial implementation

use crate::events::{Event, MessageEvent};
use crate::jid::AddressKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Classification {
    /// Status update or broadcast list: no human sender to resolve.
    Status,
    /// 1:1 or group conversation message.
    DirectOrGroup { is_group: bool },
}

/// Classify a message event by its chat address.
pub fn classify_message(message: &MessageEvent) -> Classification {
    match message.info.chat.kind() {
        AddressKind::Broadcast => Classification::Status,
        AddressKind::Group => Classification::DirectOrGroup { is_group: true },
        _ => Classification::DirectOrGroup { is_group: false },
    }
}

/// Classify any event. `None` for kinds other than incoming messages.
pub fn classify(event: &Event) -> Option<(&MessageEvent, Classification)> {
    match event {
        Event::Message(message) => Some((message.as_ref(), classify_message(message))),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::MessageInfo;
    use crate::jid::Jid;

    fn message(chat: &str) -> MessageEvent {
        MessageEvent {
            info: MessageInfo {
                id: "ABC".to_string(),
                sender: Jid::user_jid("15551230000"),
                chat: chat.parse().unwrap(),
                is_from_me: false,
                push_name: None,
                timestamp: Default::default(),
            },
            message: Default::default(),
        }
    }

    #[test]
    fn test_status_broadcast() {
        assert_eq!(classify_message(&message("status@broadcast")), Classification::Status);
        assert_eq!(classify_message(&message("1234567@broadcast")), Classification::Status);
    }

    #[test]
    fn test_direct_and_group() {
        assert_eq!(
            classify_message(&message("15551230000@s.whatsapp.net")),
            Classification::DirectOrGroup { is_group: false }
        );
        assert_eq!(
            classify_message(&message("120363021234567890@g.us")),
            Classification::DirectOrGroup { is_group: true }
        );
    }

    #[test]
    fn test_non_message_events_ignored() {
        assert!(classify(&Event::Connected).is_none());
        assert!(classify(&Event::Unknown { kind: "receipt".to_string() }).is_none());
        let event = Event::Message(Box::new(message("status@broadcast")));
        assert_eq!(classify(&event).map(|(_, c)| c), Some(Classification::Status));
    }
}
