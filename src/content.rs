//! Inbound message payloads and plain-text extraction.
//!
//! The payload is a container of optional sub-messages; which one is set depends on
//! the message type. Only the text-bearing shapes are read here.
//!
//! CHANGELOG:
//! - 10/18/2026 - Initial implementation

use serde::{Deserialize, Serialize};

/// Raw message payload as delivered by the bridge (camelCase, unknown shapes ignored).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessagePayload {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub conversation: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extended_text_message: Option<ExtendedTextMessage>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_message: Option<MediaMessage>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub video_message: Option<MediaMessage>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub document_message: Option<MediaMessage>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reaction_message: Option<ReactionMessage>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtendedTextMessage {
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub matched_text: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MediaMessage {
    #[serde(default)]
    pub caption: Option<String>,
    #[serde(default)]
    pub mimetype: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReactionMessage {
    #[serde(default)]
    pub text: Option<String>,
}

impl MessagePayload {
    pub fn conversation(&self) -> &str {
        self.conversation.as_deref().unwrap_or("")
    }

    pub fn extended_text(&self) -> &str {
        self.extended_text_message
            .as_ref()
            .and_then(|m| m.text.as_deref())
            .unwrap_or("")
    }
}

/// Extract plain text from a message payload.
///
/// Order:
/// 1. `conversation` if non-empty
/// 2. `extendedTextMessage.text`
///
/// Anything else (media, reactions, templates) yields an empty string.
pub fn extract_text(payload: &MessagePayload) -> String {
    let text = payload.conversation();
    if !text.is_empty() {
        return text.to_string();
    }
    payload.extended_text().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_conversation_wins_over_extended() {
        let payload = MessagePayload {
            conversation: Some("hello".to_string()),
            extended_text_message: Some(ExtendedTextMessage {
                text: Some("ignored".to_string()),
                matched_text: None,
            }),
            ..Default::default()
        };
        assert_eq!(extract_text(&payload), "hello");
    }

    #[test]
    fn test_empty_conversation_falls_back() {
        let payload = MessagePayload {
            conversation: Some(String::new()),
            extended_text_message: Some(ExtendedTextMessage {
                text: Some("meeting at 5".to_string()),
                matched_text: None,
            }),
            ..Default::default()
        };
        assert_eq!(extract_text(&payload), "meeting at 5");
    }

    #[test]
    fn test_media_only_is_empty() {
        let payload = MessagePayload {
            image_message: Some(MediaMessage {
                caption: Some("look at this".to_string()),
                mimetype: Some("image/jpeg".to_string()),
            }),
            ..Default::default()
        };
        assert_eq!(extract_text(&payload), "");
        assert_eq!(extract_text(&MessagePayload::default()), "");
    }

    #[test]
    fn test_deserialize_bridge_payload() {
        let json = r#"{"extendedTextMessage":{"text":"see https://x.y","matchedText":"https://x.y"},"messageContextInfo":{"deviceListMetadata":{}}}"#;
        let payload: MessagePayload = serde_json::from_str(json).unwrap();
        assert_eq!(extract_text(&payload), "see https://x.y");
    }
}
