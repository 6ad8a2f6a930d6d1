//! Per-event normalization: classify, resolve identity and name, extract text.
//!
//! CHANGELOG:
//! - 10/18/2026 - Initial implementation

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, info};

use crate::classifier::{classify, Classification};
use crate::contacts::resolve_name;
use crate::content::extract_text;
use crate::events::{Event, EventHandler, MessageEvent};
use crate::identity::resolve_sender;
use crate::jid::Jid;
use crate::store::{ContactStore, LidStore};

/// A message reduced to who sent it, where, and what it says.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NormalizedEvent {
    /// Sender on the standard user server, LIDs resolved where possible.
    pub sender: Jid,
    pub sender_name: String,
    pub chat: Jid,
    pub text: String,
    pub message_id: String,
    pub timestamp: DateTime<Utc>,
    pub is_group: bool,
}

/// Consumer of normalized events.
pub trait EventSink: Send + Sync {
    fn emit(&self, event: &NormalizedEvent);
}

/// Read-only resolution against the store.
#[derive(Clone)]
pub struct Normalizer {
    lids: Arc<dyn LidStore>,
    contacts: Arc<dyn ContactStore>,
}

impl Normalizer {
    pub fn new(lids: Arc<dyn LidStore>, contacts: Arc<dyn ContactStore>) -> Self {
        Self { lids, contacts }
    }

    pub fn normalize(&self, message: &MessageEvent, is_group: bool) -> NormalizedEvent {
        let sender = resolve_sender(self.lids.as_ref(), &message.info.sender);
        let sender_name = resolve_name(self.contacts.as_ref(), &sender);

        NormalizedEvent {
            sender,
            sender_name,
            chat: message.info.chat.clone(),
            text: extract_text(&message.message),
            message_id: message.info.id.clone(),
            timestamp: message.info.timestamp,
            is_group,
        }
    }
}

/// The handler registered on the connection.
pub struct MessageHandler {
    normalizer: Normalizer,
    sink: Arc<dyn EventSink>,
}

impl MessageHandler {
    pub fn new(normalizer: Normalizer, sink: Arc<dyn EventSink>) -> Self {
        Self { normalizer, sink }
    }

    /// Handle one event. Returns the normalized event when one was emitted.
    pub fn handle(&self, event: &Event) -> Option<NormalizedEvent> {
        let Some((message, classification)) = classify(event) else {
            debug!(kind = event.kind(), "ignoring event");
            return None;
        };

        match classification {
            Classification::Status => {
                info!(chat = %message.info.chat, id = %message.info.id, "new status update");
                None
            }
            Classification::DirectOrGroup { is_group } => {
                let normalized = self.normalizer.normalize(message, is_group);
                self.sink.emit(&normalized);
                Some(normalized)
            }
        }
    }

    pub fn into_event_handler(self: Arc<Self>) -> EventHandler {
        Arc::new(move |event: &Event| {
            self.handle(event);
        })
    }
}
