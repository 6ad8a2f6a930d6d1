//! Inbound events and the handler registry that fans them out.
//!
//! CHANGELOG:
//! - 10/18/2026 - Initial implementation

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, RwLock};

use crate::content::MessagePayload;
use crate::jid::Jid;
use crate::store::ContactUpdate;

/// Envelope data of an inbound message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MessageInfo {
    pub id: String,
    pub sender: Jid,
    pub chat: Jid,
    #[serde(default)]
    pub is_from_me: bool,
    #[serde(default)]
    pub push_name: Option<String>,
    #[serde(default, with = "chrono::serde::ts_seconds")]
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MessageEvent {
    pub info: MessageInfo,
    #[serde(default)]
    pub message: MessagePayload,
}

/// Everything the connection can deliver to registered handlers.
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    Message(Box<MessageEvent>),
    Connected,
    Disconnected,
    LoggedOut { reason: Option<String> },
    Contact { jid: Jid, update: ContactUpdate },
    LidMapping { lid: Jid, pn: Jid },
    /// Event kind this build does not model.
    Unknown { kind: String },
}

impl Event {
    pub fn kind(&self) -> &str {
        match self {
            Event::Message(_) => "message",
            Event::Connected => "connected",
            Event::Disconnected => "disconnected",
            Event::LoggedOut { .. } => "logged_out",
            Event::Contact { .. } => "contact",
            Event::LidMapping { .. } => "lid_mapping",
            Event::Unknown { kind } => kind,
        }
    }
}

pub type EventHandler = Arc<dyn Fn(&Event) + Send + Sync>;

/// Token returned on registration, used to unregister.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HandlerId(u32);

/// Subscriber table owned by an event source.
pub struct EventBus {
    handlers: RwLock<Vec<(HandlerId, EventHandler)>>,
    next_id: AtomicU32,
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

impl EventBus {
    pub fn new() -> Self {
        Self {
            handlers: RwLock::new(Vec::new()),
            next_id: AtomicU32::new(1),
        }
    }

    pub fn add_handler(&self, handler: EventHandler) -> HandlerId {
        let id = HandlerId(self.next_id.fetch_add(1, Ordering::Relaxed));
        self.handlers
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push((id, handler));
        id
    }

    pub fn remove_handler(&self, id: HandlerId) -> bool {
        let mut handlers = self
            .handlers
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        let before = handlers.len();
        handlers.retain(|(hid, _)| *hid != id);
        handlers.len() < before
    }

    pub fn len(&self) -> usize {
        self.handlers
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Call every handler with `event`, in registration order.
    ///
    /// Handlers run outside the table lock, so they may (un)register handlers.
    pub fn dispatch(&self, event: &Event) {
        let handlers: Vec<EventHandler> = self
            .handlers
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .iter()
            .map(|(_, handler)| Arc::clone(handler))
            .collect();

        for handler in handlers {
            handler(event);
        }
    }
}
