//! The connection seam: pairing stream, connect/disconnect, handler registration.
//!
//! CHANGELOG:
//! - 10/18/2026 - Initial implementation

use async_trait::async_trait;
use std::time::Duration;
use tokio::sync::mpsc;

use crate::error::Result;
use crate::events::{EventHandler, HandlerId};
use crate::jid::Jid;
use crate::store::DeviceSession;

/// Events on the pairing stream.
#[derive(Debug, Clone, PartialEq)]
pub enum PairingEvent {
    /// A linking code to show the user; replaced by the next one when it expires.
    Code { code: String, timeout: Duration },
    Success { id: Jid },
    Timeout,
    Error { message: String },
    Other { kind: String },
}

impl PairingEvent {
    pub fn kind(&self) -> &str {
        match self {
            PairingEvent::Code { .. } => "code",
            PairingEvent::Success { .. } => "success",
            PairingEvent::Timeout => "timeout",
            PairingEvent::Error { .. } => "error",
            PairingEvent::Other { kind } => kind,
        }
    }

    /// Whether the stream closes after this event.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            PairingEvent::Success { .. } | PairingEvent::Timeout | PairingEvent::Error { .. }
        )
    }
}

/// Closed by the sender once pairing finishes either way. Unbounded so the
/// connection's reader never waits on the pairing loop.
pub type PairingStream = mpsc::UnboundedReceiver<PairingEvent>;

#[async_trait]
pub trait Transport: Send + Sync {
    /// Open the pairing stream. Must be called before `connect` on a fresh device.
    async fn pairing_stream(&self) -> Result<PairingStream>;

    /// Connect, resuming `device` when given, otherwise starting a pairing.
    async fn connect(&self, device: Option<&DeviceSession>) -> Result<()>;

    async fn disconnect(&self) -> Result<()>;

    fn add_event_handler(&self, handler: EventHandler) -> HandlerId;

    fn remove_event_handler(&self, id: HandlerId) -> bool;
}
