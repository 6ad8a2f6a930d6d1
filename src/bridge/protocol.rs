//! Bridge protocol types for NDJSON communication over UNIX socket.
//!
//! Requests and responses use the same envelope as the other wolfies sockets:
//! `{"id", "v", "method", "params"}` / `{"id", "ok", "result", "error"}`.
//! Unsolicited frames from the bridge carry an `"event"` tag instead of an id.
//!
//! CHANGELOG:
//! - 10/18/2026 - Initial protocol types, with event frames

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

use crate::error::{Error, Result};
use crate::events::MessageEvent;
use crate::jid::Jid;

pub const PROTOCOL_VERSION: u8 = 1;

/// Linking codes are valid for this long when the bridge does not say.
pub const DEFAULT_CODE_TIMEOUT_SECS: u64 = 20;

/// NDJSON request from client to bridge.
#[derive(Debug, Serialize, Deserialize)]
pub struct Request {
    /// Unique request ID (UUID)
    pub id: String,
    /// Protocol version (currently 1)
    pub v: u8,
    /// Method name ("connect", "disconnect")
    pub method: String,
    /// Method parameters (empty object if none)
    pub params: Value,
}

/// NDJSON response from bridge to client.
#[derive(Debug, Serialize, Deserialize)]
pub struct Response {
    /// Request ID (matches request)
    pub id: String,
    /// Success flag
    pub ok: bool,
    /// Result data (if successful)
    #[serde(default)]
    pub result: Option<Value>,
    /// Error information (if failed)
    #[serde(default)]
    pub error: Option<ErrorInfo>,
}

/// Error details in response.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorInfo {
    /// Error code (e.g., "ERROR", "NOT_PAIRED")
    pub code: String,
    /// Human-readable error message
    pub message: String,
    /// Additional error details (optional)
    #[serde(default)]
    pub details: Option<Value>,
}

impl Request {
    pub fn new(method: impl Into<String>, params: Value) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            v: PROTOCOL_VERSION,
            method: method.into(),
            params,
        }
    }

    /// Create a request with no parameters.
    pub fn no_params(method: impl Into<String>) -> Self {
        Self::new(method, Value::Object(serde_json::Map::new()))
    }

    /// Serialize request to NDJSON line.
    pub fn to_ndjson_line(&self) -> Result<String> {
        let json = serde_json::to_string(self)?;
        Ok(format!("{}\n", json))
    }
}

impl Response {
    /// Result payload, or the bridge error.
    pub fn into_result(self) -> Result<Value> {
        if self.ok {
            return Ok(self.result.unwrap_or(Value::Null));
        }
        Err(match self.error {
            Some(e) => Error::bridge(e.code, e.message),
            None => Error::bridge("ERROR", "unknown error"),
        })
    }
}

/// Unsolicited frames pushed by the bridge.
#[derive(Debug, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum WireEvent {
    PairCode {
        code: String,
        #[serde(default = "default_code_timeout")]
        timeout: u64,
    },
    PairSuccess {
        id: Jid,
        push_name: Option<String>,
        platform: Option<String>,
    },
    PairTimeout,
    PairError {
        message: String,
    },
    Message(MessageEvent),
    Connected,
    Disconnected,
    LoggedOut {
        reason: Option<String>,
    },
    Contact {
        jid: Jid,
        full_name: Option<String>,
        first_name: Option<String>,
        push_name: Option<String>,
        business_name: Option<String>,
    },
    LidMapping {
        lid: Jid,
        pn: Jid,
    },
}

fn default_code_timeout() -> u64 {
    DEFAULT_CODE_TIMEOUT_SECS
}

/// One parsed line from the bridge.
#[derive(Debug)]
pub enum Frame {
    Response(Response),
    Event(WireEvent),
    /// Event kind not modelled by [`WireEvent`].
    UnknownEvent { kind: String },
}

/// Parse a frame from an NDJSON line.
pub fn parse_frame(line: &str) -> Result<Frame> {
    let value: Value = serde_json::from_str(line)?;

    let Some(kind) = value.get("event").and_then(Value::as_str).map(str::to_string) else {
        return Ok(Frame::Response(serde_json::from_value(value)?));
    };

    match serde_json::from_value::<WireEvent>(value) {
        Ok(event) => Ok(Frame::Event(event)),
        Err(e) if is_known_event(&kind) => {
            warn!(kind = %kind, error = %e, "malformed bridge event");
            Err(Error::Json(e))
        }
        Err(_) => {
            debug!(kind = %kind, "unmodelled bridge event");
            Ok(Frame::UnknownEvent { kind })
        }
    }
}

fn is_known_event(kind: &str) -> bool {
    matches!(
        kind,
        "pair_code"
            | "pair_success"
            | "pair_timeout"
            | "pair_error"
            | "message"
            | "connected"
            | "disconnected"
            | "logged_out"
            | "contact"
            | "lid_mapping"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_line() {
        let req = Request::new("connect", serde_json::json!({"device": "1:2@s.whatsapp.net"}));
        let line = req.to_ndjson_line().unwrap();
        assert!(line.ends_with('\n'));
        let back: Request = serde_json::from_str(line.trim_end()).unwrap();
        assert_eq!(back.v, PROTOCOL_VERSION);
        assert_eq!(back.method, "connect");
        assert_eq!(back.id, req.id);
    }

    #[test]
    fn test_parse_response() {
        let frame = parse_frame(r#"{"id":"a","ok":false,"error":{"code":"NOT_PAIRED","message":"no session"}}"#).unwrap();
        let Frame::Response(resp) = frame else {
            panic!("expected response");
        };
        match resp.into_result() {
            Err(Error::Bridge { code, .. }) => assert_eq!(code, "NOT_PAIRED"),
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[test]
    fn test_parse_pair_code_default_timeout() {
        let frame = parse_frame(r#"{"event":"pair_code","code":"2@abc,def"}"#).unwrap();
        match frame {
            Frame::Event(WireEvent::PairCode { code, timeout }) => {
                assert_eq!(code, "2@abc,def");
                assert_eq!(timeout, DEFAULT_CODE_TIMEOUT_SECS);
            }
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[test]
    fn test_parse_message_event() {
        let line = r#"{"event":"message","info":{"id":"X","sender":"15551230000@s.whatsapp.net","chat":"15551230000@s.whatsapp.net","timestamp":1760000000},"message":{"conversation":"hello"}}"#;
        match parse_frame(line).unwrap() {
            Frame::Event(WireEvent::Message(msg)) => {
                assert_eq!(msg.message.conversation.as_deref(), Some("hello"));
            }
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[test]
    fn test_unknown_event_tolerated() {
        match parse_frame(r#"{"event":"receipt","type":"read"}"#).unwrap() {
            Frame::UnknownEvent { kind } => assert_eq!(kind, "receipt"),
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[test]
    fn test_malformed_known_event_is_error() {
        assert!(parse_frame(r#"{"event":"lid_mapping","lid":"1@lid"}"#).is_err());
    }
}
