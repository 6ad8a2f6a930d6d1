//! Output formatting and the normalized-event sinks.
//!
//! CHANGELOG:
//! - 10/18/2026 - Added log and NDJSON event sinks, char-safe truncation

use serde::Serialize;
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::info;

use crate::pipeline::{EventSink, NormalizedEvent};

/// Output control settings from CLI flags.
#[derive(Debug, Clone, Default)]
pub struct OutputControls {
    pub json: bool,
    pub compact: bool,
    pub fields: Option<String>,
    pub max_text_chars: Option<u32>,
}

impl OutputControls {
    /// Emit data according to output controls.
    pub fn emit<T: Serialize>(&self, data: &T) -> String {
        let value = self.shape(data);
        if self.compact {
            serde_json::to_string(&value).unwrap_or_else(|_| "{}".to_string())
        } else {
            serde_json::to_string_pretty(&value).unwrap_or_else(|_| "{}".to_string())
        }
    }

    /// Emit data as a single NDJSON line (no trailing newline).
    pub fn emit_line<T: Serialize>(&self, data: &T) -> String {
        serde_json::to_string(&self.shape(data)).unwrap_or_else(|_| "{}".to_string())
    }

    /// Print data to stdout according to output controls.
    pub fn print<T: Serialize>(&self, data: &T) {
        println!("{}", self.emit(data));
    }

    fn shape<T: Serialize>(&self, data: &T) -> Value {
        let value = serde_json::to_value(data).unwrap_or(json!(null));

        let filtered = match self.fields {
            Some(ref fields) => filter_fields(&value, fields),
            None => value,
        };

        match self.max_text_chars {
            Some(max_chars) => truncate_text_fields(&filtered, max_chars as usize),
            None => filtered,
        }
    }
}

/// Logs each normalized event through `tracing`.
pub struct LogSink {
    max_text_chars: Option<usize>,
}

impl LogSink {
    pub fn new(max_text_chars: Option<u32>) -> Self {
        Self {
            max_text_chars: max_text_chars.map(|n| n as usize),
        }
    }
}

impl EventSink for LogSink {
    fn emit(&self, event: &NormalizedEvent) {
        let text = match self.max_text_chars {
            Some(max) => truncate(&event.text, max),
            None => event.text.clone(),
        };
        if event.chat != event.sender {
            info!(
                sender = %event.sender,
                sender_name = %event.sender_name,
                chat = %event.chat,
                text = %text,
                "new message"
            );
        } else {
            info!(
                sender = %event.sender,
                sender_name = %event.sender_name,
                text = %text,
                "new message"
            );
        }
    }
}

/// Writes each normalized event to stdout as one JSON line.
pub struct JsonLinesSink {
    controls: OutputControls,
}

impl JsonLinesSink {
    pub fn new(controls: OutputControls) -> Self {
        Self { controls }
    }
}

impl EventSink for JsonLinesSink {
    fn emit(&self, event: &NormalizedEvent) {
        println!("{}", self.controls.emit_line(event));
    }
}

/// Pick the sink matching the output flags.
pub fn event_sink(controls: &OutputControls) -> Arc<dyn EventSink> {
    if controls.json {
        Arc::new(JsonLinesSink::new(controls.clone()))
    } else {
        Arc::new(LogSink::new(controls.max_text_chars))
    }
}

/// Filter JSON value to only include specified fields.
fn filter_fields(value: &Value, fields: &str) -> Value {
    let field_list: Vec<&str> = fields.split(',').map(|s| s.trim()).collect();

    match value {
        Value::Array(arr) => Value::Array(arr.iter().map(|v| filter_fields(v, fields)).collect()),
        Value::Object(map) => {
            let mut filtered = serde_json::Map::new();
            for field in &field_list {
                if let Some(v) = map.get(*field) {
                    filtered.insert(field.to_string(), v.clone());
                }
            }
            Value::Object(filtered)
        }
        _ => value.clone(),
    }
}

/// Truncate to `max_chars` characters, marking the cut with "...".
fn truncate(s: &str, max_chars: usize) -> String {
    match s.char_indices().nth(max_chars) {
        Some((idx, _)) => format!("{}...", &s[..idx]),
        None => s.to_string(),
    }
}

/// Truncate string fields in JSON value.
fn truncate_text_fields(value: &Value, max_chars: usize) -> Value {
    match value {
        Value::String(s) => Value::String(truncate(s, max_chars)),
        Value::Array(arr) => {
            Value::Array(arr.iter().map(|v| truncate_text_fields(v, max_chars)).collect())
        }
        Value::Object(map) => {
            let mut truncated = serde_json::Map::new();
            for (k, v) in map {
                truncated.insert(k.clone(), truncate_text_fields(v, max_chars));
            }
            Value::Object(truncated)
        }
        _ => value.clone(),
    }
}

/// Format error as JSON.
pub fn format_error(error: &str) -> String {
    serde_json::to_string(&json!({
        "error": error,
        "success": false
    }))
    .unwrap_or_else(|_| format!(r#"{{"error":"{}"}}"#, error))
}
