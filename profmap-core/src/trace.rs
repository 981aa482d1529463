//! Trace file model
//!
//! A trace is either a bare JSON array of events or an object whose
//! `traceEvents` key holds the array. Both shapes are written back the way
//! they were read, with field order preserved.

use crate::error::{Error, Result};
use serde_json::{Map, Value};
use std::path::Path;

const TRACE_EVENTS_KEY: &str = "traceEvents";

/// Parsed trace events plus the envelope they came in
#[derive(Debug, Clone, PartialEq)]
pub struct TraceDocument {
    events: Vec<Value>,
    /// Enclosing object for the `{"traceEvents": [...]}` shape
    envelope: Option<Map<String, Value>>,
}

/// Source location annotation carried in an event's `args`
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SourcePointer {
    /// Line in the generated file (1-indexed)
    pub line: u32,
    /// Column in the generated file (0-indexed)
    pub column: u32,
    pub url: String,
}

impl TraceDocument {
    pub fn from_events(events: Vec<Value>) -> Self {
        TraceDocument {
            events,
            envelope: None,
        }
    }

    /// Parse a trace from JSON text
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        match serde_json::from_str::<Value>(json)? {
            Value::Array(events) => Ok(TraceDocument::from_events(events)),
            Value::Object(mut map) => {
                // Leave a placeholder so the key keeps its position
                match map.get_mut(TRACE_EVENTS_KEY).map(Value::take) {
                    Some(Value::Array(events)) => Ok(TraceDocument {
                        events,
                        envelope: Some(map),
                    }),
                    _ => Err(unexpected_shape()),
                }
            }
            _ => Err(unexpected_shape()),
        }
    }

    /// Read and parse a trace file
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
        Self::from_json(&contents).map_err(|e| Error::Json {
            path: path.to_path_buf(),
            source: e,
        })
    }

    pub fn events(&self) -> &[Value] {
        &self.events
    }

    pub fn into_events(self) -> Vec<Value> {
        self.events
    }

    /// Move the events out, leaving the envelope in place
    pub fn take_events(&mut self) -> Vec<Value> {
        std::mem::take(&mut self.events)
    }

    /// Replace the events, keeping the envelope
    pub fn with_events(self, events: Vec<Value>) -> Self {
        TraceDocument {
            events,
            envelope: self.envelope,
        }
    }

    fn to_value(&self) -> Value {
        let events = Value::Array(self.events.clone());
        match &self.envelope {
            None => events,
            Some(map) => {
                let mut map = map.clone();
                map.insert(TRACE_EVENTS_KEY.to_string(), events);
                Value::Object(map)
            }
        }
    }

    /// Serialize as compact JSON
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(&self.to_value())
    }

    /// Write the whole trace to `path`, replacing any existing file
    pub fn write(&self, path: &Path) -> Result<()> {
        let json = self.to_json().map_err(|e| Error::Json {
            path: path.to_path_buf(),
            source: e,
        })?;
        std::fs::write(path, json).map_err(|e| Error::io(path, e))
    }
}

fn unexpected_shape() -> serde_json::Error {
    <serde_json::Error as serde::de::Error>::custom(
        "expected an array of trace events or an object with a traceEvents array",
    )
}

/// Extract the source pointer from an event, if it carries one
///
/// Requires numeric `args.line` and `args.column` and a string `args.url`.
pub fn source_pointer(event: &Value) -> Option<SourcePointer> {
    let args = event.get("args")?;
    Some(SourcePointer {
        line: as_position(args.get("line")?)?,
        column: as_position(args.get("column")?)?,
        url: args.get("url")?.as_str()?.to_string(),
    })
}

/// Accept any non-negative JSON number; fractional values are truncated
fn as_position(value: &Value) -> Option<u32> {
    if let Some(n) = value.as_u64() {
        return u32::try_from(n).ok();
    }
    let n = value.as_f64()?;
    if n.is_finite() && n >= 0.0 && n <= u32::MAX as f64 {
        Some(n as u32)
    } else {
        None
    }
}

/// Display name of an event
pub fn event_name(event: &Value) -> Option<&str> {
    event.get("name")?.as_str()
}
