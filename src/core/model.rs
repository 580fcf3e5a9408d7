//! Shared record types: app metadata, tracker boards and filed issues.
//!
//! App records are owned by the inventory and arrive as loose JSON; only the
//! pieces the checkpoint reads (`name` and the escalation board) are typed.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A tracker destination. `name` is the project key, `url` the server base URL.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Board {
    pub name: String,
    pub url: String,
}

impl Board {
    pub fn new(name: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            url: url.into(),
        }
    }
}

/// An issue created by the tracker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Issue {
    pub key: String,
    #[serde(default)]
    pub url: Option<String>,
}

impl std::fmt::Display for Issue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.url {
            Some(url) => write!(f, "{} ({})", self.key, url),
            None => write!(f, "{}", self.key),
        }
    }
}

/// Read-only view over an app record.
#[derive(Debug, Clone, Copy)]
pub struct AppRecord<'a> {
    raw: &'a Value,
}

impl<'a> AppRecord<'a> {
    pub fn new(raw: &'a Value) -> Self {
        Self { raw }
    }

    pub fn name(&self) -> &'a str {
        self.raw.get("name").and_then(Value::as_str).unwrap_or("")
    }

    /// Current value of a metadata field; `None` when absent.
    pub fn field(&self, field: &str) -> Option<&'a Value> {
        self.raw.get(field)
    }

    /// The board declared under `escalationPolicy.channels.jiraBoard`.
    ///
    /// Accepts a single board object or a list of boards (first entry wins).
    pub fn board(&self) -> Option<Board> {
        let declared = self
            .raw
            .get("escalationPolicy")?
            .get("channels")?
            .get("jiraBoard")?;
        let candidate = match declared {
            Value::Array(items) => items.first()?,
            Value::Object(_) => declared,
            _ => return None,
        };
        serde_json::from_value(candidate.clone()).ok()
    }
}

/// Jinja-style truthiness of a raw value: absent, null, false, zero and empty
/// containers are falsy.
pub fn is_truthy(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => false,
        Some(Value::Bool(b)) => *b,
        Some(Value::Number(n)) => n.as_f64().is_some_and(|f| f != 0.0),
        Some(Value::String(s)) => !s.is_empty(),
        Some(Value::Array(items)) => !items.is_empty(),
        Some(Value::Object(map)) => !map.is_empty(),
    }
}

/// Text used for the `field_value` placeholder.
pub fn bad_value_text(value: Option<&Value>) -> String {
    match value {
        None => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}
