//! The uniform result envelope
//!
//! Every operation answers with an [`Envelope`]: a status, an optional
//! message and payload, a timestamp, and whatever flat fields the operation
//! adds (`returncode`, `command`, `stdout`, ...). The binary prints it wrapped
//! in a [`Response`].

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use winagent_core::format;

/// Outcome of an operation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Success,
    Error,
}

impl Status {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::Error => "error",
        }
    }
}

impl std::fmt::Display for Status {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope {
    pub status: Status,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,

    /// Operation-specific fields, serialized as siblings of `status`
    #[serde(flatten)]
    pub fields: Map<String, Value>,

    pub timestamp: String,
}

impl Envelope {
    pub fn new(status: Status) -> Self {
        Self {
            status,
            message: None,
            data: None,
            fields: Map::new(),
            timestamp: format::timestamp(),
        }
    }

    pub fn success() -> Self {
        Self::new(Status::Success)
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::new(Status::Error).with_message(message)
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    pub fn with_data(mut self, data: Value) -> Self {
        self.data = Some(data);
        self
    }

    pub fn with_field(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.fields.insert(key.to_string(), value.into());
        self
    }

    pub fn is_success(&self) -> bool {
        self.status == Status::Success
    }

    pub fn field(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    /// Captured standard output of a shell execution, if any
    pub fn stdout(&self) -> Option<&str> {
        self.field("stdout").and_then(Value::as_str)
    }

    pub fn returncode(&self) -> Option<i64> {
        self.field("returncode").and_then(Value::as_i64)
    }

    pub fn to_value(&self) -> Value {
        // Envelope only holds strings, maps and JSON values
        serde_json::to_value(self).unwrap_or(Value::Null)
    }
}

/// The document printed on stdout for every invocation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Response {
    #[serde(rename = "OUTPUT_EXECUTIVO")]
    pub output: Envelope,
}

impl From<Envelope> for Response {
    fn from(output: Envelope) -> Self {
        Self { output }
    }
}
