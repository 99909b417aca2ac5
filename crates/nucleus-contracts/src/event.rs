// Event envelope types
//
// The envelope is what `POST /api/v1/events` accepts. `event_type` and
// `payload` are required; severity, fingerprint, message, context and
// occurred_at are optional and skipped entirely when unset.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Event severity as understood by the hub
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Debug,
    Info,
    Warning,
    Error,
    Critical,
}

/// The `occurred_at` field accepts either a native timestamp or a
/// preformatted string.
///
/// A native timestamp is normalized to RFC 3339 when the envelope is
/// built; a string is passed through to the wire unchanged.
#[derive(Debug, Clone, PartialEq)]
pub enum OccurredAt {
    Timestamp(DateTime<Utc>),
    Formatted(String),
}

impl OccurredAt {
    /// Render the wire representation (ISO-8601 / RFC 3339 for timestamps)
    pub fn to_wire(&self) -> String {
        match self {
            OccurredAt::Timestamp(ts) => ts.to_rfc3339(),
            OccurredAt::Formatted(s) => s.clone(),
        }
    }
}

impl From<DateTime<Utc>> for OccurredAt {
    fn from(ts: DateTime<Utc>) -> Self {
        OccurredAt::Timestamp(ts)
    }
}

impl From<String> for OccurredAt {
    fn from(s: String) -> Self {
        OccurredAt::Formatted(s)
    }
}

impl From<&str> for OccurredAt {
    fn from(s: &str) -> Self {
        OccurredAt::Formatted(s.to_string())
    }
}

/// Optional fields attached to an event send
#[derive(Debug, Clone, Default)]
pub struct EventOptions {
    pub severity: Option<Severity>,
    pub fingerprint: Option<String>,
    pub message: Option<String>,
    pub context: Option<Map<String, Value>>,
    pub occurred_at: Option<OccurredAt>,
}

impl EventOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn severity(mut self, severity: Severity) -> Self {
        self.severity = Some(severity);
        self
    }

    /// Opaque grouping key the hub uses for de-duplication
    pub fn fingerprint(mut self, fingerprint: impl Into<String>) -> Self {
        self.fingerprint = Some(fingerprint.into());
        self
    }

    pub fn message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    pub fn context(mut self, context: Map<String, Value>) -> Self {
        self.context = Some(context);
        self
    }

    pub fn occurred_at(mut self, occurred_at: impl Into<OccurredAt>) -> Self {
        self.occurred_at = Some(occurred_at.into());
        self
    }
}

/// Wire body for `POST /api/v1/events`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventEnvelope {
    pub event_type: String,
    pub payload: Map<String, Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub severity: Option<Severity>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fingerprint: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context: Option<Map<String, Value>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub occurred_at: Option<String>,
}

impl EventEnvelope {
    pub fn new(event_type: impl Into<String>, payload: Map<String, Value>) -> Self {
        Self {
            event_type: event_type.into(),
            payload,
            severity: None,
            fingerprint: None,
            message: None,
            context: None,
            occurred_at: None,
        }
    }

    /// Merge optional fields into the envelope, normalizing `occurred_at`
    pub fn with_options(mut self, options: EventOptions) -> Self {
        self.severity = options.severity;
        self.fingerprint = options.fingerprint;
        self.message = options.message;
        self.context = options.context;
        self.occurred_at = options.occurred_at.map(|o| o.to_wire());
        self
    }
}

/// Hub acknowledgement for an accepted event
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventAck {
    pub id: u64,
    pub status: String,
}
