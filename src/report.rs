//! Purpose: Define a stable, structured schema for reported read failures.
//! Exports: `FailureEvent`, `failure_event_json`, `Reporter`, `TracingReporter`.
//! Role: Injection seam for the external observability sink; tests substitute a fake.
//! Invariants: Events are non-fatal and never alter accessor return values.
//! Invariants: JSON schema is stable once published; fields are additive-only.
use serde_json::{Map, Value, json};
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;

use crate::error::Error;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FailureEvent {
    pub kind: String,
    pub time: String,
    pub method: String,
    pub message: String,
    pub error: String,
    pub details: Map<String, Value>,
}

impl FailureEvent {
    pub fn read_failure(method: &str, message: &str, error: &Error) -> Self {
        let mut details = Map::new();
        details.insert("error_kind".to_string(), json!(format!("{:?}", error.kind())));
        if let Some(path) = error.path() {
            details.insert("path".to_string(), json!(path.display().to_string()));
        }

        Self {
            kind: "read-failure".to_string(),
            time: now_rfc3339(),
            method: method.to_string(),
            message: message.to_string(),
            error: error.to_string(),
            details,
        }
    }
}

fn now_rfc3339() -> String {
    OffsetDateTime::now_utc()
        .format(&Rfc3339)
        .unwrap_or_default()
}

pub fn failure_event_json(event: &FailureEvent) -> Value {
    let mut inner = Map::new();
    inner.insert("kind".to_string(), json!(event.kind));
    inner.insert("time".to_string(), json!(event.time));
    inner.insert("method".to_string(), json!(event.method));
    inner.insert("message".to_string(), json!(event.message));
    inner.insert("error".to_string(), json!(event.error));
    inner.insert("details".to_string(), Value::Object(event.details.clone()));

    let mut outer = Map::new();
    outer.insert("failure".to_string(), Value::Object(inner));
    Value::Object(outer)
}

/// Sink for failure events. The accessor never installs a process-wide
/// collector; callers pick where events land.
pub trait Reporter {
    fn report(&self, event: &FailureEvent);
}

/// Default sink: emits the event envelope through the `tracing` facade.
#[derive(Debug, Default)]
pub struct TracingReporter;

impl Reporter for TracingReporter {
    fn report(&self, event: &FailureEvent) {
        tracing::debug!(
            method = event.method.as_str(),
            payload = %failure_event_json(event),
            "{}",
            event.message
        );
    }
}
