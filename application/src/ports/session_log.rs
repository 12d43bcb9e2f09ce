//! Port for structured session logging.
//!
//! [`SessionEventLog`] records completed requests (answers, conclusions,
//! failures, resets) as machine-readable events. Diagnostic messages go
//! through `tracing` instead.

use serde_json::Value;

/// A structured session event.
pub struct SessionEvent {
    /// Event type identifier (e.g. "answer_generated", "session_reset").
    pub event_type: &'static str,
    /// Event-specific fields.
    pub payload: Value,
}

impl SessionEvent {
    pub fn new(event_type: &'static str, payload: Value) -> Self {
        Self {
            event_type,
            payload,
        }
    }
}

/// Port for logging session events.
///
/// `log` is synchronous and infallible; adapters swallow write errors so a
/// broken log never interrupts a session.
pub trait SessionEventLog: Send + Sync {
    fn log(&self, event: SessionEvent);
}

/// No-op implementation for tests and when logging is disabled.
pub struct NoSessionLog;

impl SessionEventLog for NoSessionLog {
    fn log(&self, _event: SessionEvent) {}
}
