//! Logging infrastructure: structured session logging.
//!
//! Provides [`JsonlSessionLog`], a JSONL file writer that implements the
//! [`SessionEventLog`](council_application::SessionEventLog) port.

mod jsonl_session_log;

pub use jsonl_session_log::JsonlSessionLog;
