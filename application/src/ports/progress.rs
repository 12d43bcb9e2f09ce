//! Progress notification port
//!
//! Defines the interface for reporting backend requests while a session
//! drives its effects.

use council_domain::RequestSlot;

/// Callback for request lifecycle updates
///
/// Implementations live in the presentation layer (spinners, status lines).
pub trait SessionProgress: Send + Sync {
    /// Called when a request is issued
    fn on_request_start(&self, slot: RequestSlot, detail: &str);

    /// Called when a request finished, successfully or not
    fn on_request_complete(&self, slot: RequestSlot, success: bool);
}

/// No-op progress notifier for when progress reporting is not needed
pub struct NoProgress;

impl SessionProgress for NoProgress {
    fn on_request_start(&self, _slot: RequestSlot, _detail: &str) {}
    fn on_request_complete(&self, _slot: RequestSlot, _success: bool) {}
}
