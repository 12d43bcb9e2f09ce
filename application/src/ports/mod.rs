//! Port definitions
//!
//! Interfaces the application layer needs from the outside world.

pub mod council_gateway;
pub mod progress;
pub mod session_log;
