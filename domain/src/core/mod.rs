//! Core domain concepts shared across all subdomains.
//!
//! - [`question::Question`]: the life question put to the council
//! - [`error::SessionError`]: the session error taxonomy

pub mod error;
pub mod question;
