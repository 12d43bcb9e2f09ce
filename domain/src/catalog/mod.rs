//! Catalogs loaded from the backend once per session.
//!
//! Catalogs survive a session reset; only a successful reload replaces them.

pub mod perspective;
pub mod provider;
