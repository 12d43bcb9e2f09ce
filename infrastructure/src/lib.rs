//! Infrastructure layer for council
//!
//! This crate contains adapters that implement the ports defined
//! in the application layer, including configuration file loading.

pub mod config;
pub mod http;
pub mod logging;

// Re-export commonly used types
pub use config::{
    ConfigIssue, ConfigLoader, ConfigValidationError, FileBackendConfig, FileConfig,
    FileLoggingConfig, FileOutputConfig, FileSessionConfig, Severity,
};
pub use http::HttpCouncilGateway;
pub use logging::JsonlSessionLog;
