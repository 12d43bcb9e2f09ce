//! Configuration file loading for council
//!
//! This module handles file I/O and merging of configuration from multiple sources.
//! The priority order (highest to lowest):
//!
//! 1. `COUNCIL_*` environment variables
//! 2. `--config <path>` specified file
//! 3. Project root: `./council.toml` or `./.council.toml`
//! 4. Global: `~/.config/council/config.toml`
//! 5. Default values

mod file_config;
mod loader;

pub use file_config::{
    ConfigIssue, ConfigValidationError, DEFAULT_BASE_URL, DEFAULT_TIMEOUT_SECONDS,
    FileBackendConfig, FileConfig, FileLoggingConfig, FileOutputConfig, FileSessionConfig,
    Severity,
};
pub use loader::ConfigLoader;
