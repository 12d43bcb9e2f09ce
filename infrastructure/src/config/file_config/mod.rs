//! Raw TOML configuration data types
//!
//! These structs represent the exact structure of the TOML config file.
//! They are deserialized directly and use domain types where appropriate.

mod backend;
mod logging;
mod output;
mod session;

pub use backend::{DEFAULT_BASE_URL, DEFAULT_TIMEOUT_SECONDS, FileBackendConfig};
pub use logging::FileLoggingConfig;
pub use output::FileOutputConfig;
pub use session::FileSessionConfig;

use council_domain::Provider;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Problems found by [`FileConfig::validate`]
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigValidationError {
    #[error("backend.base_url cannot be empty")]
    EmptyBaseUrl,

    #[error("backend.base_url '{0}' is not a valid http(s) URL")]
    InvalidBaseUrl(String),

    #[error("backend.timeout_seconds cannot be 0")]
    InvalidTimeout,

    #[error("session.default_model cannot be empty")]
    EmptyModelName,

    #[error("session.default_provider '{0}' is not a known provider")]
    UnknownProvider(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// The session starts but the setting is ignored
    Warning,
    /// The setting makes the session unusable
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigIssue {
    pub severity: Severity,
    pub error: ConfigValidationError,
}

impl ConfigIssue {
    fn warning(error: ConfigValidationError) -> Self {
        Self {
            severity: Severity::Warning,
            error,
        }
    }

    fn error(error: ConfigValidationError) -> Self {
        Self {
            severity: Severity::Error,
            error,
        }
    }
}

impl std::fmt::Display for ConfigIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.error)
    }
}

/// Complete file configuration (raw TOML structure)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    /// Backend connection
    pub backend: FileBackendConfig,
    /// Session defaults
    pub session: FileSessionConfig,
    /// Output settings
    pub output: FileOutputConfig,
    /// Structured session log
    pub logging: FileLoggingConfig,
}

impl FileConfig {
    /// Validate the entire configuration, returning all detected issues.
    pub fn validate(&self) -> Vec<ConfigIssue> {
        let mut issues = Vec::new();

        let base_url = self.backend.base_url.trim();
        if base_url.is_empty() {
            issues.push(ConfigIssue::error(ConfigValidationError::EmptyBaseUrl));
        } else {
            let valid = reqwest::Url::parse(base_url)
                .is_ok_and(|url| matches!(url.scheme(), "http" | "https"));
            if !valid {
                issues.push(ConfigIssue::error(ConfigValidationError::InvalidBaseUrl(
                    base_url.to_string(),
                )));
            }
        }

        if self.backend.timeout_seconds == 0 {
            issues.push(ConfigIssue::error(ConfigValidationError::InvalidTimeout));
        }

        if let Some(Provider::Other(id)) = self.session.provider() {
            issues.push(ConfigIssue::warning(ConfigValidationError::UnknownProvider(id)));
        }

        if self
            .session
            .default_model
            .as_deref()
            .is_some_and(|m| m.trim().is_empty())
        {
            issues.push(ConfigIssue::warning(ConfigValidationError::EmptyModelName));
        }

        issues
    }

    /// True when no issue has [`Severity::Error`]
    pub fn is_usable(&self) -> bool {
        self.validate()
            .iter()
            .all(|issue| issue.severity != Severity::Error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use council_domain::ExportFormat;

    #[test]
    fn test_deserialize_full_config() {
        let toml_str = r#"
[backend]
base_url = "http://127.0.0.1:9000"
timeout_seconds = 30

[session]
default_provider = "openrouter"
default_model = "gpt-4"
export_format = "html"

[output]
color = false

[logging]
session_log = "session.jsonl"
"#;

        let config: FileConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.backend.base_url, "http://127.0.0.1:9000");
        assert_eq!(config.backend.timeout().as_secs(), 30);
        assert_eq!(config.session.provider(), Some(Provider::OpenRouter));
        assert_eq!(config.session.export_format, ExportFormat::Html);
        assert!(!config.output.color);
        assert!(config.logging.session_log_path().is_some());
        assert!(config.validate().is_empty());
    }

    #[test]
    fn test_deserialize_partial_config() {
        let config: FileConfig = toml::from_str("[session]\ndefault_model = \"m1\"\n").unwrap();
        assert_eq!(config.backend, FileBackendConfig::default());
        assert_eq!(config.session.export_format, ExportFormat::Markdown);
        assert!(config.output.color);
    }

    #[test]
    fn test_default_config_is_valid() {
        let config = FileConfig::default();
        assert_eq!(config.backend.base_url, DEFAULT_BASE_URL);
        assert!(config.validate().is_empty());
        assert!(config.is_usable());
    }

    #[test]
    fn test_validate_backend() {
        let mut config = FileConfig::default();
        config.backend.base_url = "localhost 8000".to_string();
        config.backend.timeout_seconds = 0;

        let issues = config.validate();
        assert_eq!(issues.len(), 2);
        assert!(issues.iter().all(|i| i.severity == Severity::Error));
        assert!(!config.is_usable());

        config.backend.base_url = "  ".to_string();
        assert!(
            config
                .validate()
                .iter()
                .any(|i| i.error == ConfigValidationError::EmptyBaseUrl)
        );
    }

    #[test]
    fn test_validate_session_defaults_are_warnings() {
        let mut config = FileConfig::default();
        config.session.default_provider = Some("bedrock".to_string());
        config.session.default_model = Some(" ".to_string());

        let issues = config.validate();
        assert_eq!(issues.len(), 2);
        assert!(issues.iter().all(|i| i.severity == Severity::Warning));
        assert!(config.is_usable());
    }
}
