//! Session error taxonomy
//!
//! Every asynchronous failure is caught where it happens and converted into
//! one of these values, which then occupies the single session error slot.

use thiserror::Error;

/// Category of a [`SessionError`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Perspective or provider catalog could not be fetched
    CatalogLoad,
    /// Answer or conclusion request failed
    Generation,
    /// No usable provider or model; dependent actions are disabled
    Configuration,
}

/// Session-level errors
///
/// None of these are fatal: catalog and generation failures are retried
/// explicitly, configuration errors clear once a provider/model becomes
/// available.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SessionError {
    #[error("{0}")]
    CatalogLoad(String),

    #[error("{0}")]
    Generation(String),

    #[error("{0}")]
    Configuration(String),
}

impl SessionError {
    pub fn perspectives_unavailable() -> Self {
        Self::CatalogLoad(
            "Failed to load philosophical perspectives. Please make sure the backend API is running."
                .to_string(),
        )
    }

    pub fn providers_unavailable() -> Self {
        Self::CatalogLoad("Failed to check provider availability.".to_string())
    }

    pub fn models_unavailable(provider: impl std::fmt::Display) -> Self {
        Self::CatalogLoad(format!("Failed to fetch models for provider {}.", provider))
    }

    pub fn answer_failed() -> Self {
        Self::Generation("Failed to generate philosophical answer. Please try again.".to_string())
    }

    pub fn conclusion_failed() -> Self {
        Self::Generation(
            "Failed to generate philosophical synthesis. Please try again.".to_string(),
        )
    }

    pub fn unknown_perspective(perspective: impl std::fmt::Display) -> Self {
        Self::Generation(format!(
            "Received an answer for unknown perspective {}.",
            perspective
        ))
    }

    pub fn no_providers() -> Self {
        Self::Configuration("No providers available. Check your configuration.".to_string())
    }

    pub fn no_models(provider: impl std::fmt::Display) -> Self {
        Self::Configuration(format!("No models available for provider {}.", provider))
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            SessionError::CatalogLoad(_) => ErrorKind::CatalogLoad,
            SessionError::Generation(_) => ErrorKind::Generation,
            SessionError::Configuration(_) => ErrorKind::Configuration,
        }
    }

    pub fn message(&self) -> &str {
        match self {
            SessionError::CatalogLoad(m)
            | SessionError::Generation(m)
            | SessionError::Configuration(m) => m,
        }
    }

    /// Catalog and generation failures can be retried; configuration errors
    /// need a different provider or backend setup.
    pub fn is_retryable(&self) -> bool {
        !matches!(self, SessionError::Configuration(_))
    }
}
