//! Council gateway port
//!
//! Defines the interface to the backend that serves perspectives, providers,
//! models and generations.

use async_trait::async_trait;
use council_domain::{Metadata, ModelId, PerspectiveCatalog, PerspectiveId, Provider};
use thiserror::Error;

/// Errors that can occur during gateway operations
#[derive(Error, Debug)]
pub enum GatewayError {
    #[error("Connection error: {0}")]
    Connection(String),

    #[error("HTTP {status}: {message}")]
    Http { status: u16, message: String },

    #[error("Invalid response: {0}")]
    Decode(String),

    #[error("Timeout")]
    Timeout,

    #[error("Other error: {0}")]
    Other(String),
}

/// Raw answer as returned by the backend
#[derive(Debug, Clone, PartialEq)]
pub struct GeneratedAnswer {
    pub answer: String,
    pub metadata: Metadata,
}

/// Raw conclusion as returned by the backend
#[derive(Debug, Clone, PartialEq)]
pub struct GeneratedConclusion {
    pub conclusion: String,
    pub metadata: Metadata,
}

/// Gateway for backend communication
///
/// This port defines how the application layer talks to the generation
/// backend. Implementations (adapters) live in the infrastructure layer.
#[async_trait]
pub trait CouncilGateway: Send + Sync {
    /// Perspective catalog, ordered by id
    async fn perspectives(&self) -> Result<PerspectiveCatalog, GatewayError>;

    /// Whether `provider` can currently be used
    async fn provider_availability(&self, provider: &Provider) -> Result<bool, GatewayError>;

    /// Models offered by `provider`, in backend order
    async fn models(&self, provider: &Provider) -> Result<Vec<ModelId>, GatewayError>;

    /// Generate one answer to `question` from `perspective`
    async fn answer(
        &self,
        question: &str,
        perspective: &PerspectiveId,
        model: &ModelId,
    ) -> Result<GeneratedAnswer, GatewayError>;

    /// Combine `(perspective, text)` pairs into a conclusion
    async fn conclusion(
        &self,
        answers: &[(PerspectiveId, String)],
        model: &ModelId,
    ) -> Result<GeneratedConclusion, GatewayError>;
}
