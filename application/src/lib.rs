//! Application layer for council
//!
//! This crate contains use cases, port definitions and the session runtime.
//! It depends only on the domain layer.

pub mod ports;
pub mod use_cases;

// Re-export commonly used types
pub use ports::{
    council_gateway::{CouncilGateway, GatewayError, GeneratedAnswer, GeneratedConclusion},
    progress::{NoProgress, SessionProgress},
    session_log::{NoSessionLog, SessionEvent, SessionEventLog},
};
pub use use_cases::{
    generate_answer::GenerateAnswerUseCase, load_catalogs::LoadCatalogsUseCase,
    session_runtime::CouncilSession, synthesize_conclusion::SynthesizeConclusionUseCase,
};
