//! Domain layer for council
//!
//! This crate contains the session model and its pure state machine.
//! It has no dependencies on infrastructure or presentation concerns.
//!
//! # Core Concepts
//!
//! ## Council session
//!
//! A user asks one question and collects answers to it from several
//! philosophical *perspectives*, each generated by a chosen provider/model.
//! Two or more answers can be synthesized into a *conclusion*.
//!
//! ## Reducer
//!
//! [`reduce`] is the only way a [`SessionState`] changes. It returns the next
//! state and the [`Effect`]s (backend requests) the runtime has to execute;
//! results come back as [`SessionAction`]s.

pub mod catalog;
pub mod core;
pub mod export;
pub mod session;
pub mod util;

// Re-export commonly used types
pub use catalog::{
    perspective::{Perspective, PerspectiveCatalog, PerspectiveId},
    provider::{ModelId, Provider, ProviderCatalog},
};
pub use core::{
    error::{ErrorKind, SessionError},
    question::{EXAMPLE_QUESTIONS, Question},
};
pub use export::{EscapePolicy, ExportFormat, UnknownExportFormat};
pub use session::{
    action::SessionAction,
    answer::{Answer, AnswerRevision, AnswerSet, Metadata, MetadataValue},
    conclusion::Conclusion,
    effect::{AnswerRequest, ConclusionRequest, Effect},
    reducer::{Transition, reduce},
    state::{LoadingFlags, RequestSlot, SessionEpoch, SessionState},
};
