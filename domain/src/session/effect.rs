//! Effects produced by state transitions
//!
//! The reducer never performs I/O. It describes the requests to issue as
//! [`Effect`] values; the session runtime executes them and feeds the results
//! back as actions.

use super::answer::AnswerRevision;
use super::state::{RequestSlot, SessionEpoch};
use crate::catalog::perspective::PerspectiveId;
use crate::catalog::provider::{ModelId, Provider};

/// One answer-generation request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnswerRequest {
    pub epoch: SessionEpoch,
    pub question: String,
    pub perspective: PerspectiveId,
    pub provider: Provider,
    pub model: ModelId,
}

/// One synthesis request over a snapshot of the current answers
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConclusionRequest {
    pub epoch: SessionEpoch,
    /// `(perspective, text)` in insertion order
    pub answers: Vec<(PerspectiveId, String)>,
    /// Answer revisions the snapshot was taken from
    pub sources: Vec<AnswerRevision>,
    pub provider: Provider,
    pub model: ModelId,
}

/// Effects to be executed after a state transition
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    LoadPerspectives,
    LoadProviders,
    LoadModels { provider: Provider },
    GenerateAnswer(AnswerRequest),
    SynthesizeConclusion(ConclusionRequest),
}

impl Effect {
    pub fn slot(&self) -> RequestSlot {
        match self {
            Effect::LoadPerspectives => RequestSlot::Perspectives,
            Effect::LoadProviders => RequestSlot::Providers,
            Effect::LoadModels { .. } => RequestSlot::Models,
            Effect::GenerateAnswer(_) => RequestSlot::Answer,
            Effect::SynthesizeConclusion(_) => RequestSlot::Conclusion,
        }
    }
}
