//! Scripted gateway shared by the use case tests

use crate::ports::council_gateway::{
    CouncilGateway, GatewayError, GeneratedAnswer, GeneratedConclusion,
};
use async_trait::async_trait;
use council_domain::{Metadata, ModelId, PerspectiveCatalog, PerspectiveId, Provider};
use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::Notify;

/// `None` entries fail with a connection error
pub(crate) struct MockGateway {
    pub perspectives: Mutex<Option<Vec<(&'static str, &'static str)>>>,
    pub availability: Mutex<HashMap<Provider, Option<bool>>>,
    pub models: Mutex<HashMap<Provider, Option<Vec<&'static str>>>>,
    pub answers: Mutex<VecDeque<Option<GeneratedAnswer>>>,
    pub conclusion: Mutex<Option<GeneratedConclusion>>,
    pub answer_gate: Option<Arc<Notify>>,
    pub answer_calls: AtomicUsize,
    pub conclusion_calls: AtomicUsize,
    pub models_calls: AtomicUsize,
    pub last_conclusion_input: Mutex<Vec<(PerspectiveId, String)>>,
}

impl MockGateway {
    pub fn new() -> Self {
        Self {
            perspectives: Mutex::new(Some(vec![
                ("Existentialism", "Existence precedes essence."),
                ("Stoicism", "Focus on what you control."),
                ("Zen", "Sit."),
            ])),
            availability: Mutex::new(HashMap::from([
                (Provider::Local, Some(true)),
                (Provider::OpenRouter, Some(false)),
            ])),
            models: Mutex::new(HashMap::from([
                (Provider::Local, Some(vec!["m1", "m2"])),
                (Provider::OpenRouter, Some(vec!["gpt-4"])),
            ])),
            answers: Mutex::new(VecDeque::new()),
            conclusion: Mutex::new(Some(GeneratedConclusion {
                conclusion: "They agree.".to_string(),
                metadata: Metadata::new(),
            })),
            answer_gate: None,
            answer_calls: AtomicUsize::new(0),
            conclusion_calls: AtomicUsize::new(0),
            models_calls: AtomicUsize::new(0),
            last_conclusion_input: Mutex::new(Vec::new()),
        }
    }

    /// Hold every answer request until the gate is notified
    pub fn with_answer_gate(mut self, gate: Arc<Notify>) -> Self {
        self.answer_gate = Some(gate);
        self
    }

    pub fn script_answer(&self, answer: Option<GeneratedAnswer>) {
        self.answers.lock().unwrap().push_back(answer);
    }

    pub fn set_available(&self, provider: Provider, available: Option<bool>) {
        self.availability.lock().unwrap().insert(provider, available);
    }

    pub fn answer_calls(&self) -> usize {
        self.answer_calls.load(Ordering::SeqCst)
    }

    pub fn conclusion_calls(&self) -> usize {
        self.conclusion_calls.load(Ordering::SeqCst)
    }

    fn down() -> GatewayError {
        GatewayError::Connection("connection refused".to_string())
    }
}

#[async_trait]
impl CouncilGateway for MockGateway {
    async fn perspectives(&self) -> Result<PerspectiveCatalog, GatewayError> {
        let pairs = self.perspectives.lock().unwrap().clone();
        pairs
            .map(PerspectiveCatalog::from_pairs)
            .ok_or_else(Self::down)
    }

    async fn provider_availability(&self, provider: &Provider) -> Result<bool, GatewayError> {
        let entry = self.availability.lock().unwrap().get(provider).copied();
        match entry {
            Some(Some(available)) => Ok(available),
            Some(None) => Err(Self::down()),
            None => Ok(false),
        }
    }

    async fn models(&self, provider: &Provider) -> Result<Vec<ModelId>, GatewayError> {
        self.models_calls.fetch_add(1, Ordering::SeqCst);
        let entry = self.models.lock().unwrap().get(provider).cloned();
        match entry {
            Some(Some(models)) => Ok(models.into_iter().map(ModelId::from).collect()),
            Some(None) => Err(GatewayError::Http {
                status: 500,
                message: "boom".to_string(),
            }),
            None => Ok(Vec::new()),
        }
    }

    async fn answer(
        &self,
        _question: &str,
        perspective: &PerspectiveId,
        _model: &ModelId,
    ) -> Result<GeneratedAnswer, GatewayError> {
        self.answer_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(gate) = &self.answer_gate {
            gate.notified().await;
        }
        let scripted = self.answers.lock().unwrap().pop_front();
        match scripted {
            Some(Some(answer)) => Ok(answer),
            Some(None) => Err(GatewayError::Timeout),
            None => Ok(GeneratedAnswer {
                answer: format!("Answer from {}", perspective),
                metadata: Metadata::new(),
            }),
        }
    }

    async fn conclusion(
        &self,
        answers: &[(PerspectiveId, String)],
        _model: &ModelId,
    ) -> Result<GeneratedConclusion, GatewayError> {
        self.conclusion_calls.fetch_add(1, Ordering::SeqCst);
        *self.last_conclusion_input.lock().unwrap() = answers.to_vec();
        self.conclusion
            .lock()
            .unwrap()
            .clone()
            .ok_or_else(|| GatewayError::Other("synthesis failed".to_string()))
    }
}
