//! Generate Answer use case.
//!
//! Issues one answer request for a (question, perspective, model) triple and
//! turns the backend reply into a domain [`Answer`].

use crate::ports::council_gateway::CouncilGateway;
use crate::ports::session_log::{NoSessionLog, SessionEvent, SessionEventLog};
use council_domain::util::preview;
use council_domain::{Answer, AnswerRequest, ModelId, SessionError};
use serde_json::json;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Metadata key under which the backend reports the model it actually used
const MODEL_METADATA_KEY: &str = "model";

#[derive(Clone)]
pub struct GenerateAnswerUseCase {
    gateway: Arc<dyn CouncilGateway>,
    session_log: Arc<dyn SessionEventLog>,
}

impl GenerateAnswerUseCase {
    pub fn new(gateway: Arc<dyn CouncilGateway>) -> Self {
        Self {
            gateway,
            session_log: Arc::new(NoSessionLog),
        }
    }

    pub fn with_session_log(mut self, session_log: Arc<dyn SessionEventLog>) -> Self {
        self.session_log = session_log;
        self
    }

    pub async fn execute(&self, request: &AnswerRequest) -> Result<Answer, SessionError> {
        info!(
            "Generating answer: perspective={}, model={}",
            request.perspective, request.model
        );
        debug!("Question: {}", preview(&request.question, 100));

        let generated = match self
            .gateway
            .answer(&request.question, &request.perspective, &request.model)
            .await
        {
            Ok(generated) => generated,
            Err(e) => {
                warn!("Answer generation for {} failed: {}", request.perspective, e);
                self.session_log.log(SessionEvent::new(
                    "answer_failed",
                    json!({
                        "epoch": request.epoch.value(),
                        "perspective": request.perspective.as_str(),
                        "provider": request.provider.as_str(),
                        "model": request.model.as_str(),
                        "error": e.to_string(),
                    }),
                ));
                return Err(SessionError::answer_failed());
            }
        };

        let model_used = generated
            .metadata
            .get(MODEL_METADATA_KEY)
            .and_then(|v| v.as_text())
            .map(ModelId::from)
            .unwrap_or_else(|| request.model.clone());

        info!(
            "Answer for {} received ({} chars)",
            request.perspective,
            generated.answer.chars().count()
        );
        self.session_log.log(SessionEvent::new(
            "answer_generated",
            json!({
                "epoch": request.epoch.value(),
                "question": request.question,
                "perspective": request.perspective.as_str(),
                "provider": request.provider.as_str(),
                "model": model_used.as_str(),
                "answer": generated.answer,
            }),
        ));

        Ok(Answer::new(
            request.perspective.clone(),
            generated.answer,
            request.provider.clone(),
            model_used,
        )
        .with_metadata(generated.metadata))
    }
}
