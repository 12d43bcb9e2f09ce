//! Synthesize Conclusion use case.
//!
//! Sends a snapshot of the current answers to the backend and returns the
//! combined [`Conclusion`]. The caller guarantees at least two answers.

use crate::ports::council_gateway::CouncilGateway;
use crate::ports::session_log::{NoSessionLog, SessionEvent, SessionEventLog};
use council_domain::{Conclusion, ConclusionRequest, SessionError};
use serde_json::json;
use std::sync::Arc;
use tracing::{info, warn};

#[derive(Clone)]
pub struct SynthesizeConclusionUseCase {
    gateway: Arc<dyn CouncilGateway>,
    session_log: Arc<dyn SessionEventLog>,
}

impl SynthesizeConclusionUseCase {
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

    pub async fn execute(&self, request: &ConclusionRequest) -> Result<Conclusion, SessionError> {
        info!(
            "Synthesizing conclusion from {} answers with {}",
            request.answers.len(),
            request.model
        );

        let outcome = match self.gateway.conclusion(&request.answers, &request.model).await {
            Ok(generated) if generated.conclusion.trim().is_empty() => {
                Err("backend returned an empty conclusion".to_string())
            }
            Ok(generated) => Ok(generated),
            Err(e) => Err(e.to_string()),
        };

        let perspectives: Vec<&str> = request.answers.iter().map(|(p, _)| p.as_str()).collect();
        match outcome {
            Ok(generated) => {
                info!("Conclusion received ({} chars)", generated.conclusion.chars().count());
                self.session_log.log(SessionEvent::new(
                    "conclusion_generated",
                    json!({
                        "epoch": request.epoch.value(),
                        "perspectives": perspectives,
                        "model": request.model.as_str(),
                        "conclusion": generated.conclusion,
                    }),
                ));
                Ok(Conclusion::new(generated.conclusion, request.model.clone())
                    .with_metadata(generated.metadata)
                    .with_sources(request.sources.clone()))
            }
            Err(cause) => {
                warn!("Conclusion synthesis failed: {}", cause);
                self.session_log.log(SessionEvent::new(
                    "conclusion_failed",
                    json!({
                        "epoch": request.epoch.value(),
                        "perspectives": perspectives,
                        "model": request.model.as_str(),
                        "error": cause,
                    }),
                ));
                Err(SessionError::conclusion_failed())
            }
        }
    }
}
