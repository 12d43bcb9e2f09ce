//! Session runtime.
//!
//! [`CouncilSession`] owns one [`SessionState`] and executes the effects the
//! reducer emits. The state lock is only held for the synchronous reducer
//! step, so several dispatches can be in progress on the same task; the
//! reducer's in-flight guards and epoch checks keep them consistent.

use crate::ports::council_gateway::CouncilGateway;
use crate::ports::progress::{NoProgress, SessionProgress};
use crate::ports::session_log::{NoSessionLog, SessionEvent, SessionEventLog};
use crate::use_cases::generate_answer::GenerateAnswerUseCase;
use crate::use_cases::load_catalogs::LoadCatalogsUseCase;
use crate::use_cases::synthesize_conclusion::SynthesizeConclusionUseCase;
use council_domain::{Effect, SessionAction, SessionState, reduce};
use futures::future::BoxFuture;
use futures::stream::{FuturesUnordered, StreamExt};
use futures::FutureExt;
use serde_json::json;
use std::sync::{Arc, Mutex, PoisonError};
use tracing::debug;

pub struct CouncilSession {
    state: Mutex<SessionState>,
    gateway: Arc<dyn CouncilGateway>,
    catalogs: LoadCatalogsUseCase,
    answers: GenerateAnswerUseCase,
    conclusions: SynthesizeConclusionUseCase,
    progress: Arc<dyn SessionProgress>,
    session_log: Arc<dyn SessionEventLog>,
}

impl CouncilSession {
    pub fn new(gateway: Arc<dyn CouncilGateway>) -> Self {
        Self {
            state: Mutex::new(SessionState::new()),
            catalogs: LoadCatalogsUseCase::new(gateway.clone()),
            answers: GenerateAnswerUseCase::new(gateway.clone()),
            conclusions: SynthesizeConclusionUseCase::new(gateway.clone()),
            gateway,
            progress: Arc::new(NoProgress),
            session_log: Arc::new(NoSessionLog),
        }
    }

    pub fn with_progress(mut self, progress: Arc<dyn SessionProgress>) -> Self {
        self.progress = progress;
        self
    }

    pub fn with_session_log(mut self, session_log: Arc<dyn SessionEventLog>) -> Self {
        self.answers =
            GenerateAnswerUseCase::new(self.gateway.clone()).with_session_log(session_log.clone());
        self.conclusions = SynthesizeConclusionUseCase::new(self.gateway.clone())
            .with_session_log(session_log.clone());
        self.session_log = session_log;
        self
    }

    /// Copy of the current state
    pub fn snapshot(&self) -> SessionState {
        self.state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Load both catalogs concurrently
    pub async fn start(&self) {
        tokio::join!(
            self.dispatch(SessionAction::LoadPerspectives),
            self.dispatch(SessionAction::LoadProviders),
        );
    }

    /// Apply `action` and run every resulting effect to completion.
    ///
    /// Returns false when the reducer refused the action.
    pub async fn dispatch(&self, action: SessionAction) -> bool {
        let name = action.name();
        let is_reset = matches!(action, SessionAction::Reset);
        let (changed, effects) = self.step(action);
        if !changed {
            debug!("Action refused: {}", name);
            return false;
        }
        if is_reset {
            self.session_log.log(SessionEvent::new(
                "session_reset",
                json!({ "epoch": self.snapshot().epoch().value() }),
            ));
        }

        let mut pending: FuturesUnordered<BoxFuture<'_, SessionAction>> =
            effects.into_iter().map(|effect| self.run(effect)).collect();
        while let Some(completion) = pending.next().await {
            let completion_name = completion.name();
            let (changed, effects) = self.step(completion);
            if !changed {
                debug!("Discarded stale result: {}", completion_name);
            }
            pending.extend(effects.into_iter().map(|effect| self.run(effect)));
        }
        true
    }

    fn step(&self, action: SessionAction) -> (bool, Vec<Effect>) {
        let mut guard = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        let transition = reduce(std::mem::take(&mut *guard), action);
        let changed = transition.changed();
        let (state, effects) = transition.into_parts();
        *guard = state;
        (changed, effects)
    }

    fn run(&self, effect: Effect) -> BoxFuture<'_, SessionAction> {
        async move {
            let slot = effect.slot();
            self.progress.on_request_start(slot, &describe(&effect));
            let completion = match effect {
                Effect::LoadPerspectives => {
                    SessionAction::PerspectivesLoaded(self.catalogs.load_perspectives().await)
                }
                Effect::LoadProviders => {
                    SessionAction::ProvidersLoaded(self.catalogs.load_providers().await)
                }
                Effect::LoadModels { provider } => {
                    let result = self.catalogs.load_models(&provider).await;
                    SessionAction::ModelsLoaded { provider, result }
                }
                Effect::GenerateAnswer(request) => SessionAction::AnswerCompleted {
                    epoch: request.epoch,
                    result: self.answers.execute(&request).await,
                },
                Effect::SynthesizeConclusion(request) => SessionAction::ConclusionCompleted {
                    epoch: request.epoch,
                    result: self.conclusions.execute(&request).await,
                },
            };
            self.progress.on_request_complete(slot, succeeded(&completion));
            completion
        }
        .boxed()
    }
}

fn describe(effect: &Effect) -> String {
    match effect {
        Effect::LoadPerspectives => "Loading perspectives".to_string(),
        Effect::LoadProviders => "Checking providers".to_string(),
        Effect::LoadModels { provider } => format!("Loading models for {}", provider.label()),
        Effect::GenerateAnswer(request) => {
            format!("Asking {} ({})", request.perspective, request.model)
        }
        Effect::SynthesizeConclusion(request) => format!(
            "Synthesizing {} answers ({})",
            request.answers.len(),
            request.model
        ),
    }
}

fn succeeded(completion: &SessionAction) -> bool {
    match completion {
        SessionAction::PerspectivesLoaded(result) => result.is_ok(),
        SessionAction::ProvidersLoaded(result) => result.is_ok(),
        SessionAction::ModelsLoaded { result, .. } => result.is_ok(),
        SessionAction::AnswerCompleted { result, .. } => result.is_ok(),
        SessionAction::ConclusionCompleted { result, .. } => result.is_ok(),
        _ => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::use_cases::mock_gateway::MockGateway;
    use council_domain::{ErrorKind, ModelId, PerspectiveId, Provider, RequestSlot};
    use std::sync::Mutex as StdMutex;
    use tokio::sync::Notify;

    struct RecordingProgress(StdMutex<Vec<(RequestSlot, Option<bool>)>>);

    impl SessionProgress for RecordingProgress {
        fn on_request_start(&self, slot: RequestSlot, _detail: &str) {
            self.0.lock().unwrap().push((slot, None));
        }

        fn on_request_complete(&self, slot: RequestSlot, success: bool) {
            self.0.lock().unwrap().push((slot, Some(success)));
        }
    }

    struct RecordingLog(StdMutex<Vec<&'static str>>);

    impl SessionEventLog for RecordingLog {
        fn log(&self, event: SessionEvent) {
            self.0.lock().unwrap().push(event.event_type);
        }
    }

    async fn ready(gateway: Arc<MockGateway>) -> CouncilSession {
        let session = CouncilSession::new(gateway);
        session.start().await;
        assert!(session.dispatch(SessionAction::SetQuestion("What matters?".into())).await);
        assert!(session.dispatch(SessionAction::SubmitQuestion).await);
        session
    }

    async fn ask(session: &CouncilSession, perspective: &str) {
        assert!(
            session
                .dispatch(SessionAction::SelectPerspective(perspective.into()))
                .await
        );
        assert!(session.dispatch(SessionAction::RequestAnswer).await);
    }

    #[tokio::test]
    async fn test_start_loads_both_catalogs() {
        let session = CouncilSession::new(Arc::new(MockGateway::new()));
        session.start().await;

        let state = session.snapshot();
        assert_eq!(state.perspectives().map(|c| c.len()), Some(3));
        assert_eq!(state.selected_provider(), Some(&Provider::Local));
        assert_eq!(state.selected_model(), Some(&ModelId::from("m1")));
        assert!(!state.loading().any());
        assert!(state.error().is_none());
    }

    #[tokio::test]
    async fn test_answer_round_trip() {
        let session = ready(Arc::new(MockGateway::new())).await;
        ask(&session, "Stoicism").await;

        let state = session.snapshot();
        assert_eq!(state.active_tab(), Some(&PerspectiveId::from("Stoicism")));
        assert_eq!(state.active_answer().unwrap().text, "Answer from Stoicism");
        assert!(!state.loading().answer);
    }

    #[tokio::test]
    async fn test_second_request_while_pending_is_refused() {
        let gate = Arc::new(Notify::new());
        let gateway = Arc::new(MockGateway::new().with_answer_gate(gate.clone()));
        let session = ready(gateway.clone()).await;

        let first = session.dispatch(SessionAction::RequestAnswer);
        let second = async {
            let accepted = session.dispatch(SessionAction::RequestAnswer).await;
            gate.notify_one();
            accepted
        };
        let (first, second) = tokio::join!(first, second);

        assert!(first);
        assert!(!second);
        assert_eq!(gateway.answer_calls(), 1);
        assert_eq!(session.snapshot().answers().len(), 1);
    }

    #[tokio::test]
    async fn test_reset_discards_pending_answer() {
        let gate = Arc::new(Notify::new());
        let gateway = Arc::new(MockGateway::new().with_answer_gate(gate.clone()));
        let session = ready(gateway).await;

        let pending = session.dispatch(SessionAction::RequestAnswer);
        let reset = async {
            let accepted = session.dispatch(SessionAction::Reset).await;
            gate.notify_one();
            accepted
        };
        let (requested, reset) = tokio::join!(pending, reset);

        assert!(requested && reset);
        let state = session.snapshot();
        assert!(state.answers().is_empty());
        assert!(!state.is_submitted());
        assert!(!state.loading().answer);
    }

    #[tokio::test]
    async fn test_failed_answer_surfaces_error_and_retry() {
        let gateway = Arc::new(MockGateway::new());
        gateway.script_answer(None);
        let session = ready(gateway).await;
        ask(&session, "Zen").await;

        let state = session.snapshot();
        assert!(state.answers().is_empty());
        assert_eq!(state.error().map(|e| e.kind()), Some(ErrorKind::Generation));

        let retry = state.retry_action().unwrap();
        assert!(session.dispatch(retry).await);
        let state = session.snapshot();
        assert!(state.error().is_none());
        assert!(state.answers().contains(&"Zen".into()));
    }

    #[tokio::test]
    async fn test_conclusion_requires_two_answers() {
        let gateway = Arc::new(MockGateway::new());
        let session = ready(gateway.clone()).await;
        ask(&session, "Stoicism").await;
        assert!(!session.dispatch(SessionAction::RequestConclusion).await);
        assert_eq!(gateway.conclusion_calls(), 0);

        ask(&session, "Zen").await;
        assert!(session.dispatch(SessionAction::RequestConclusion).await);
        assert_eq!(gateway.conclusion_calls(), 1);
        assert_eq!(
            session.snapshot().conclusion().map(|c| c.text.as_str()),
            Some("They agree.")
        );
    }

    #[tokio::test]
    async fn test_select_provider_refetches_models() {
        let gateway = Arc::new(MockGateway::new());
        gateway.set_available(Provider::OpenRouter, Some(true));
        let session = ready(gateway).await;

        assert!(
            session
                .dispatch(SessionAction::SelectProvider(Provider::OpenRouter))
                .await
        );
        let state = session.snapshot();
        assert_eq!(state.selected_model(), Some(&ModelId::from("gpt-4")));
        assert!(!state.loading().models);
    }

    #[tokio::test]
    async fn test_no_usable_provider_blocks_generation() {
        let gateway = Arc::new(MockGateway::new());
        gateway.set_available(Provider::Local, Some(false));
        let session = ready(gateway.clone()).await;

        let state = session.snapshot();
        assert_eq!(state.error().map(|e| e.kind()), Some(ErrorKind::Configuration));
        assert!(!session.dispatch(SessionAction::RequestAnswer).await);
        assert_eq!(gateway.answer_calls(), 0);
    }

    #[tokio::test]
    async fn test_progress_and_session_log() {
        let progress = Arc::new(RecordingProgress(StdMutex::new(Vec::new())));
        let log = Arc::new(RecordingLog(StdMutex::new(Vec::new())));
        let session = CouncilSession::new(Arc::new(MockGateway::new()))
            .with_progress(progress.clone())
            .with_session_log(log.clone());
        session.dispatch(SessionAction::LoadPerspectives).await;
        session.dispatch(SessionAction::LoadProviders).await;
        session.dispatch(SessionAction::SetQuestion("Q".into())).await;
        session.dispatch(SessionAction::SubmitQuestion).await;
        session.dispatch(SessionAction::RequestAnswer).await;
        session.dispatch(SessionAction::Reset).await;

        let events = progress.0.lock().unwrap().clone();
        assert!(events.contains(&(RequestSlot::Answer, None)));
        assert!(events.contains(&(RequestSlot::Answer, Some(true))));
        assert_eq!(
            *log.0.lock().unwrap(),
            vec!["answer_generated", "session_reset"]
        );
    }
}
