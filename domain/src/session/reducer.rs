//! Pure session reducer
//!
//! `reduce(state, action)` consumes the current [`SessionState`] and returns
//! the next one together with the [`Effect`]s to run. Every action is total:
//! when its preconditions do not hold the state is returned untouched and the
//! transition is reported as ignored.

use super::action::SessionAction;
use super::conclusion::Conclusion;
use super::effect::{AnswerRequest, ConclusionRequest, Effect};
use super::answer::Answer;
use super::state::{LoadingFlags, RequestSlot, SessionEpoch, SessionState};
use crate::catalog::perspective::{PerspectiveCatalog, PerspectiveId};
use crate::catalog::provider::{ModelId, Provider, ProviderCatalog};
use crate::core::error::SessionError;
use crate::core::question::Question;

/// Result of a state transition
#[derive(Debug)]
pub struct Transition {
    pub state: SessionState,
    pub effects: Vec<Effect>,
    changed: bool,
}

impl Transition {
    fn applied(state: SessionState) -> Self {
        Self {
            state,
            effects: Vec::new(),
            changed: true,
        }
    }

    fn ignored(state: SessionState) -> Self {
        Self {
            state,
            effects: Vec::new(),
            changed: false,
        }
    }

    fn with_effect(mut self, effect: Effect) -> Self {
        self.effects.push(effect);
        self
    }

    /// False when the action's preconditions did not hold (a no-op)
    pub fn changed(&self) -> bool {
        self.changed
    }

    pub fn into_parts(self) -> (SessionState, Vec<Effect>) {
        (self.state, self.effects)
    }
}

/// Pure transition function
pub fn reduce(state: SessionState, action: SessionAction) -> Transition {
    match action {
        SessionAction::SetQuestion(text) => set_question(state, text),
        SessionAction::SubmitQuestion => submit_question(state),
        SessionAction::ToggleQuestionDetail => toggle_question_detail(state),
        SessionAction::SelectPerspective(id) => select_perspective(state, id),
        SessionAction::SelectProvider(provider) => select_provider(state, provider),
        SessionAction::SelectModel(model) => select_model(state, model),
        SessionAction::SelectTab(perspective) => select_tab(state, perspective),
        SessionAction::RemoveAnswer(perspective) => remove_answer(state, perspective),
        SessionAction::DismissError => dismiss_error(state),
        SessionAction::Reset => reset(state),
        SessionAction::LoadPerspectives => {
            start_catalog_load(state, RequestSlot::Perspectives, Effect::LoadPerspectives)
        }
        SessionAction::PerspectivesLoaded(result) => perspectives_loaded(state, result),
        SessionAction::LoadProviders => {
            start_catalog_load(state, RequestSlot::Providers, Effect::LoadProviders)
        }
        SessionAction::ProvidersLoaded(result) => providers_loaded(state, result),
        SessionAction::ModelsLoaded { provider, result } => {
            models_loaded(state, provider, result)
        }
        SessionAction::RequestAnswer => request_answer(state),
        SessionAction::AnswerCompleted { epoch, result } => {
            answer_completed(state, epoch, result)
        }
        SessionAction::RequestConclusion => request_conclusion(state),
        SessionAction::ConclusionCompleted { epoch, result } => {
            conclusion_completed(state, epoch, result)
        }
    }
}

// ==================== Error slot ====================

fn fail(state: &mut SessionState, slot: RequestSlot, error: SessionError) {
    state.error = Some(error);
    state.error_slot = Some(slot);
}

fn clear_error(state: &mut SessionState) {
    state.error = None;
    state.error_slot = None;
}

/// Clear the error only if `slot` raised it
fn clear_error_from(state: &mut SessionState, slot: RequestSlot) {
    if state.error_slot == Some(slot) {
        clear_error(state);
    }
}

/// Provider and model pickers are frozen while a generation is pending
fn selection_locked(state: &SessionState) -> bool {
    state.loading.answer || state.loading.conclusion
}

// ==================== Question ====================

fn set_question(mut state: SessionState, text: String) -> Transition {
    if state.submitted {
        return Transition::ignored(state);
    }
    state.question = Question::new(text);
    Transition::applied(state)
}

fn submit_question(mut state: SessionState) -> Transition {
    if !state.can_submit() {
        return Transition::ignored(state);
    }
    state.submitted = true;
    state.question_detail_open = false;
    Transition::applied(state)
}

fn toggle_question_detail(mut state: SessionState) -> Transition {
    if !state.submitted {
        return Transition::ignored(state);
    }
    state.question_detail_open = !state.question_detail_open;
    Transition::applied(state)
}

// ==================== Selection ====================

fn select_perspective(mut state: SessionState, id: PerspectiveId) -> Transition {
    let known = state
        .perspectives
        .as_ref()
        .is_some_and(|catalog| catalog.contains(&id));
    if !known {
        return Transition::ignored(state);
    }
    state.selected_perspective = Some(id);
    Transition::applied(state)
}

fn select_provider(mut state: SessionState, provider: Provider) -> Transition {
    if selection_locked(&state) {
        return Transition::ignored(state);
    }
    let Some(catalog) = state.providers.as_ref() else {
        return Transition::ignored(state);
    };
    if !catalog.is_available(&provider) {
        return Transition::ignored(state);
    }
    let first_cached = catalog.models_for(&provider).first().cloned();

    state.selected_model = first_cached;
    state.selected_provider = Some(provider.clone());
    state.loading.models = true;
    state.models_request = Some(provider.clone());
    clear_error_from(&mut state, RequestSlot::Models);
    Transition::applied(state).with_effect(Effect::LoadModels { provider })
}

fn select_model(mut state: SessionState, model: ModelId) -> Transition {
    if selection_locked(&state) {
        return Transition::ignored(state);
    }
    let offered = match (&state.providers, &state.selected_provider) {
        (Some(catalog), Some(provider)) => catalog.offers_model(provider, &model),
        _ => false,
    };
    if !offered {
        return Transition::ignored(state);
    }
    state.selected_model = Some(model);
    Transition::applied(state)
}

fn select_tab(mut state: SessionState, perspective: PerspectiveId) -> Transition {
    if !state.answers.contains(&perspective) {
        return Transition::ignored(state);
    }
    state.active_tab = Some(perspective);
    Transition::applied(state)
}

// ==================== Answers ====================

fn remove_answer(mut state: SessionState, perspective: PerspectiveId) -> Transition {
    if state.answers.remove(&perspective).is_none() {
        return Transition::ignored(state);
    }
    if state.active_tab.as_ref() == Some(&perspective) {
        state.active_tab = state.answers.first().cloned();
    }
    Transition::applied(state)
}

fn dismiss_error(mut state: SessionState) -> Transition {
    if state.error.is_none() {
        return Transition::ignored(state);
    }
    clear_error(&mut state);
    Transition::applied(state)
}

fn reset(state: SessionState) -> Transition {
    let selected_perspective = state
        .perspectives
        .as_ref()
        .and_then(|catalog| catalog.first().cloned());

    let next = SessionState {
        perspectives: state.perspectives,
        providers: state.providers,
        selected_perspective,
        selected_provider: state.selected_provider,
        selected_model: state.selected_model,
        models_request: state.models_request,
        loading: LoadingFlags {
            answer: false,
            conclusion: false,
            ..state.loading
        },
        epoch: state.epoch.next(),
        ..SessionState::default()
    };
    Transition::applied(next)
}

// ==================== Catalogs ====================

fn start_catalog_load(mut state: SessionState, slot: RequestSlot, effect: Effect) -> Transition {
    if state.loading.get(slot) {
        return Transition::ignored(state);
    }
    state.loading.set(slot, true);
    clear_error(&mut state);
    Transition::applied(state).with_effect(effect)
}

fn perspectives_loaded(
    mut state: SessionState,
    result: Result<PerspectiveCatalog, SessionError>,
) -> Transition {
    state.loading.perspectives = false;
    match result {
        Ok(catalog) => {
            let selection_valid = state
                .selected_perspective
                .as_ref()
                .is_some_and(|p| catalog.contains(p));
            if !selection_valid {
                state.selected_perspective = catalog.first().cloned();
            }

            state.answers.retain(|p| catalog.contains(p));
            let tab_valid = state
                .active_tab
                .as_ref()
                .is_some_and(|p| state.answers.contains(p));
            if !tab_valid {
                state.active_tab = state.answers.first().cloned();
            }

            state.perspectives = Some(catalog);
            clear_error_from(&mut state, RequestSlot::Perspectives);
        }
        Err(error) => fail(&mut state, RequestSlot::Perspectives, error),
    }
    Transition::applied(state)
}

/// Keep the current provider if it is still usable, else take the first usable one
fn choose_provider(current: Option<&Provider>, catalog: &ProviderCatalog) -> Option<Provider> {
    current
        .filter(|p| catalog.is_available(p))
        .or_else(|| catalog.first_usable())
        .cloned()
}

fn providers_loaded(
    mut state: SessionState,
    result: Result<ProviderCatalog, SessionError>,
) -> Transition {
    state.loading.providers = false;
    let catalog = match result {
        Ok(catalog) => catalog,
        Err(error) => {
            fail(&mut state, RequestSlot::Providers, error);
            return Transition::applied(state);
        }
    };

    clear_error_from(&mut state, RequestSlot::Providers);
    match choose_provider(state.selected_provider.as_ref(), &catalog) {
        None => {
            state.selected_provider = None;
            state.selected_model = None;
            fail(&mut state, RequestSlot::Providers, SessionError::no_providers());
        }
        Some(provider) => {
            let models = catalog.models_for(&provider);
            let same_provider = state.selected_provider.as_ref() == Some(&provider);
            let kept = state
                .selected_model
                .take()
                .filter(|m| same_provider && models.contains(m));
            state.selected_model = kept.or_else(|| models.first().cloned());
            if state.selected_model.is_none() {
                fail(&mut state, RequestSlot::Models, SessionError::no_models(&provider));
            }
            state.selected_provider = Some(provider);
        }
    }
    state.providers = Some(catalog);
    Transition::applied(state)
}

fn models_loaded(
    mut state: SessionState,
    provider: Provider,
    result: Result<Vec<ModelId>, SessionError>,
) -> Transition {
    let latest = state.models_request.as_ref() == Some(&provider);
    if latest {
        state.models_request = None;
        state.loading.models = false;
    }
    if state.selected_provider.as_ref() != Some(&provider) {
        // the selection moved on; only the loading flag is settled
        return if latest {
            Transition::applied(state)
        } else {
            Transition::ignored(state)
        };
    }
    match result {
        Ok(models) => {
            state.selected_model = models.first().cloned();
            if let Some(catalog) = state.providers.as_mut() {
                catalog.set_models(provider.clone(), models);
            }
            if state.selected_model.is_none() {
                fail(&mut state, RequestSlot::Models, SessionError::no_models(&provider));
            } else {
                clear_error_from(&mut state, RequestSlot::Models);
            }
        }
        Err(error) => fail(&mut state, RequestSlot::Models, error),
    }
    Transition::applied(state)
}

// ==================== Generation ====================

fn request_answer(mut state: SessionState) -> Transition {
    if !state.can_generate_answer() {
        return Transition::ignored(state);
    }
    let (Some(perspective), Some(provider), Some(model)) = (
        state.selected_perspective.clone(),
        state.selected_provider.clone(),
        state.selected_model.clone(),
    ) else {
        return Transition::ignored(state);
    };

    state.loading.answer = true;
    clear_error(&mut state);
    let request = AnswerRequest {
        epoch: state.epoch,
        question: state.question.content().to_string(),
        perspective,
        provider,
        model,
    };
    Transition::applied(state).with_effect(Effect::GenerateAnswer(request))
}

fn answer_completed(
    mut state: SessionState,
    epoch: SessionEpoch,
    result: Result<Answer, SessionError>,
) -> Transition {
    if epoch != state.epoch || !state.loading.answer {
        return Transition::ignored(state);
    }
    state.loading.answer = false;
    match result {
        Ok(answer) => {
            let known = state
                .perspectives
                .as_ref()
                .is_none_or(|catalog| catalog.contains(&answer.perspective));
            if known {
                state.active_tab = Some(answer.perspective.clone());
                state.answers.upsert(answer);
                clear_error_from(&mut state, RequestSlot::Answer);
            } else {
                let error = SessionError::unknown_perspective(&answer.perspective);
                fail(&mut state, RequestSlot::Answer, error);
            }
        }
        Err(error) => fail(&mut state, RequestSlot::Answer, error),
    }
    Transition::applied(state)
}

fn request_conclusion(mut state: SessionState) -> Transition {
    if !state.can_synthesize() {
        return Transition::ignored(state);
    }
    let (Some(provider), Some(model)) =
        (state.selected_provider.clone(), state.selected_model.clone())
    else {
        return Transition::ignored(state);
    };

    state.loading.conclusion = true;
    clear_error(&mut state);
    let request = ConclusionRequest {
        epoch: state.epoch,
        answers: state.answers.texts(),
        sources: state.answers.revisions(),
        provider,
        model,
    };
    Transition::applied(state).with_effect(Effect::SynthesizeConclusion(request))
}

fn conclusion_completed(
    mut state: SessionState,
    epoch: SessionEpoch,
    result: Result<Conclusion, SessionError>,
) -> Transition {
    if epoch != state.epoch || !state.loading.conclusion {
        return Transition::ignored(state);
    }
    state.loading.conclusion = false;
    match result {
        Ok(conclusion) => {
            state.conclusion = Some(conclusion);
            clear_error_from(&mut state, RequestSlot::Conclusion);
        }
        Err(error) => fail(&mut state, RequestSlot::Conclusion, error),
    }
    Transition::applied(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::error::ErrorKind;

    // ==================== Helpers ====================

    fn apply(state: SessionState, action: SessionAction) -> SessionState {
        reduce(state, action).state
    }

    fn perspectives() -> PerspectiveCatalog {
        PerspectiveCatalog::from_pairs([
            ("Existentialism", "Existence precedes essence."),
            ("Stoicism", "Focus on what you control."),
            ("Zen", "Sit."),
        ])
    }

    fn providers() -> ProviderCatalog {
        ProviderCatalog::new([(Provider::Local, true), (Provider::OpenRouter, true)])
            .with_models(Provider::Local, vec!["m1".into(), "m2".into()])
            .with_models(Provider::OpenRouter, vec!["gpt-4".into()])
    }

    /// Catalogs loaded, question submitted, Local/m1 selected
    fn ready() -> SessionState {
        let state = apply(
            SessionState::new(),
            SessionAction::PerspectivesLoaded(Ok(perspectives())),
        );
        let state = apply(state, SessionAction::ProvidersLoaded(Ok(providers())));
        let state = apply(state, SessionAction::SetQuestion("How should I live?".into()));
        apply(state, SessionAction::SubmitQuestion)
    }

    fn answer(p: &str, text: &str) -> Answer {
        Answer::new(p, text, Provider::Local, "m1")
    }

    /// Request and complete an answer for `p`
    fn generate(state: SessionState, p: &str, text: &str) -> SessionState {
        let state = apply(state, SessionAction::SelectPerspective(p.into()));
        let transition = reduce(state, SessionAction::RequestAnswer);
        assert!(transition.changed(), "answer request for {p} refused");
        let epoch = transition.state.epoch();
        apply(
            transition.state,
            SessionAction::AnswerCompleted {
                epoch,
                result: Ok(answer(p, text)),
            },
        )
    }

    fn order(state: &SessionState) -> Vec<String> {
        state.answers().perspectives().map(|p| p.to_string()).collect()
    }

    // ==================== Question ====================

    #[test]
    fn test_submit_non_blank_question_once() {
        let state = apply(SessionState::new(), SessionAction::SetQuestion("Why?".into()));
        let transition = reduce(state, SessionAction::SubmitQuestion);
        assert!(transition.changed());
        assert!(transition.state.is_submitted());
        assert!(transition.state.answers().is_empty());

        let again = reduce(transition.state, SessionAction::SubmitQuestion);
        assert!(!again.changed());
        assert!(again.state.is_submitted());
    }

    #[test]
    fn test_submit_blank_question_is_noop() {
        for text in ["", "   ", "\n\t "] {
            let state = apply(SessionState::new(), SessionAction::SetQuestion(text.into()));
            let before = state.clone();
            let transition = reduce(state, SessionAction::SubmitQuestion);
            assert!(!transition.changed());
            assert_eq!(transition.state, before);
        }
    }

    #[test]
    fn test_question_is_frozen_after_submit() {
        let state = ready();
        let transition = reduce(state, SessionAction::SetQuestion("Other".into()));
        assert!(!transition.changed());
        assert_eq!(transition.state.question().content(), "How should I live?");
    }

    #[test]
    fn test_submit_closes_question_detail() {
        let state = ready();
        let state = apply(state, SessionAction::ToggleQuestionDetail);
        assert!(state.is_question_detail_open());
        let state = apply(state, SessionAction::ToggleQuestionDetail);
        assert!(!state.is_question_detail_open());

        let draft = reduce(SessionState::new(), SessionAction::ToggleQuestionDetail);
        assert!(!draft.changed());
    }

    // ==================== Selection ====================

    #[test]
    fn test_first_perspective_selected_on_load() {
        let state = ready();
        assert_eq!(
            state.selected_perspective(),
            Some(&PerspectiveId::from("Existentialism"))
        );
    }

    #[test]
    fn test_select_unknown_perspective_is_noop() {
        let state = ready();
        let transition = reduce(state, SessionAction::SelectPerspective("Hedonism".into()));
        assert!(!transition.changed());
        assert_eq!(
            transition.state.selected_perspective(),
            Some(&PerspectiveId::from("Existentialism"))
        );
    }

    #[test]
    fn test_select_perspective_leaves_answers() {
        let state = generate(ready(), "Stoicism", "A1");
        let state = apply(state, SessionAction::SelectPerspective("Zen".into()));
        assert_eq!(order(&state), vec!["Stoicism"]);
    }

    #[test]
    fn test_select_provider_refetches_models() {
        let state = ready();
        let transition = reduce(state, SessionAction::SelectProvider(Provider::OpenRouter));
        assert!(transition.changed());
        assert_eq!(
            transition.effects,
            vec![Effect::LoadModels {
                provider: Provider::OpenRouter
            }]
        );
        assert!(transition.state.loading().models);
        assert_eq!(transition.state.selected_model(), Some(&ModelId::from("gpt-4")));

        let state = apply(
            transition.state,
            SessionAction::ModelsLoaded {
                provider: Provider::OpenRouter,
                result: Ok(vec!["claude".into(), "gpt-4".into()]),
            },
        );
        assert!(!state.loading().models);
        assert_eq!(state.selected_model(), Some(&ModelId::from("claude")));
        assert_eq!(state.available_models().len(), 2);
    }

    #[test]
    fn test_empty_model_list_clears_model() {
        let state = apply(ready(), SessionAction::SelectProvider(Provider::OpenRouter));
        let state = apply(
            state,
            SessionAction::ModelsLoaded {
                provider: Provider::OpenRouter,
                result: Ok(vec![]),
            },
        );
        assert!(state.selected_model().is_none());
        assert_eq!(state.error().map(|e| e.kind()), Some(ErrorKind::Configuration));
        assert!(!state.can_generate_answer());
    }

    #[test]
    fn test_models_for_deselected_provider_are_discarded() {
        let state = apply(ready(), SessionAction::SelectProvider(Provider::OpenRouter));
        let state = apply(state, SessionAction::SelectProvider(Provider::Local));
        let before = state.clone();
        let transition = reduce(
            state,
            SessionAction::ModelsLoaded {
                provider: Provider::OpenRouter,
                result: Ok(vec!["late".into()]),
            },
        );
        assert!(!transition.changed());
        assert_eq!(transition.state, before);
    }

    #[test]
    fn test_models_for_replaced_provider_settle_loading() {
        let state = apply(ready(), SessionAction::SelectProvider(Provider::OpenRouter));
        assert!(state.loading().models);
        // OpenRouter disappears while its model fetch is pending
        let state = apply(
            state,
            SessionAction::ProvidersLoaded(Ok(ProviderCatalog::new([(Provider::Local, true)])
                .with_models(Provider::Local, vec!["m1".into()]))),
        );
        assert_eq!(state.selected_provider(), Some(&Provider::Local));
        assert!(state.loading().models);

        let transition = reduce(
            state,
            SessionAction::ModelsLoaded {
                provider: Provider::OpenRouter,
                result: Ok(vec!["late".into()]),
            },
        );
        assert!(transition.changed());
        let state = transition.state;
        assert!(!state.loading().models);
        assert_eq!(state.selected_provider(), Some(&Provider::Local));
        assert_eq!(state.selected_model(), Some(&ModelId::from("m1")));
        assert!(state.providers().unwrap().models_for(&Provider::OpenRouter).is_empty());
    }

    #[test]
    fn test_models_failure_keeps_cached_list() {
        let state = apply(ready(), SessionAction::SelectProvider(Provider::Local));
        let state = apply(
            state,
            SessionAction::ModelsLoaded {
                provider: Provider::Local,
                result: Err(SessionError::models_unavailable(&Provider::Local)),
            },
        );
        assert_eq!(state.available_models().len(), 2);
        assert_eq!(state.selected_model(), Some(&ModelId::from("m1")));
        assert_eq!(state.error().map(|e| e.kind()), Some(ErrorKind::CatalogLoad));
    }

    #[test]
    fn test_select_unavailable_provider_is_noop() {
        let state = apply(
            SessionState::new(),
            SessionAction::ProvidersLoaded(Ok(ProviderCatalog::new([
                (Provider::Local, true),
                (Provider::OpenRouter, false),
            ])
            .with_models(Provider::Local, vec!["m1".into()]))),
        );
        let transition = reduce(state, SessionAction::SelectProvider(Provider::OpenRouter));
        assert!(!transition.changed());
        assert_eq!(transition.state.selected_provider(), Some(&Provider::Local));
    }

    #[test]
    fn test_select_model_must_be_offered() {
        let state = ready();
        let state = apply(state, SessionAction::SelectModel("m2".into()));
        assert_eq!(state.selected_model(), Some(&ModelId::from("m2")));

        let transition = reduce(state, SessionAction::SelectModel("gpt-4".into()));
        assert!(!transition.changed());
        assert_eq!(transition.state.selected_model(), Some(&ModelId::from("m2")));
    }

    #[test]
    fn test_selection_locked_while_generating() {
        let state = reduce(ready(), SessionAction::RequestAnswer).state;
        let transition = reduce(state, SessionAction::SelectModel("m2".into()));
        assert!(!transition.changed());
        let transition = reduce(transition.state, SessionAction::SelectProvider(Provider::OpenRouter));
        assert!(!transition.changed());
    }

    // ==================== Providers ====================

    #[test]
    fn test_no_usable_provider_is_configuration_error() {
        let state = apply(
            SessionState::new(),
            SessionAction::PerspectivesLoaded(Ok(perspectives())),
        );
        let state = apply(
            state,
            SessionAction::ProvidersLoaded(Ok(ProviderCatalog::new([
                (Provider::Local, false),
                (Provider::OpenRouter, false),
            ]))),
        );
        let state = apply(state, SessionAction::SetQuestion("Q".into()));
        let state = apply(state, SessionAction::SubmitQuestion);

        assert_eq!(state.error().map(|e| e.kind()), Some(ErrorKind::Configuration));
        assert!(state.selected_provider().is_none());
        let transition = reduce(state, SessionAction::RequestAnswer);
        assert!(!transition.changed());
        assert!(transition.effects.is_empty());
    }

    #[test]
    fn test_provider_reload_keeps_valid_selection() {
        let state = apply(ready(), SessionAction::SelectProvider(Provider::OpenRouter));
        let state = apply(
            state,
            SessionAction::ModelsLoaded {
                provider: Provider::OpenRouter,
                result: Ok(vec!["gpt-4".into()]),
            },
        );
        let state = apply(state, SessionAction::ProvidersLoaded(Ok(providers())));
        assert_eq!(state.selected_provider(), Some(&Provider::OpenRouter));
        assert_eq!(state.selected_model(), Some(&ModelId::from("gpt-4")));
    }

    #[test]
    fn test_catalog_failure_keeps_previous_data() {
        let state = ready();
        let state = apply(state, SessionAction::LoadPerspectives);
        let state = apply(
            state,
            SessionAction::PerspectivesLoaded(Err(SessionError::perspectives_unavailable())),
        );
        assert_eq!(state.perspectives(), Some(&perspectives()));
        assert_eq!(state.error().map(|e| e.kind()), Some(ErrorKind::CatalogLoad));

        let state = apply(state, SessionAction::LoadProviders);
        let state = apply(
            state,
            SessionAction::ProvidersLoaded(Err(SessionError::providers_unavailable())),
        );
        assert_eq!(state.providers(), Some(&providers()));
        assert_eq!(state.selected_provider(), Some(&Provider::Local));
    }

    #[test]
    fn test_catalog_load_refused_while_loading() {
        let transition = reduce(SessionState::new(), SessionAction::LoadPerspectives);
        assert_eq!(transition.effects, vec![Effect::LoadPerspectives]);
        let again = reduce(transition.state, SessionAction::LoadPerspectives);
        assert!(!again.changed());
        assert!(again.effects.is_empty());
    }

    #[test]
    fn test_catalog_loads_may_overlap_with_generation() {
        let state = reduce(ready(), SessionAction::RequestAnswer).state;
        let transition = reduce(state, SessionAction::LoadProviders);
        assert!(transition.changed());
        assert!(transition.state.loading().answer);
        assert!(transition.state.loading().providers);
    }

    // ==================== Answers ====================

    #[test]
    fn test_request_answer_emits_request() {
        let transition = reduce(ready(), SessionAction::RequestAnswer);
        assert!(transition.changed());
        assert!(transition.state.loading().answer);
        assert_eq!(
            transition.effects,
            vec![Effect::GenerateAnswer(AnswerRequest {
                epoch: SessionEpoch::default(),
                question: "How should I live?".to_string(),
                perspective: "Existentialism".into(),
                provider: Provider::Local,
                model: "m1".into(),
            })]
        );
    }

    #[test]
    fn test_second_answer_request_is_refused() {
        let state = reduce(ready(), SessionAction::RequestAnswer).state;
        let before = state.clone();
        let transition = reduce(state, SessionAction::RequestAnswer);
        assert!(!transition.changed());
        assert!(transition.effects.is_empty());
        assert_eq!(transition.state, before);
    }

    #[test]
    fn test_answer_requires_submitted_question() {
        let state = apply(
            SessionState::new(),
            SessionAction::PerspectivesLoaded(Ok(perspectives())),
        );
        let state = apply(state, SessionAction::ProvidersLoaded(Ok(providers())));
        let state = apply(state, SessionAction::SetQuestion("Q".into()));
        assert!(!reduce(state, SessionAction::RequestAnswer).changed());
    }

    #[test]
    fn test_answer_success_sets_active_tab() {
        let state = generate(ready(), "Stoicism", "A1");
        assert_eq!(order(&state), vec!["Stoicism"]);
        assert_eq!(state.active_tab(), Some(&PerspectiveId::from("Stoicism")));
        assert_eq!(state.active_answer().unwrap().text, "A1");
        assert!(!state.loading().answer);
    }

    #[test]
    fn test_regeneration_overwrites_only_that_perspective() {
        let state = generate(ready(), "Stoicism", "A1");
        let state = generate(state, "Zen", "B1");
        let state = generate(state, "Existentialism", "C1");
        let state = apply(state, SessionAction::SelectTab("Zen".into()));

        let state = generate(state, "Stoicism", "A2");

        assert_eq!(order(&state), vec!["Stoicism", "Zen", "Existentialism"]);
        assert_eq!(state.answers().get(&"Stoicism".into()).unwrap().text, "A2");
        assert_eq!(state.answers().get(&"Zen".into()).unwrap().text, "B1");
        assert_eq!(state.answers().get(&"Existentialism".into()).unwrap().text, "C1");
        assert_eq!(state.active_tab(), Some(&PerspectiveId::from("Stoicism")));
    }

    #[test]
    fn test_answer_failure_leaves_answers() {
        let state = generate(ready(), "Stoicism", "A1");
        let transition = reduce(state, SessionAction::RequestAnswer);
        let epoch = transition.state.epoch();
        let before = transition.state.answers().clone();
        let state = apply(
            transition.state,
            SessionAction::AnswerCompleted {
                epoch,
                result: Err(SessionError::answer_failed()),
            },
        );
        assert_eq!(state.answers(), &before);
        assert_eq!(state.error(), Some(&SessionError::answer_failed()));
        assert!(!state.loading().answer);
        assert!(state.can_generate_answer());
    }

    #[test]
    fn test_request_clears_previous_error() {
        let state = apply(ready(), SessionAction::LoadPerspectives);
        let state = apply(
            state,
            SessionAction::PerspectivesLoaded(Err(SessionError::perspectives_unavailable())),
        );
        assert!(state.error().is_some());
        let state = apply(state, SessionAction::RequestAnswer);
        assert!(state.error().is_none());
    }

    #[test]
    fn test_remove_active_tab_moves_to_next() {
        let state = generate(ready(), "Stoicism", "A1");
        let state = generate(state, "Zen", "B1");
        let state = apply(state, SessionAction::SelectTab("Stoicism".into()));

        let state = apply(state, SessionAction::RemoveAnswer("Stoicism".into()));
        assert_eq!(state.active_tab(), Some(&PerspectiveId::from("Zen")));

        let state = apply(state, SessionAction::RemoveAnswer("Zen".into()));
        assert!(state.active_tab().is_none());
        assert!(state.answers().is_empty());
    }

    #[test]
    fn test_remove_inactive_answer_keeps_tab() {
        let state = generate(ready(), "Stoicism", "A1");
        let state = generate(state, "Zen", "B1");
        let state = apply(state, SessionAction::RemoveAnswer("Stoicism".into()));
        assert_eq!(state.active_tab(), Some(&PerspectiveId::from("Zen")));
    }

    #[test]
    fn test_remove_missing_answer_is_noop() {
        let state = generate(ready(), "Stoicism", "A1");
        let transition = reduce(state, SessionAction::RemoveAnswer("Zen".into()));
        assert!(!transition.changed());
    }

    #[test]
    fn test_select_tab_requires_answer() {
        let state = generate(ready(), "Stoicism", "A1");
        assert!(!reduce(state, SessionAction::SelectTab("Zen".into())).changed());
    }

    // ==================== Conclusion ====================

    #[test]
    fn test_conclusion_requires_two_answers() {
        let state = ready();
        assert!(!reduce(state.clone(), SessionAction::RequestConclusion).changed());

        let state = generate(state, "Stoicism", "A1");
        let transition = reduce(state, SessionAction::RequestConclusion);
        assert!(!transition.changed());
        assert!(transition.effects.is_empty());
    }

    #[test]
    fn test_conclusion_snapshot_and_completion() {
        let state = generate(ready(), "Stoicism", "text1");
        let state = generate(state, "Existentialism", "text2");
        let answers_before = state.answers().clone();

        let transition = reduce(state, SessionAction::RequestConclusion);
        assert!(transition.changed());
        let Effect::SynthesizeConclusion(request) = &transition.effects[0] else {
            panic!("expected a synthesis effect");
        };
        assert_eq!(
            request.answers,
            vec![
                (PerspectiveId::from("Stoicism"), "text1".to_string()),
                (PerspectiveId::from("Existentialism"), "text2".to_string()),
            ]
        );
        assert_eq!(request.model, ModelId::from("m1"));

        let conclusion =
            Conclusion::new("Both agree.", "m1").with_sources(request.sources.clone());
        let epoch = request.epoch;
        let state = apply(
            transition.state,
            SessionAction::ConclusionCompleted {
                epoch,
                result: Ok(conclusion),
            },
        );
        assert_eq!(state.conclusion().unwrap().text, "Both agree.");
        assert_eq!(state.answers(), &answers_before);
        assert!(!state.conclusion_is_stale());
    }

    #[test]
    fn test_second_conclusion_request_is_refused() {
        let state = generate(ready(), "Stoicism", "a");
        let state = generate(state, "Zen", "b");
        let state = apply(state, SessionAction::RequestConclusion);
        let transition = reduce(state, SessionAction::RequestConclusion);
        assert!(!transition.changed());
        assert!(transition.effects.is_empty());
    }

    #[test]
    fn test_regeneration_keeps_conclusion_but_marks_it_stale() {
        let state = generate(ready(), "Stoicism", "a");
        let state = generate(state, "Zen", "b");
        let transition = reduce(state, SessionAction::RequestConclusion);
        let Effect::SynthesizeConclusion(request) = transition.effects[0].clone() else {
            panic!("expected a synthesis effect");
        };
        let state = apply(
            transition.state,
            SessionAction::ConclusionCompleted {
                epoch: request.epoch,
                result: Ok(Conclusion::new("c", "m1").with_sources(request.sources)),
            },
        );

        let state = generate(state, "Zen", "b2");
        assert_eq!(state.conclusion().unwrap().text, "c");
        assert!(state.conclusion_is_stale());
    }

    #[test]
    fn test_conclusion_failure_leaves_previous_conclusion() {
        let state = generate(ready(), "Stoicism", "a");
        let state = generate(state, "Zen", "b");
        let transition = reduce(state, SessionAction::RequestConclusion);
        let epoch = transition.state.epoch();
        let state = apply(
            transition.state,
            SessionAction::ConclusionCompleted {
                epoch,
                result: Ok(Conclusion::new("first", "m1")),
            },
        );
        let state = apply(state, SessionAction::RequestConclusion);
        let state = apply(
            state,
            SessionAction::ConclusionCompleted {
                epoch,
                result: Err(SessionError::conclusion_failed()),
            },
        );
        assert_eq!(state.conclusion().unwrap().text, "first");
        assert_eq!(state.error(), Some(&SessionError::conclusion_failed()));
    }

    // ==================== Reset & epochs ====================

    #[test]
    fn test_reset_restores_initial_values() {
        let state = generate(ready(), "Stoicism", "a");
        let state = generate(state, "Zen", "b");
        let state = apply(state, SessionAction::SelectPerspective("Zen".into()));
        let state = apply(state, SessionAction::RequestAnswer);
        let state = apply(state, SessionAction::LoadPerspectives);
        let state = apply(
            state,
            SessionAction::PerspectivesLoaded(Err(SessionError::perspectives_unavailable())),
        );

        let state = apply(state, SessionAction::Reset);

        assert!(state.question().content().is_empty());
        assert!(!state.is_submitted());
        assert!(state.answers().is_empty());
        assert!(state.active_tab().is_none());
        assert!(state.conclusion().is_none());
        assert!(state.error().is_none());
        assert!(!state.loading().answer);
        assert_eq!(state.perspectives(), Some(&perspectives()));
        assert_eq!(state.providers(), Some(&providers()));
        assert_eq!(
            state.selected_perspective(),
            Some(&PerspectiveId::from("Existentialism"))
        );
        assert_eq!(state.epoch(), SessionEpoch::new(1));
    }

    #[test]
    fn test_stale_answer_after_reset_is_discarded() {
        let transition = reduce(ready(), SessionAction::RequestAnswer);
        let old_epoch = transition.state.epoch();
        let state = apply(transition.state, SessionAction::Reset);
        let state = apply(state, SessionAction::SetQuestion("New question".into()));
        let state = apply(state, SessionAction::SubmitQuestion);
        let state = apply(state, SessionAction::RequestAnswer);
        let before = state.clone();

        let transition = reduce(
            state,
            SessionAction::AnswerCompleted {
                epoch: old_epoch,
                result: Ok(answer("Existentialism", "late")),
            },
        );

        assert!(!transition.changed());
        assert_eq!(transition.state, before);
        assert!(transition.state.loading().answer);
    }

    #[test]
    fn test_stale_conclusion_after_reset_is_discarded() {
        let state = generate(ready(), "Stoicism", "a");
        let state = generate(state, "Zen", "b");
        let transition = reduce(state, SessionAction::RequestConclusion);
        let old_epoch = transition.state.epoch();
        let state = apply(transition.state, SessionAction::Reset);

        let transition = reduce(
            state,
            SessionAction::ConclusionCompleted {
                epoch: old_epoch,
                result: Ok(Conclusion::new("late", "m1")),
            },
        );
        assert!(!transition.changed());
        assert!(transition.state.conclusion().is_none());
    }

    #[test]
    fn test_dismiss_error() {
        let state = apply(ready(), SessionAction::LoadPerspectives);
        let state = apply(
            state,
            SessionAction::PerspectivesLoaded(Err(SessionError::perspectives_unavailable())),
        );
        let state = apply(state, SessionAction::DismissError);
        assert!(state.error().is_none());
        assert!(!reduce(state, SessionAction::DismissError).changed());
    }

    #[test]
    fn test_answer_for_unknown_perspective_is_an_error() {
        let state = apply(ready(), SessionAction::SelectPerspective("Zen".into()));
        let transition = reduce(state, SessionAction::RequestAnswer);
        let epoch = transition.state.epoch();
        let state = apply(
            transition.state,
            SessionAction::AnswerCompleted {
                epoch,
                result: Ok(answer("Hedonism", "Enjoy.")),
            },
        );
        assert!(state.answers().is_empty());
        assert!(!state.loading().answer);
        assert_eq!(state.error_slot(), Some(RequestSlot::Answer));
        assert_eq!(
            state.error(),
            Some(&SessionError::unknown_perspective("Hedonism"))
        );
        assert_eq!(state.retry_action(), Some(SessionAction::RequestAnswer));
    }

    #[test]
    fn test_reloaded_catalog_prunes_unknown_answers() {
        let state = generate(ready(), "Stoicism", "a");
        let state = generate(state, "Zen", "b");
        let state = apply(
            state,
            SessionAction::PerspectivesLoaded(Ok(PerspectiveCatalog::from_pairs([(
                "Zen", "Sit.",
            )]))),
        );
        assert_eq!(order(&state), vec!["Zen"]);
        assert_eq!(state.active_tab(), Some(&PerspectiveId::from("Zen")));
        assert_eq!(state.selected_perspective(), Some(&PerspectiveId::from("Zen")));
    }
}
