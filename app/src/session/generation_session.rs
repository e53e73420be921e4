use std::{sync::Arc, time::Instant};

use anyhow::{anyhow, Result};
use codegen_core::{
    classify, find_language, reduce, Effect, Event, GenerationOutcome, GenerationRequest,
    InteractionState, SubmissionId, Transition,
};
use tokio::{
    sync::{broadcast, Mutex},
    task::JoinHandle,
};
use tracing::{debug, info, warn};

use crate::{
    llm::CodeGenerator,
    models::{RuntimeErrorEvent, SessionEvent},
};

const EVENT_BUFFER: usize = 64;

struct Shared {
    state: Mutex<InteractionState>,
    events: broadcast::Sender<SessionEvent>,
}

impl Shared {
    /// Feeds one event through the reducer and publishes the new state if it changed.
    async fn dispatch(&self, event: Event) -> Transition {
        let mut guard = self.state.lock().await;
        let current = std::mem::take(&mut *guard);
        let transition = reduce(current, event);
        *guard = transition.state.clone();
        drop(guard);

        if transition.applied {
            self.emit(SessionEvent::StateChanged(transition.state.clone()));
        }
        transition
    }

    fn emit(&self, event: SessionEvent) {
        let _ = self.events.send(event);
    }
}

/// Owns the single interaction state of a session and runs its generations.
#[derive(Clone)]
pub struct GenerationSession {
    shared: Arc<Shared>,
    generator: CodeGenerator,
}

/// A submission accepted by the session. `task` is absent when no request was issued.
pub struct SubmissionHandle {
    pub submission: SubmissionId,
    task: Option<JoinHandle<()>>,
}

impl SubmissionHandle {
    pub fn issued_request(&self) -> bool {
        self.task.is_some()
    }

    /// Waits until this submission's generation has settled.
    pub async fn finished(self) -> Result<()> {
        if let Some(task) = self.task {
            task.await
                .map_err(|error| anyhow!("generation task failed: {error}"))?;
        }
        Ok(())
    }
}

impl GenerationSession {
    pub fn new(generator: CodeGenerator) -> Self {
        let (events, _) = broadcast::channel(EVENT_BUFFER);
        Self {
            shared: Arc::new(Shared {
                state: Mutex::new(InteractionState::default()),
                events,
            }),
            generator,
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.shared.events.subscribe()
    }

    pub async fn snapshot(&self) -> InteractionState {
        self.shared.state.lock().await.clone()
    }

    pub async fn set_prompt(&self, prompt: impl Into<String>) {
        self.shared.dispatch(Event::PromptChanged(prompt.into())).await;
    }

    pub async fn set_language(&self, language_id: &str) -> Result<()> {
        if find_language(language_id).is_none() {
            return Err(anyhow!("unsupported language: {}", language_id.trim()));
        }
        self.shared
            .dispatch(Event::LanguageChanged(language_id.to_string()))
            .await;
        Ok(())
    }

    pub async fn dismiss(&self) -> bool {
        self.shared.dispatch(Event::Dismiss).await.applied
    }

    /// Submits the current prompt and language.
    ///
    /// A submission made while another is pending replaces it; the older
    /// result is discarded when it arrives.
    pub async fn submit(&self) -> SubmissionHandle {
        let submission = SubmissionId::new();
        let transition = self.shared.dispatch(Event::Submit { submission }).await;

        let Effect::Generate { submission, request } = transition.effect else {
            debug!(%submission, "submission rejected before reaching the provider");
            return SubmissionHandle {
                submission,
                task: None,
            };
        };

        info!(
            %submission,
            language = request.language().id,
            "code generation started"
        );
        let task = tokio::spawn(run_generation(
            Arc::clone(&self.shared),
            self.generator.clone(),
            submission,
            request,
        ));

        SubmissionHandle {
            submission,
            task: Some(task),
        }
    }
}

async fn run_generation(
    shared: Arc<Shared>,
    generator: CodeGenerator,
    submission: SubmissionId,
    request: GenerationRequest,
) {
    let started = Instant::now();
    let mut failure = None;
    let outcome = match generator.generate_code(&request).await {
        Ok(code) => {
            info!(
                %submission,
                latency_ms = started.elapsed().as_millis() as u64,
                "code generation finished"
            );
            GenerationOutcome::Success { code }
        }
        Err(error) => {
            warn!(%submission, "code generation failed: {error}");
            let classified = classify(&error);
            failure = Some(RuntimeErrorEvent::generation_failed(
                classified.category,
                error.to_string(),
            ));
            classified.into()
        }
    };

    let transition = shared
        .dispatch(Event::Completed {
            submission,
            outcome,
        })
        .await;
    if !transition.applied {
        debug!(%submission, "discarding result of superseded submission");
        return;
    }
    if let Some(event) = failure {
        shared.emit(SessionEvent::RuntimeError(event));
    }
}

#[cfg(test)]
mod tests {
    use codegen_core::{ErrorCategory, GenerationError, Phase};

    use super::*;
    use crate::session::testing::gated_session as session;

    fn success(code: &str) -> Option<GenerationOutcome> {
        Some(GenerationOutcome::Success {
            code: code.to_string(),
        })
    }

    #[tokio::test]
    async fn blank_prompt_is_rejected_locally() {
        let (session, provider) = session();
        session.set_prompt("   ").await;

        let handle = session.submit().await;
        assert!(!handle.issued_request());
        handle.finished().await.unwrap();

        let state = session.snapshot().await;
        match state.outcome() {
            Some(GenerationOutcome::Failure { category, .. }) => {
                assert_eq!(*category, ErrorCategory::InvalidInput)
            }
            other => panic!("unexpected outcome {other:?}"),
        }
        assert_eq!(provider.calls(), 0);
    }

    #[tokio::test]
    async fn successful_generation_goes_through_pending() {
        let (session, provider) = session();
        let mut events = session.subscribe();
        let release = provider.gate("reverse a string");

        session.set_prompt("reverse a string").await;
        let handle = session.submit().await;
        assert!(session.snapshot().await.is_pending());

        release
            .send(Ok("```\ndef reverse(s): return s[::-1]\n```".to_string()))
            .unwrap();
        handle.finished().await.unwrap();

        let state = session.snapshot().await;
        assert_eq!(
            state.outcome().cloned(),
            success("def reverse(s): return s[::-1]")
        );

        let mut phases = Vec::new();
        while let Ok(event) = events.try_recv() {
            if let SessionEvent::StateChanged(state) = event {
                phases.push(state.phase);
            }
        }
        assert!(matches!(phases.first(), Some(Phase::Idle)));
        assert!(phases.iter().any(|phase| matches!(phase, Phase::Pending { .. })));
        assert!(matches!(phases.last(), Some(Phase::Resolved { .. })));
    }

    #[tokio::test]
    async fn superseded_result_is_discarded() {
        let (session, provider) = session();
        let release_first = provider.gate("first");
        let release_second = provider.gate("second");

        session.set_prompt("first").await;
        let first = session.submit().await;
        session.set_prompt("second").await;
        let second = session.submit().await;

        release_first.send(Ok("stale()".to_string())).unwrap();
        first.finished().await.unwrap();
        assert_eq!(
            session.snapshot().await.pending_submission(),
            Some(second.submission)
        );

        release_second.send(Ok("fresh()".to_string())).unwrap();
        second.finished().await.unwrap();
        assert_eq!(session.snapshot().await.outcome().cloned(), success("fresh()"));
    }

    #[tokio::test]
    async fn provider_failure_is_classified_and_reported() {
        let (session, provider) = session();
        let mut events = session.subscribe();
        let release = provider.gate("anything");

        session.set_prompt("anything").await;
        let handle = session.submit().await;
        release
            .send(Err(GenerationError::Provider(
                "Request exceeded quota limit".to_string(),
            )))
            .unwrap();
        handle.finished().await.unwrap();

        match session.snapshot().await.outcome() {
            Some(GenerationOutcome::Failure { category, .. }) => {
                assert_eq!(*category, ErrorCategory::QuotaExceeded)
            }
            other => panic!("unexpected outcome {other:?}"),
        }

        let mut reported = None;
        while let Ok(event) = events.try_recv() {
            if let SessionEvent::RuntimeError(error) = event {
                reported = Some(error);
            }
        }
        let reported = reported.expect("runtime error event");
        assert_eq!(reported.code, "QUOTA_EXCEEDED");
        assert_eq!(reported.message, "Request exceeded quota limit");

        assert!(session.dismiss().await);
        assert_eq!(session.snapshot().await.phase, Phase::Idle);
    }

    #[tokio::test]
    async fn unknown_language_is_an_error() {
        let (session, _) = session();
        assert!(session.set_language("klingon").await.is_err());
        session.set_language("rust").await.unwrap();
        assert_eq!(session.snapshot().await.current_language, "rust");
    }

    #[tokio::test]
    async fn superseded_failure_reports_no_runtime_error() {
        let (session, provider) = session();
        let mut events = session.subscribe();
        let release_first = provider.gate("first");
        let release_second = provider.gate("second");

        session.set_prompt("first").await;
        let first = session.submit().await;
        session.set_prompt("second").await;
        let second = session.submit().await;

        release_first
            .send(Err(GenerationError::Provider("quota exhausted".to_string())))
            .unwrap();
        first.finished().await.unwrap();
        release_second.send(Ok("fresh()".to_string())).unwrap();
        second.finished().await.unwrap();

        while let Ok(event) = events.try_recv() {
            assert!(
                !matches!(event, SessionEvent::RuntimeError(_)),
                "stale failure leaked a runtime error: {event:?}"
            );
        }
        assert_eq!(session.snapshot().await.outcome().cloned(), success("fresh()"));
    }
}
