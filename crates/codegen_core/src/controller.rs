//! Interaction lifecycle for a single code-generation session.
//!
//! State changes go through [`reduce`], a pure function of the current state
//! and one [`Event`]. Network work is requested through [`Effect::Generate`]
//! and its result comes back as [`Event::Completed`] tagged with the
//! [`SubmissionId`] it belongs to. Overlapping submissions follow
//! last-submission-wins: a result whose id no longer matches the pending
//! submission is dropped.

use std::fmt;

use serde::Serialize;
use uuid::Uuid;

use crate::languages::{default_language, find_language};
use crate::request::{GenerationOutcome, GenerationRequest, RequestError};

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq, Hash)]
#[serde(transparent)]
pub struct SubmissionId(Uuid);

impl SubmissionId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for SubmissionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for SubmissionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(tag = "phase", rename_all = "camelCase")]
pub enum Phase {
    Idle,
    Pending { submission: SubmissionId },
    Resolved { outcome: GenerationOutcome },
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct InteractionState {
    pub phase: Phase,
    pub current_prompt: String,
    pub current_language: String,
}

impl Default for InteractionState {
    fn default() -> Self {
        Self {
            phase: Phase::Idle,
            current_prompt: String::new(),
            current_language: default_language().id.to_string(),
        }
    }
}

impl InteractionState {
    pub fn is_pending(&self) -> bool {
        matches!(self.phase, Phase::Pending { .. })
    }

    /// Mirrors the form's submit button: disabled while pending or with a blank prompt.
    pub fn can_submit(&self) -> bool {
        !self.is_pending() && !self.current_prompt.trim().is_empty()
    }

    pub fn outcome(&self) -> Option<&GenerationOutcome> {
        match &self.phase {
            Phase::Resolved { outcome } => Some(outcome),
            _ => None,
        }
    }

    pub fn pending_submission(&self) -> Option<SubmissionId> {
        match self.phase {
            Phase::Pending { submission } => Some(submission),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    PromptChanged(String),
    LanguageChanged(String),
    Submit {
        submission: SubmissionId,
    },
    Completed {
        submission: SubmissionId,
        outcome: GenerationOutcome,
    },
    /// Closes the error banner.
    Dismiss,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    None,
    Generate {
        submission: SubmissionId,
        request: GenerationRequest,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transition {
    pub state: InteractionState,
    pub effect: Effect,
    /// False when the event was ignored, e.g. a stale completion.
    pub applied: bool,
}

impl Transition {
    fn applied(state: InteractionState, effect: Effect) -> Self {
        Self {
            state,
            effect,
            applied: true,
        }
    }

    fn ignored(state: InteractionState) -> Self {
        Self {
            state,
            effect: Effect::None,
            applied: false,
        }
    }
}

pub fn reduce(mut state: InteractionState, event: Event) -> Transition {
    match event {
        Event::PromptChanged(prompt) => {
            state.current_prompt = prompt;
            Transition::applied(state, Effect::None)
        }
        Event::LanguageChanged(language_id) => match find_language(&language_id) {
            Some(language) => {
                state.current_language = language.id.to_string();
                Transition::applied(state, Effect::None)
            }
            None => Transition::ignored(state),
        },
        Event::Submit { submission } => {
            match GenerationRequest::new(&state.current_prompt, &state.current_language) {
                Ok(request) => {
                    state.phase = Phase::Pending { submission };
                    Transition::applied(
                        state,
                        Effect::Generate {
                            submission,
                            request,
                        },
                    )
                }
                Err(error) => {
                    state.phase = Phase::Resolved {
                        outcome: RequestError::into_outcome(error),
                    };
                    Transition::applied(state, Effect::None)
                }
            }
        }
        Event::Completed {
            submission,
            outcome,
        } => {
            if state.pending_submission() != Some(submission) {
                return Transition::ignored(state);
            }
            state.phase = Phase::Resolved { outcome };
            Transition::applied(state, Effect::None)
        }
        Event::Dismiss => {
            let showing_error = matches!(
                state.phase,
                Phase::Resolved {
                    outcome: GenerationOutcome::Failure { .. }
                }
            );
            if !showing_error {
                return Transition::ignored(state);
            }
            state.phase = Phase::Idle;
            Transition::applied(state, Effect::None)
        }
    }
}
