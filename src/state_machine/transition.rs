//! Pure state transition function
//!
//! Given the same session and event it always produces the same result, with
//! no I/O. The runtime applies the new session and executes the effects.

use super::{Effect, Event, Phase, Session};
use thiserror::Error;

/// Message shown when a blank draft is submitted
pub const EMPTY_PROMPT_ERROR: &str = "Please enter a prompt";

/// Used when a failed call carries no detail
pub const GENERIC_FAILURE: &str = "Failed to get response from Gemini";

/// Result of a state transition
#[derive(Debug)]
pub struct TransitionResult {
    pub new_session: Session,
    pub effects: Vec<Effect>,
}

impl TransitionResult {
    pub fn new(session: Session) -> Self {
        Self {
            new_session: session,
            effects: vec![],
        }
    }

    pub fn with_effect(mut self, effect: Effect) -> Self {
        self.effects.push(effect);
        self
    }
}

/// Errors that can occur during transition
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransitionError {
    #[error("A request is in progress; wait for it to finish")]
    Busy,
    #[error("Invalid transition: {0}")]
    InvalidTransition(String),
}

/// Pure transition function
pub fn transition(session: &Session, event: Event) -> Result<TransitionResult, TransitionError> {
    match (&session.phase, event) {
        // ============================================================
        // Draft editing
        // ============================================================
        (Phase::Idle, Event::InputChanged { text }) => {
            let next = Session {
                pending_input: text,
                ..session.clone()
            };
            Ok(TransitionResult::new(next).with_effect(Effect::Publish))
        }

        // ============================================================
        // Submission: validate, then send
        // ============================================================
        (Phase::Idle, Event::Submit) => {
            if session.pending_input.trim().is_empty() {
                // Nothing appended, nothing sent, draft kept as typed
                let next = Session {
                    last_error: Some(EMPTY_PROMPT_ERROR.to_string()),
                    ..session.clone()
                };
                return Ok(TransitionResult::new(next).with_effect(Effect::Publish));
            }

            let prompt = session.pending_input.clone();
            let next = Session {
                pending_input: session.pending_input.clone(),
                phase: Phase::Sending {
                    prompt: prompt.clone(),
                },
                last_error: None,
            };
            Ok(TransitionResult::new(next)
                .with_effect(Effect::append_user(prompt.clone()))
                .with_effect(Effect::Publish)
                .with_effect(Effect::RequestGeneration { prompt }))
        }

        // ============================================================
        // Remote call resolution: always back to Idle with the draft cleared
        // ============================================================
        (Phase::Sending { .. }, Event::GenerationSucceeded { text }) => {
            let next = Session {
                pending_input: String::new(),
                phase: Phase::Idle,
                last_error: None,
            };
            Ok(TransitionResult::new(next)
                .with_effect(Effect::append_assistant(text))
                .with_effect(Effect::Publish))
        }

        (Phase::Sending { .. }, Event::GenerationFailed { detail, .. }) => {
            let next = Session {
                pending_input: String::new(),
                phase: Phase::Idle,
                last_error: Some(failure_message(detail.as_deref())),
            };
            Ok(TransitionResult::new(next).with_effect(Effect::Publish))
        }

        // ============================================================
        // Clear
        // ============================================================
        (Phase::Idle, Event::Clear) => Ok(TransitionResult::new(Session::new())
            .with_effect(Effect::ClearConversation)
            .with_effect(Effect::Publish)),

        // ============================================================
        // Controls are disabled while a request is outstanding
        // ============================================================
        (Phase::Sending { .. }, Event::InputChanged { .. } | Event::Submit | Event::Clear) => {
            Err(TransitionError::Busy)
        }

        (Phase::Idle, event @ (Event::GenerationSucceeded { .. } | Event::GenerationFailed { .. })) => {
            Err(TransitionError::InvalidTransition(format!(
                "{} with no request in flight",
                event.name()
            )))
        }
    }
}

/// User-visible message for a failed call.
///
/// The generic text is used only when the failure has no detail; an empty
/// detail counts as none.
pub fn failure_message(detail: Option<&str>) -> String {
    let detail = detail.filter(|d| !d.is_empty()).unwrap_or(GENERIC_FAILURE);
    format!("Error: {detail}")
}
