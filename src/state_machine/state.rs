//! Session state types

use serde::{Deserialize, Serialize};

/// Where the controller is in its request cycle.
///
/// Validation and the success/failure outcomes are transient and never
/// stored: they happen inside a single transition and fold back to `Idle`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Phase {
    #[default]
    Idle,
    /// A generate call for `prompt` is outstanding
    Sending { prompt: String },
}

/// Mutable fields of one chat session, apart from the conversation itself
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub pending_input: String,
    pub phase: Phase,
    pub last_error: Option<String>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    /// True only while a request is outstanding
    pub fn busy(&self) -> bool {
        matches!(self.phase, Phase::Sending { .. })
    }

    /// Whether the draft could be submitted right now
    pub fn can_submit(&self) -> bool {
        !self.busy() && !self.pending_input.trim().is_empty()
    }
}
