//! Effects produced by state transitions

use crate::conversation::Turn;

/// Effects to be executed after a state transition
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Append a turn to the conversation store
    AppendTurn(Turn),

    /// Empty the conversation store
    ClearConversation,

    /// Issue the single remote generate call (runs in the background)
    RequestGeneration { prompt: String },

    /// Push a fresh snapshot to every subscribed view
    Publish,
}

impl Effect {
    pub fn append_user(content: impl Into<String>) -> Self {
        Effect::AppendTurn(Turn::user(content))
    }

    pub fn append_assistant(content: impl Into<String>) -> Self {
        Effect::AppendTurn(Turn::assistant(content))
    }
}
