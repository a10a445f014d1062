//! Events that can occur in a session

/// Events that trigger state transitions
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    // User events
    InputChanged { text: String },
    Submit,
    Clear,

    // Remote call outcomes
    GenerationSucceeded { text: String },
    GenerationFailed { detail: Option<String> },
}

impl Event {
    /// Short name for logs
    pub fn name(&self) -> &'static str {
        match self {
            Event::InputChanged { .. } => "input_changed",
            Event::Submit => "submit",
            Event::Clear => "clear",
            Event::GenerationSucceeded { .. } => "generation_succeeded",
            Event::GenerationFailed { .. } => "generation_failed",
        }
    }
}
