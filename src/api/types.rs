//! API request and response types

use serde::{Deserialize, Serialize};

/// Request to replace the draft
#[derive(Debug, Deserialize)]
pub struct InputRequest {
    pub text: String,
}

/// Request to submit; a `text` field is applied as the draft first
#[derive(Debug, Default, Deserialize)]
pub struct SubmitRequest {
    #[serde(default)]
    pub text: Option<String>,
}

/// Response for user actions
#[derive(Debug, Serialize)]
pub struct ActionResponse {
    pub accepted: bool,
}

/// Response describing the remote model this process talks to
#[derive(Debug, Serialize)]
pub struct ModelResponse {
    pub model: String,
    pub provider: &'static str,
}

/// Error response
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl ErrorResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            error: message.into(),
        }
    }
}
