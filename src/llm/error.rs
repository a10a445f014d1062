//! Remote call error types

use thiserror::Error;

/// Failure of a generate call, with the human-readable detail when one exists
#[derive(Debug, Clone, Error)]
#[error("{}", describe(.detail))]
pub struct LlmError {
    pub kind: LlmErrorKind,
    pub detail: Option<String>,
}

impl LlmError {
    pub fn new(kind: LlmErrorKind, detail: impl Into<String>) -> Self {
        Self {
            kind,
            detail: Some(detail.into()),
        }
    }

    /// A failure the service gave no explanation for
    pub fn without_detail(kind: LlmErrorKind) -> Self {
        Self { kind, detail: None }
    }

    pub fn network(detail: impl Into<String>) -> Self {
        Self::new(LlmErrorKind::Network, detail)
    }

    pub fn rate_limit(detail: impl Into<String>) -> Self {
        Self::new(LlmErrorKind::RateLimit, detail)
    }

    pub fn blocked(detail: impl Into<String>) -> Self {
        Self::new(LlmErrorKind::Blocked, detail)
    }

    pub fn unknown(detail: impl Into<String>) -> Self {
        Self::new(LlmErrorKind::Unknown, detail)
    }

    /// Detail text, treating an empty string the same as no detail
    pub fn detail(&self) -> Option<&str> {
        self.detail.as_deref().filter(|d| !d.is_empty())
    }
}

fn describe(detail: &Option<String>) -> &str {
    detail
        .as_deref()
        .unwrap_or("remote call failed without detail")
}

/// Error classification, used for logging only (nothing is retried)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LlmErrorKind {
    /// Connection failures, read errors
    Network,
    /// 429 / quota exhausted
    RateLimit,
    /// 5xx
    ServerError,
    /// 401, 403
    Auth,
    /// 400
    InvalidRequest,
    /// Prompt or candidate withheld by safety filters
    Blocked,
    Unknown,
}

impl LlmErrorKind {
    pub fn from_status(status: u16) -> Self {
        match status {
            400 => Self::InvalidRequest,
            401 | 403 => Self::Auth,
            429 => Self::RateLimit,
            500..=599 => Self::ServerError,
            _ => Self::Unknown,
        }
    }
}
