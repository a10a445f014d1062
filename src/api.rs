//! HTTP API for the chat page
//!
//! The page renders from session snapshots and reports user actions back as
//! events; it holds no conversation state of its own.

mod assets;
mod handlers;
mod sse;
mod types;

pub use handlers::create_router;
#[allow(unused_imports)] // Public API re-exports
pub use types::*;

use crate::runtime::SessionHandle;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub session: SessionHandle,
    pub model: String,
}

impl AppState {
    pub fn new(session: SessionHandle) -> Self {
        let model = session.snapshot().model;
        Self { session, model }
    }
}
