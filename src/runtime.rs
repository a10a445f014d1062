//! Runtime for the chat session
//!
//! One task owns the session flags and the conversation store, applies events
//! strictly in order, and publishes a snapshot after every transition.

mod executor;
pub mod traits;

#[cfg(test)]
pub mod testing;

pub use executor::SessionRuntime;
pub use traits::*;

use crate::conversation::{Conversation, Role};
use crate::state_machine::{Event, Session, TransitionError};
use serde::Serialize;
use thiserror::Error;
use tokio::sync::{broadcast, mpsc, oneshot, watch};

/// Render snapshot pushed to views
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SessionView {
    pub turns: Vec<TurnView>,
    pub pending_input: String,
    pub busy: bool,
    pub last_error: Option<String>,
    pub can_submit: bool,
    pub can_clear: bool,
    pub model: String,
}

/// One turn as the page shows it
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TurnView {
    pub role: Role,
    pub label: &'static str,
    pub content: String,
}

impl SessionView {
    pub fn capture(session: &Session, conversation: &Conversation, model: &str) -> Self {
        let busy = session.busy();
        Self {
            turns: conversation
                .all()
                .iter()
                .map(|t| TurnView {
                    role: t.role,
                    label: t.role.display_name(),
                    content: t.content.clone(),
                })
                .collect(),
            pending_input: session.pending_input.clone(),
            busy,
            last_error: session.last_error.clone(),
            can_submit: session.can_submit(),
            can_clear: !busy && !conversation.is_empty(),
            model: model.to_string(),
        }
    }
}

/// Events sent to SSE clients
#[derive(Debug, Clone)]
pub enum SseEvent {
    /// The session changed; re-render from this
    Snapshot { view: SessionView },
    /// A user action was rejected
    Error { message: String },
}

/// Events applied back to back, plus an optional channel to report whether
/// they were accepted.
///
/// No other command is processed between the events of one batch. The batch
/// stops at the first rejected event.
#[derive(Debug)]
pub struct SessionCommand {
    pub events: Vec<Event>,
    pub ack: Option<oneshot::Sender<Result<(), TransitionError>>>,
}

impl SessionCommand {
    /// Event raised by the runtime itself; nobody waits on it
    pub fn internal(event: Event) -> Self {
        Self {
            events: vec![event],
            ack: None,
        }
    }
}

/// Errors reported to callers of [`SessionHandle::dispatch`]
#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error(transparent)]
    Rejected(#[from] TransitionError),
    #[error("Session runtime is not running")]
    Closed,
}

/// Handle to interact with the running session
#[derive(Clone)]
pub struct SessionHandle {
    command_tx: mpsc::Sender<SessionCommand>,
    view_rx: watch::Receiver<SessionView>,
    broadcast_tx: broadcast::Sender<SseEvent>,
}

impl SessionHandle {
    /// Start a session runtime in the background and return its handle
    pub fn spawn<L: LlmClient + 'static>(llm_client: L) -> Self {
        let model = llm_client.model_id().to_string();
        let (command_tx, command_rx) = mpsc::channel(32);
        let (broadcast_tx, _) = broadcast::channel(128);
        let (view_tx, view_rx) = watch::channel(SessionView::capture(
            &Session::new(),
            &Conversation::new(),
            &model,
        ));

        let runtime = SessionRuntime::new(
            llm_client,
            command_rx,
            command_tx.clone(),
            view_tx,
            broadcast_tx.clone(),
        );

        tokio::spawn(async move {
            runtime.run().await;
            tracing::info!(model = %model, "Session runtime finished");
        });

        Self {
            command_tx,
            view_rx,
            broadcast_tx,
        }
    }

    /// Send a user event and wait until the runtime has applied or rejected it
    pub async fn dispatch(&self, event: Event) -> Result<(), RuntimeError> {
        self.dispatch_all(vec![event]).await
    }

    /// Send several user events as one unit; nothing else interleaves
    pub async fn dispatch_all(&self, events: Vec<Event>) -> Result<(), RuntimeError> {
        let (ack_tx, ack_rx) = oneshot::channel();
        self.command_tx
            .send(SessionCommand {
                events,
                ack: Some(ack_tx),
            })
            .await
            .map_err(|_| RuntimeError::Closed)?;

        ack_rx.await.map_err(|_| RuntimeError::Closed)??;
        Ok(())
    }

    /// Latest published snapshot
    pub fn snapshot(&self) -> SessionView {
        self.view_rx.borrow().clone()
    }

    /// Receiver that observes every published snapshot
    pub fn watch(&self) -> watch::Receiver<SessionView> {
        self.view_rx.clone()
    }

    /// Subscribe to session updates
    pub fn subscribe(&self) -> broadcast::Receiver<SseEvent> {
        self.broadcast_tx.subscribe()
    }
}
