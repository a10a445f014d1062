//! Session runtime executor

use super::traits::LlmClient;
use super::{SessionCommand, SessionView, SseEvent};

use crate::conversation::Conversation;
use crate::llm::LlmRequest;
use crate::state_machine::{transition, Effect, Event, Session, TransitionError};
use std::sync::Arc;
use tokio::sync::{broadcast, mpsc, watch};

/// Owns one session and drives it with events from its queue
pub struct SessionRuntime<L>
where
    L: LlmClient + 'static,
{
    session: Session,
    conversation: Conversation,
    llm_client: Arc<L>,
    model_id: String,
    command_rx: mpsc::Receiver<SessionCommand>,
    command_tx: mpsc::Sender<SessionCommand>,
    view_tx: watch::Sender<SessionView>,
    broadcast_tx: broadcast::Sender<SseEvent>,
}

impl<L> SessionRuntime<L>
where
    L: LlmClient + 'static,
{
    pub fn new(
        llm_client: L,
        command_rx: mpsc::Receiver<SessionCommand>,
        command_tx: mpsc::Sender<SessionCommand>,
        view_tx: watch::Sender<SessionView>,
        broadcast_tx: broadcast::Sender<SseEvent>,
    ) -> Self {
        let model_id = llm_client.model_id().to_string();
        Self {
            session: Session::new(),
            conversation: Conversation::new(),
            llm_client: Arc::new(llm_client),
            model_id,
            command_rx,
            command_tx,
            view_tx,
            broadcast_tx,
        }
    }

    pub async fn run(mut self) {
        tracing::info!(model = %self.model_id, "Starting session runtime");

        // Process events in a loop; the remote call is the only thing that
        // suspends, and it runs in its own task.
        while let Some(command) = self.command_rx.recv().await {
            let result = command
                .events
                .into_iter()
                .try_for_each(|event| self.process_event(event));
            if let Some(ack) = command.ack {
                let _ = ack.send(result);
            }
        }

        tracing::info!(model = %self.model_id, "Session runtime stopped");
    }

    fn process_event(&mut self, event: Event) -> Result<(), TransitionError> {
        let name = event.name();

        // Pure state transition
        let result = match transition(&self.session, event) {
            Ok(r) => r,
            Err(e) => {
                // Rejections are user-facing (e.g. "request in progress")
                tracing::warn!(event = name, error = %e, "Event rejected");
                let _ = self.broadcast_tx.send(SseEvent::Error {
                    message: e.to_string(),
                });
                return Err(e);
            }
        };

        tracing::debug!(
            event = name,
            busy = result.new_session.busy(),
            effects = result.effects.len(),
            "Transition applied"
        );
        self.session = result.new_session;

        for effect in result.effects {
            self.execute_effect(effect);
        }

        Ok(())
    }

    fn execute_effect(&mut self, effect: Effect) {
        match effect {
            Effect::AppendTurn(turn) => {
                self.conversation.append(turn);
            }

            Effect::ClearConversation => {
                self.conversation.clear();
            }

            Effect::Publish => {
                let view = SessionView::capture(&self.session, &self.conversation, &self.model_id);
                self.view_tx.send_replace(view.clone());
                // No subscribers is fine
                let _ = self.broadcast_tx.send(SseEvent::Snapshot { view });
            }

            Effect::RequestGeneration { prompt } => {
                let llm_client = self.llm_client.clone();
                let command_tx = self.command_tx.clone();

                tokio::spawn(async move {
                    tracing::info!(prompt_chars = prompt.chars().count(), "Making generate request (background)");

                    let request = LlmRequest::new(prompt);
                    let event = match llm_client.generate(&request).await {
                        Ok(response) => Event::GenerationSucceeded {
                            text: response.text,
                        },
                        Err(e) => {
                            tracing::warn!(error = %e, kind = ?e.kind, "Generate request failed");
                            Event::GenerationFailed {
                                detail: e.detail().map(str::to_string),
                            }
                        }
                    };

                    if command_tx.send(SessionCommand::internal(event)).await.is_err() {
                        tracing::error!("Session runtime gone before generate request resolved");
                    }
                });
            }
        }
    }
}
