//! Mock implementations for testing
//!
//! These mocks enable runtime testing without real network I/O.

use super::traits::LlmClient;
use crate::llm::{LlmError, LlmRequest, LlmResponse};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use tokio::sync::{Notify, Semaphore};

// ============================================================================
// Mock LLM Client
// ============================================================================

/// Mock LLM client that returns queued responses
pub struct MockLlmClient {
    responses: Mutex<VecDeque<Result<LlmResponse, LlmError>>>,
    model_id: String,
    /// Record of all requests made
    pub requests: Mutex<Vec<LlmRequest>>,
}

impl MockLlmClient {
    pub fn new(model_id: impl Into<String>) -> Self {
        Self {
            responses: Mutex::new(VecDeque::new()),
            model_id: model_id.into(),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Queue a successful response
    pub fn queue_response(&self, response: LlmResponse) {
        self.responses.lock().unwrap().push_back(Ok(response));
    }

    /// Queue an error response
    pub fn queue_error(&self, error: LlmError) {
        self.responses.lock().unwrap().push_back(Err(error));
    }

    /// Get recorded requests
    pub fn recorded_requests(&self) -> Vec<LlmRequest> {
        self.requests.lock().unwrap().clone()
    }

    fn next_response(&self) -> Result<LlmResponse, LlmError> {
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(LlmError::network("No mock response queued")))
    }
}

#[async_trait]
impl LlmClient for MockLlmClient {
    async fn generate(&self, request: &LlmRequest) -> Result<LlmResponse, LlmError> {
        self.requests.lock().unwrap().push(request.clone());
        self.next_response()
    }

    fn model_id(&self) -> &str {
        &self.model_id
    }
}

// ============================================================================
// Gated Mock LLM Client (for observing the busy interval)
// ============================================================================

/// Mock LLM client that holds each request until the test releases it
pub struct GatedMockLlmClient {
    inner: MockLlmClient,
    gate: Semaphore,
    /// Notified when a request starts (for test synchronization)
    pub request_started: Arc<Notify>,
}

impl GatedMockLlmClient {
    pub fn new(model_id: impl Into<String>) -> Self {
        Self {
            inner: MockLlmClient::new(model_id),
            gate: Semaphore::new(0),
            request_started: Arc::new(Notify::new()),
        }
    }

    pub fn queue_response(&self, response: LlmResponse) {
        self.inner.queue_response(response);
    }

    /// Let one held request complete
    pub fn release(&self) {
        self.gate.add_permits(1);
    }

    pub fn recorded_requests(&self) -> Vec<LlmRequest> {
        self.inner.recorded_requests()
    }
}

#[async_trait]
impl LlmClient for GatedMockLlmClient {
    async fn generate(&self, request: &LlmRequest) -> Result<LlmResponse, LlmError> {
        self.inner.requests.lock().unwrap().push(request.clone());
        self.request_started.notify_one();

        match self.gate.acquire().await {
            Ok(permit) => permit.forget(),
            Err(_) => return Err(LlmError::network("gate closed")),
        }
        self.inner.next_response()
    }

    fn model_id(&self) -> &str {
        self.inner.model_id()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::conversation::Role;
    use crate::llm::LlmErrorKind;
    use crate::runtime::{RuntimeError, SessionHandle, SessionView, SseEvent};
    use crate::state_machine::{Event, TransitionError};
    use std::time::Duration;

    const WAIT: Duration = Duration::from_secs(5);

    fn typed(text: &str) -> Event {
        Event::InputChanged {
            text: text.to_string(),
        }
    }

    /// Wait until the published snapshot satisfies `pred`
    async fn wait_for(handle: &SessionHandle, pred: impl FnMut(&SessionView) -> bool) -> SessionView {
        let mut rx = handle.watch();
        let view = tokio::time::timeout(WAIT, rx.wait_for(pred))
            .await
            .expect("timed out waiting for snapshot")
            .expect("runtime stopped");
        view.clone()
    }

    fn turns(view: &SessionView) -> Vec<(Role, String)> {
        view.turns
            .iter()
            .map(|t| (t.role, t.content.clone()))
            .collect()
    }

    #[tokio::test]
    async fn test_initial_snapshot_is_empty() {
        let handle = SessionHandle::spawn(MockLlmClient::new("test-model"));
        let view = handle.snapshot();

        assert!(view.turns.is_empty());
        assert!(!view.busy);
        assert!(!view.can_submit);
        assert!(!view.can_clear);
        assert_eq!(view.last_error, None);
        assert_eq!(view.model, "test-model");
    }

    #[tokio::test]
    async fn test_submit_success_appends_both_turns() {
        let llm = Arc::new(MockLlmClient::new("test-model"));
        llm.queue_response(LlmResponse::text("Hi there"));
        let handle = SessionHandle::spawn(llm.clone());

        handle.dispatch(typed("Hello")).await.unwrap();
        assert!(handle.snapshot().can_submit);
        handle.dispatch(Event::Submit).await.unwrap();

        let view = wait_for(&handle, |v| !v.busy && v.turns.len() == 2).await;
        assert_eq!(
            turns(&view),
            vec![
                (Role::User, "Hello".to_string()),
                (Role::Assistant, "Hi there".to_string()),
            ]
        );
        assert_eq!(view.turns[0].label, "You");
        assert_eq!(view.turns[1].label, "Gemini");
        assert_eq!(view.pending_input, "");
        assert_eq!(view.last_error, None);
        assert!(view.can_clear);
        assert_eq!(llm.recorded_requests(), vec![LlmRequest::new("Hello")]);
    }

    #[tokio::test]
    async fn test_busy_from_user_turn_until_resolution() {
        let llm = Arc::new(GatedMockLlmClient::new("test-model"));
        llm.queue_response(LlmResponse::text("done"));
        let handle = SessionHandle::spawn(llm.clone());

        let request_started = llm.request_started.clone();
        let started = request_started.notified();

        handle.dispatch(typed("Explain X")).await.unwrap();
        handle.dispatch(Event::Submit).await.unwrap();

        // Acknowledged submit: user turn is already recorded and we are busy
        let view = handle.snapshot();
        assert!(view.busy);
        assert_eq!(turns(&view), vec![(Role::User, "Explain X".to_string())]);
        assert!(!view.can_submit);
        assert!(!view.can_clear);

        tokio::time::timeout(WAIT, started).await.unwrap();

        // Controls are disabled while the request is outstanding
        for event in [Event::Submit, Event::Clear, typed("more")] {
            let err = handle.dispatch(event).await.unwrap_err();
            assert!(matches!(err, RuntimeError::Rejected(TransitionError::Busy)));
        }
        let view = handle.snapshot();
        assert!(view.busy);
        assert_eq!(view.turns.len(), 1);
        assert_eq!(view.pending_input, "Explain X");

        llm.release();
        let view = wait_for(&handle, |v| !v.busy).await;
        assert_eq!(view.turns.len(), 2);
        assert_eq!(llm.recorded_requests().len(), 1);
    }

    #[tokio::test]
    async fn test_failure_keeps_only_user_turn() {
        let llm = Arc::new(MockLlmClient::new("test-model"));
        llm.queue_error(LlmError::rate_limit("quota exceeded"));
        let handle = SessionHandle::spawn(llm.clone());

        handle.dispatch(typed("Explain X")).await.unwrap();
        handle.dispatch(Event::Submit).await.unwrap();

        let view = wait_for(&handle, |v| !v.busy).await;
        assert_eq!(turns(&view), vec![(Role::User, "Explain X".to_string())]);
        assert_eq!(view.last_error.as_deref(), Some("Error: quota exceeded"));
        assert_eq!(view.pending_input, "");
    }

    #[tokio::test]
    async fn test_failure_without_detail_is_generic() {
        let llm = Arc::new(MockLlmClient::new("test-model"));
        llm.queue_error(LlmError::without_detail(LlmErrorKind::Unknown));
        let handle = SessionHandle::spawn(llm.clone());

        handle.dispatch(typed("Hello")).await.unwrap();
        handle.dispatch(Event::Submit).await.unwrap();

        let view = wait_for(&handle, |v| !v.busy).await;
        assert_eq!(
            view.last_error.as_deref(),
            Some("Error: Failed to get response from Gemini")
        );
    }

    #[tokio::test]
    async fn test_blank_submit_never_calls_remote() {
        let llm = Arc::new(MockLlmClient::new("test-model"));
        let handle = SessionHandle::spawn(llm.clone());

        handle.dispatch(typed(" \n\t ")).await.unwrap();
        handle.dispatch(Event::Submit).await.unwrap();

        let view = handle.snapshot();
        assert!(view.turns.is_empty());
        assert!(!view.busy);
        assert_eq!(view.last_error.as_deref(), Some("Please enter a prompt"));
        assert!(llm.recorded_requests().is_empty());
    }

    #[tokio::test]
    async fn test_each_request_carries_only_its_prompt() {
        let llm = Arc::new(MockLlmClient::new("test-model"));
        llm.queue_response(LlmResponse::text("first"));
        llm.queue_response(LlmResponse::text("second"));
        let handle = SessionHandle::spawn(llm.clone());

        handle.dispatch(typed("Hello")).await.unwrap();
        handle.dispatch(Event::Submit).await.unwrap();
        wait_for(&handle, |v| !v.busy && v.turns.len() == 2).await;

        handle.dispatch(typed("And again")).await.unwrap();
        handle.dispatch(Event::Submit).await.unwrap();
        let view = wait_for(&handle, |v| !v.busy && v.turns.len() == 4).await;

        assert_eq!(view.turns[3].content, "second");
        assert_eq!(
            llm.recorded_requests(),
            vec![LlmRequest::new("Hello"), LlmRequest::new("And again")]
        );
    }

    #[tokio::test]
    async fn test_clear_after_exchange_restores_initial_view() {
        let llm = Arc::new(MockLlmClient::new("test-model"));
        llm.queue_response(LlmResponse::text("Hi there"));
        let handle = SessionHandle::spawn(llm.clone());
        let initial = handle.snapshot();

        handle.dispatch(typed("Hello")).await.unwrap();
        handle.dispatch(Event::Submit).await.unwrap();
        wait_for(&handle, |v| !v.busy && v.turns.len() == 2).await;

        handle.dispatch(Event::Clear).await.unwrap();
        assert_eq!(handle.snapshot(), initial);
    }

    #[tokio::test]
    async fn test_subscribers_see_each_transition() {
        let llm = Arc::new(MockLlmClient::new("test-model"));
        llm.queue_response(LlmResponse::text("Hi there"));
        let handle = SessionHandle::spawn(llm.clone());
        let mut rx = handle.subscribe();

        handle.dispatch(typed("Hello")).await.unwrap();
        handle.dispatch(Event::Submit).await.unwrap();

        let mut busy_seen = Vec::new();
        loop {
            let event = tokio::time::timeout(WAIT, rx.recv()).await.unwrap().unwrap();
            if let SseEvent::Snapshot { view } = event {
                busy_seen.push((view.busy, view.turns.len()));
                if view.turns.len() == 2 {
                    break;
                }
            }
        }
        // typed, submitted (user turn + busy), resolved
        assert_eq!(busy_seen, vec![(false, 0), (true, 1), (false, 2)]);
    }

    #[tokio::test]
    async fn test_rejections_are_broadcast() {
        let llm = Arc::new(GatedMockLlmClient::new("test-model"));
        llm.queue_response(LlmResponse::text("ok"));
        let handle = SessionHandle::spawn(llm.clone());

        handle.dispatch(typed("Hello")).await.unwrap();
        handle.dispatch(Event::Submit).await.unwrap();

        let mut rx = handle.subscribe();
        assert!(handle.dispatch(Event::Clear).await.is_err());

        let event = tokio::time::timeout(WAIT, rx.recv()).await.unwrap().unwrap();
        match event {
            SseEvent::Error { message } => assert!(message.contains("in progress")),
            other => panic!("expected error event, got {other:?}"),
        }

        llm.release();
        wait_for(&handle, |v| !v.busy).await;
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_batched_draft_and_submit_are_not_interleaved() {
        let llm = Arc::new(GatedMockLlmClient::new("test-model"));
        llm.queue_response(LlmResponse::text("ok"));
        let handle = SessionHandle::spawn(llm.clone());

        // Other clients keep rewriting the draft while one submits its own text
        let typists: Vec<_> = (0..50)
            .map(|i| {
                let handle = handle.clone();
                tokio::spawn(async move { handle.dispatch(typed(&format!("other {i}"))).await })
            })
            .collect();
        handle
            .dispatch_all(vec![typed("Hello"), Event::Submit])
            .await
            .unwrap();
        for typist in typists {
            // Late typists are rejected once the request is in flight
            let _ = typist.await.unwrap();
        }

        let view = handle.snapshot();
        assert!(view.busy);
        assert_eq!(turns(&view), vec![(Role::User, "Hello".to_string())]);
        assert_eq!(llm.recorded_requests(), vec![LlmRequest::new("Hello")]);

        llm.release();
        wait_for(&handle, |v| !v.busy).await;
    }

    #[tokio::test]
    async fn test_batch_stops_at_first_rejection() {
        let llm = Arc::new(GatedMockLlmClient::new("test-model"));
        llm.queue_response(LlmResponse::text("ok"));
        let handle = SessionHandle::spawn(llm.clone());

        handle
            .dispatch_all(vec![typed("Hello"), Event::Submit])
            .await
            .unwrap();

        let err = handle
            .dispatch_all(vec![typed("second"), Event::Submit])
            .await
            .unwrap_err();
        assert!(matches!(err, RuntimeError::Rejected(TransitionError::Busy)));

        let view = handle.snapshot();
        assert_eq!(view.pending_input, "Hello");
        assert_eq!(view.turns.len(), 1);

        llm.release();
        let view = wait_for(&handle, |v| !v.busy).await;
        assert_eq!(view.turns.len(), 2);
        assert_eq!(llm.recorded_requests(), vec![LlmRequest::new("Hello")]);
    }
}
