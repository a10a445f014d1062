//! Trait abstractions for runtime I/O
//!
//! These traits enable testing the executor with mock implementations.

use crate::llm::{LlmError, LlmRequest, LlmResponse, LlmService};
use async_trait::async_trait;
use std::sync::Arc;

/// Client for the single remote generate call
#[async_trait]
pub trait LlmClient: Send + Sync {
    /// Generate a reply for one prompt
    async fn generate(&self, request: &LlmRequest) -> Result<LlmResponse, LlmError>;

    /// Get the model ID
    fn model_id(&self) -> &str;
}

#[async_trait]
impl<T: LlmClient + ?Sized> LlmClient for Arc<T> {
    async fn generate(&self, request: &LlmRequest) -> Result<LlmResponse, LlmError> {
        (**self).generate(request).await
    }

    fn model_id(&self) -> &str {
        (**self).model_id()
    }
}

// ============================================================================
// Production Adapters
// ============================================================================

/// Adapter from a configured `LlmService` to the runtime's client trait
pub struct ServiceLlmClient {
    service: Arc<dyn LlmService>,
}

impl ServiceLlmClient {
    pub fn new(service: Arc<dyn LlmService>) -> Self {
        Self { service }
    }
}

#[async_trait]
impl LlmClient for ServiceLlmClient {
    async fn generate(&self, request: &LlmRequest) -> Result<LlmResponse, LlmError> {
        self.service.generate(request).await
    }

    fn model_id(&self) -> &str {
        self.service.model_id()
    }
}
