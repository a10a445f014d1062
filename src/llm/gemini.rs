//! Google Gemini provider implementation
//!
//! One prompt in, one text out: `models/{model}:generateContent` with a single
//! user content and no history, tools or streaming.

use super::types::{LlmRequest, LlmResponse, Usage};
use super::{LlmError, LlmErrorKind, LlmService};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";
pub const DEFAULT_MODEL: &str = "gemini-2.0-flash";

/// Finish reasons that mean the candidate text must not be shown
const BAD_FINISH_REASONS: &[&str] = &["SAFETY", "RECITATION", "LANGUAGE"];

/// Gemini service implementation
pub struct GeminiService {
    client: Client,
    api_key: String,
    endpoint: String,
    model_id: String,
}

impl GeminiService {
    /// Build a client for `model` against `base_url`.
    ///
    /// The HTTP client has no request timeout; a call runs until the service
    /// answers or the connection fails.
    pub fn new(api_key: String, model: &str, base_url: &str) -> Result<Self, LlmError> {
        let endpoint = format!(
            "{}/v1beta/models/{}:generateContent",
            base_url.trim_end_matches('/'),
            model
        );

        let client = Client::builder()
            .user_agent(concat!("gemini-chat/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| LlmError::unknown(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            api_key,
            endpoint,
            model_id: model.to_string(),
        })
    }

    fn translate_request(request: &LlmRequest) -> GeminiRequest {
        GeminiRequest {
            contents: vec![GeminiContent {
                role: Some("user".to_string()),
                parts: vec![GeminiPart {
                    text: Some(request.prompt.clone()),
                }],
            }],
        }
    }

    fn normalize_response(resp: GeminiResponse) -> Result<LlmResponse, LlmError> {
        let usage = resp
            .usage_metadata
            .map(|u| Usage {
                input_tokens: u64::from(u.prompt_token_count),
                output_tokens: u64::from(u.candidates_token_count),
            })
            .unwrap_or_default();

        let Some(candidate) = resp.candidates.into_iter().next() else {
            // No candidates: either the prompt itself was blocked, or there is
            // simply nothing to say.
            if let Some(reason) = resp.prompt_feedback.and_then(|f| f.block_reason) {
                return Err(LlmError::blocked(format!(
                    "Text not available. Response was blocked due to {reason}"
                )));
            }
            return Ok(LlmResponse {
                text: String::new(),
                usage,
            });
        };

        if let Some(reason) = candidate
            .finish_reason
            .as_deref()
            .filter(|r| BAD_FINISH_REASONS.contains(r))
        {
            return Err(LlmError::blocked(format!(
                "Candidate was blocked due to {reason}"
            )));
        }

        let text = candidate
            .content
            .map(|c| {
                c.parts
                    .into_iter()
                    .filter_map(|p| p.text)
                    .collect::<String>()
            })
            .unwrap_or_default();

        Ok(LlmResponse { text, usage })
    }

    fn error_from_status(status: reqwest::StatusCode, body: &str) -> LlmError {
        let kind = LlmErrorKind::from_status(status.as_u16());

        if let Ok(error_resp) = serde_json::from_str::<GeminiErrorResponse>(body) {
            // The service's own message is what the user gets to see
            return LlmError {
                kind,
                detail: Some(error_resp.error.message),
            };
        }

        let body = body.trim();
        if body.is_empty() {
            LlmError::new(kind, format!("HTTP {status}"))
        } else {
            LlmError::new(kind, format!("HTTP {status}: {body}"))
        }
    }
}

#[async_trait]
impl LlmService for GeminiService {
    async fn generate(&self, request: &LlmRequest) -> Result<LlmResponse, LlmError> {
        let gemini_request = Self::translate_request(request);

        let response = self
            .client
            .post(&self.endpoint)
            .header("x-goog-api-key", &self.api_key)
            .json(&gemini_request)
            .send()
            .await
            .map_err(|e| {
                if e.is_connect() {
                    LlmError::network(format!("Connection failed: {e}"))
                } else {
                    LlmError::network(format!("Request failed: {e}"))
                }
            })?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| LlmError::network(format!("Failed to read response: {e}")))?;

        if !status.is_success() {
            return Err(Self::error_from_status(status, &body));
        }

        let gemini_response: GeminiResponse = serde_json::from_str(&body)
            .map_err(|e| LlmError::unknown(format!("Failed to parse response: {e}")))?;

        Self::normalize_response(gemini_response)
    }

    fn model_id(&self) -> &str {
        &self.model_id
    }
}

// Gemini API types

#[derive(Debug, Serialize)]
struct GeminiRequest {
    contents: Vec<GeminiContent>,
}

#[derive(Debug, Serialize, Deserialize)]
pub(super) struct GeminiContent {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    #[serde(default)]
    parts: Vec<GeminiPart>,
}

/// Only text parts matter here; other part kinds deserialize with `text: None`
#[derive(Debug, Serialize, Deserialize)]
pub(super) struct GeminiPart {
    #[serde(skip_serializing_if = "Option::is_none")]
    text: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<GeminiCandidate>,
    prompt_feedback: Option<GeminiPromptFeedback>,
    usage_metadata: Option<GeminiUsageMetadata>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct GeminiCandidate {
    content: Option<GeminiContent>,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct GeminiPromptFeedback {
    block_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiUsageMetadata {
    #[serde(default)]
    prompt_token_count: u32,
    #[serde(default)]
    candidates_token_count: u32,
}

#[derive(Debug, Deserialize)]
struct GeminiErrorResponse {
    error: GeminiError,
}

#[derive(Debug, Deserialize)]
struct GeminiError {
    message: String,
}
