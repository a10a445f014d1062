//! HTTP request handlers

use super::assets::{get_index_html, serve_static};
use super::sse::sse_stream;
use super::types::{ActionResponse, ErrorResponse, InputRequest, ModelResponse, SubmitRequest};
use super::AppState;
use crate::runtime::{RuntimeError, SessionView, SseEvent};
use crate::state_machine::{Event, TransitionError};
use axum::{
    extract::State,
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};

/// Create the API router
pub fn create_router(state: AppState) -> Router {
    Router::new()
        // The single page
        .route("/", get(serve_page))
        .route("/assets/*path", get(serve_static))
        // Session snapshot and live updates
        .route("/api/session", get(get_session))
        .route("/api/session/stream", get(stream_session))
        // User actions
        .route("/api/session/input", post(set_input))
        .route("/api/session/submit", post(submit))
        .route("/api/session/clear", post(clear))
        // Model info
        .route("/api/model", get(get_model))
        // Version
        .route("/version", get(get_version))
        .with_state(state)
}

// ============================================================
// Page
// ============================================================

async fn serve_page() -> impl IntoResponse {
    match get_index_html() {
        Some(content) => Html(content).into_response(),
        None => (
            StatusCode::NOT_FOUND,
            Html("<h1>404 - page not found</h1>".to_string()),
        )
            .into_response(),
    }
}

// ============================================================
// Snapshot and streaming
// ============================================================

async fn get_session(State(state): State<AppState>) -> Json<SessionView> {
    Json(state.session.snapshot())
}

async fn stream_session(State(state): State<AppState>) -> impl IntoResponse {
    // Subscribe before capturing so no transition falls between the two
    let broadcast_rx = state.session.subscribe();
    let init = SseEvent::Snapshot {
        view: state.session.snapshot(),
    };
    sse_stream(init, broadcast_rx)
}

// ============================================================
// User actions
// ============================================================

async fn set_input(
    State(state): State<AppState>,
    Json(req): Json<InputRequest>,
) -> Result<Json<ActionResponse>, AppError> {
    state
        .session
        .dispatch(Event::InputChanged { text: req.text })
        .await?;

    Ok(Json(ActionResponse { accepted: true }))
}

async fn submit(
    State(state): State<AppState>,
    body: Option<Json<SubmitRequest>>,
) -> Result<Json<ActionResponse>, AppError> {
    let events = match body.and_then(|Json(req)| req.text) {
        // Applied together so no other draft update lands in between
        Some(text) => vec![Event::InputChanged { text }, Event::Submit],
        None => vec![Event::Submit],
    };
    state.session.dispatch_all(events).await?;

    Ok(Json(ActionResponse { accepted: true }))
}

async fn clear(State(state): State<AppState>) -> Result<Json<ActionResponse>, AppError> {
    state.session.dispatch(Event::Clear).await?;

    Ok(Json(ActionResponse { accepted: true }))
}

// ============================================================
// Model info
// ============================================================

async fn get_model(State(state): State<AppState>) -> Json<ModelResponse> {
    Json(ModelResponse {
        model: state.model.clone(),
        provider: "Gemini",
    })
}

async fn get_version() -> &'static str {
    concat!("gemini-chat ", env!("CARGO_PKG_VERSION"))
}

// ============================================================
// Error Handling
// ============================================================

#[derive(Debug)]
enum AppError {
    BadRequest(String),
    Conflict(String),
    Internal(String),
}

impl From<RuntimeError> for AppError {
    fn from(e: RuntimeError) -> Self {
        match e {
            RuntimeError::Rejected(TransitionError::Busy) => AppError::Conflict(e.to_string()),
            RuntimeError::Rejected(TransitionError::InvalidTransition(_)) => {
                AppError::BadRequest(e.to_string())
            }
            RuntimeError::Closed => AppError::Internal(e.to_string()),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::Conflict(msg) => (StatusCode::CONFLICT, msg),
            AppError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
        };

        let body = Json(ErrorResponse::new(message));
        (status, body).into_response()
    }
}
