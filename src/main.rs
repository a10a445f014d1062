//! Gemini Chat - single-page chat against the Gemini API
//!
//! A Rust backend that owns one conversation, forwards each prompt to the
//! remote model, and pushes render snapshots to the page.

mod api;
mod config;
mod conversation;
mod llm;
mod runtime;
mod state_machine;

use api::{create_router, AppState};
use config::Config;
use llm::{GeminiService, LlmService, LoggingService};
use runtime::{ServiceLlmClient, SessionHandle};
use std::sync::Arc;
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "gemini_chat=info,tower_http=info".into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .json()
                .with_current_span(false)
                .with_span_list(false),
        )
        .init();

    // Configuration
    let config = Config::from_env().inspect_err(|e| {
        tracing::error!(error = %e, "Refusing to start");
    })?;

    // Remote service, wrapped for call logging
    let gemini = GeminiService::new(config.api_key.clone(), &config.model, &config.base_url)?;
    let service: Arc<dyn LlmService> = Arc::new(LoggingService::new(Arc::new(gemini)));
    tracing::info!(model = %service.model_id(), base_url = %config.base_url, "Gemini client initialized");

    // One session per process
    let session = SessionHandle::spawn(ServiceLlmClient::new(service));
    let state = AppState::new(session);

    // Create router
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let compression = CompressionLayer::new()
        .gzip(true)
        .br(true)
        .deflate(true)
        .zstd(true);

    let app = create_router(state)
        .layer(cors)
        .layer(compression)
        .layer(TraceLayer::new_for_http());

    // Start server
    let addr = config.listen_addr();
    tracing::info!("Gemini Chat listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
