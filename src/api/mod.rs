// src/api/mod.rs — HTTP API for the research dashboard

pub mod handlers;
pub mod session_cookie;
pub mod types;

use axum::http::{header, HeaderValue, Method};
use axum::routing::{get, post};
use axum::Router;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::chat::ChatOrchestrator;
use crate::corpus::Corpus;
use crate::infra::config::ServerConfig;

/// Shared state for API handlers.
#[derive(Clone)]
pub struct ApiState {
    pub corpus: Arc<Corpus>,
    pub chat: Arc<ChatOrchestrator>,
    pub cookie_name: String,
}

fn cors_layer(config: &ServerConfig) -> CorsLayer {
    if config.allowed_origins.is_empty() {
        return CorsLayer::permissive();
    }

    let origins: Vec<HeaderValue> = config
        .allowed_origins
        .iter()
        .filter_map(|origin| match origin.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(origin = %origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    // Credentialed CORS forbids wildcards, so methods and headers are explicit.
    CorsLayer::new()
        .allow_origin(origins)
        .allow_credentials(true)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE])
}

/// Build the axum router with all API routes.
pub fn build_router(state: ApiState, config: &ServerConfig) -> Router {
    Router::new()
        .route("/", get(handlers::root))
        .route("/api/health", get(handlers::health))
        .route("/api/gemini-models", get(handlers::list_models))
        .route("/api/test", get(handlers::sample))
        .route("/api/search", post(handlers::search))
        .route("/api/research/{pmcid}", get(handlers::get_paper))
        .route("/api/categories", get(handlers::categories))
        .route("/api/years", get(handlers::years))
        .route("/api/chat", post(handlers::chat))
        .route("/api/export-chat", post(handlers::export_chat))
        .route("/api/chat-history", get(handlers::chat_history))
        .route("/api/clear-chat", post(handlers::clear_chat))
        .layer(cors_layer(config))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Serve until Ctrl-C.
pub async fn start_server(config: &ServerConfig, state: ApiState) -> anyhow::Result<()> {
    let addr = format!("{}:{}", config.host, config.port);
    let router = build_router(state, config);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("API server listening on http://{addr}");
    axum::serve(listener, router)
        .with_graceful_shutdown(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!("Failed to listen for shutdown signal: {e}");
                std::future::pending::<()>().await;
            }
            tracing::info!("Shutdown signal received");
        })
        .await?;
    Ok(())
}
