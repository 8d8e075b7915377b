// src/api/handlers.rs

use axum::body::Bytes;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::header::{CONTENT_DISPOSITION, CONTENT_TYPE};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;

use crate::api::{session_cookie, types::*, ApiState};
use crate::chat::session::short_id;
use crate::corpus::{PaperRecord, SearchRequest};
use crate::export::{export_chat as render_pdf, ChatTranscript, DEFAULT_PAPER_TITLE};

fn json_body<T>(body: Result<Json<T>, JsonRejection>) -> Result<T, ApiError> {
    body.map(|Json(value)| value).map_err(|rejection| {
        error_body(
            StatusCode::BAD_REQUEST,
            format!("Invalid JSON body: {}", rejection.body_text()),
        )
    })
}

/// GET / — Service banner and endpoint map.
pub async fn root() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "message": "Bio-Astra Dashboard API",
        "version": env!("CARGO_PKG_VERSION"),
        "endpoints": {
            "search": "/api/search",
            "research": "/api/research/<pmcid>",
            "health": "/api/health",
            "chat": "/api/chat",
            "export": "/api/export-chat",
            "history": "/api/chat-history",
        }
    }))
}

/// GET /api/health — Liveness plus corpus and generator status.
pub async fn health(State(state): State<ApiState>) -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "healthy",
        "timestamp": chrono::Local::now().to_rfc3339(),
        "search_types": state.corpus.search_types(),
        "research_papers": state.corpus.len(),
        "gemini_configured": state.chat.is_configured(),
        "active_sessions": state.chat.store().len(),
    }))
}

/// GET /api/gemini-models — Models visible to the configured credential.
pub async fn list_models(
    State(state): State<ApiState>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let Some(generator) = state.chat.generator() else {
        return Err(error_body(
            StatusCode::BAD_REQUEST,
            "Generation provider not configured",
        ));
    };

    let models = generator.list_models().await?;
    Ok(Json(serde_json::json!({
        "success": true,
        "configured_model": generator.model(),
        "total_models": models.len(),
        "models": models,
    })))
}

/// GET /api/test — Small corpus sample for smoke-testing a deployment.
pub async fn sample(State(state): State<ApiState>) -> Json<serde_json::Value> {
    let sample_papers: Vec<PaperSummary> = state
        .corpus
        .sample(5)
        .into_iter()
        .map(|p| PaperSummary {
            pmcid: p.pmcid.clone(),
            title: p.title.clone(),
            category: p.category.clone(),
            year: p.year,
            has_abstract: !p.abstract_text.is_empty(),
        })
        .collect();

    Json(serde_json::json!({
        "total_papers": state.corpus.len(),
        "sample_papers": sample_papers,
        "available_categories": state.corpus.categories(),
    }))
}

/// POST /api/search — Substring search with year/category filters.
pub async fn search(
    State(state): State<ApiState>,
    body: Result<Json<SearchRequest>, JsonRejection>,
) -> Result<Json<SearchResponse>, ApiError> {
    let request = json_body(body)?;
    let results = state.corpus.search(&request);

    Ok(Json(SearchResponse {
        success: true,
        total: results.len(),
        results,
        query: request.query,
        filters: request.filters,
    }))
}

/// GET /api/research/{pmcid} — Full paper record.
pub async fn get_paper(
    State(state): State<ApiState>,
    Path(pmcid): Path<String>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let paper: &PaperRecord = state.corpus.get(&pmcid)?;
    Ok(Json(serde_json::json!({
        "success": true,
        "data": paper,
    })))
}

/// GET /api/categories
pub async fn categories(State(state): State<ApiState>) -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "success": true,
        "categories": state.corpus.categories(),
    }))
}

/// GET /api/years
pub async fn years(State(state): State<ApiState>) -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "success": true,
        "years": state.corpus.years(),
    }))
}

/// POST /api/chat — Ask about a paper. Sets the session cookie on first use.
pub async fn chat(
    State(state): State<ApiState>,
    headers: HeaderMap,
    body: Result<Json<ChatRequest>, JsonRejection>,
) -> Result<Response, ApiError> {
    let request = json_body(body)?;
    let session_id = session_cookie::read_session_id(&headers, &state.cookie_name);

    let reply = state
        .chat
        .handle_chat(
            session_id.as_deref(),
            &request.message,
            request.paper_context.unwrap_or_default(),
        )
        .await?;

    let cookie = if session_id.as_deref() != Some(reply.session_id.as_str()) {
        session_cookie::set_cookie_header(&state.cookie_name, &reply.session_id)
    } else {
        None
    };

    let body = Json(ChatResponse {
        success: true,
        response: reply.response,
        raw_response: reply.raw_response,
        user_id: short_id(&reply.session_id),
    });

    Ok(match cookie {
        Some(header) => ([header], body).into_response(),
        None => body.into_response(),
    })
}

/// GET /api/chat-history — The caller's history; empty without a session.
pub async fn chat_history(
    State(state): State<ApiState>,
    headers: HeaderMap,
) -> Json<ChatHistoryResponse> {
    let session = session_cookie::read_session_id(&headers, &state.cookie_name)
        .and_then(|id| state.chat.store().access(&id));

    match session {
        Some(session) => Json(ChatHistoryResponse {
            success: true,
            user_id: Some(short_id(&session.session_id)),
            chat_history: session.history,
        }),
        None => {
            tracing::debug!("Chat history requested without a live session");
            Json(ChatHistoryResponse {
                success: true,
                chat_history: Vec::new(),
                user_id: None,
            })
        }
    }
}

/// POST /api/clear-chat — Drop the caller's history, keep the session.
pub async fn clear_chat(
    State(state): State<ApiState>,
    headers: HeaderMap,
) -> Json<serde_json::Value> {
    let cleared = session_cookie::read_session_id(&headers, &state.cookie_name)
        .map(|id| state.chat.store().clear_history(&id));

    if !matches!(cleared, Some(crate::chat::session::Presence::Present)) {
        tracing::debug!("Clear requested without a live session");
    }

    Json(serde_json::json!({
        "success": true,
        "message": "Chat history cleared",
    }))
}

/// POST /api/export-chat — The caller's history as a PDF attachment.
pub async fn export_chat(
    State(state): State<ApiState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Response, ApiError> {
    let request: ExportRequest = if body.iter().all(u8::is_ascii_whitespace) {
        ExportRequest::default()
    } else {
        serde_json::from_slice(&body).map_err(|e| {
            error_body(StatusCode::BAD_REQUEST, format!("Invalid JSON body: {e}"))
        })?
    };

    let session_id = session_cookie::read_session_id(&headers, &state.cookie_name);
    let messages = session_id
        .as_deref()
        .map(|id| state.chat.store().get_history(id))
        .unwrap_or_default();

    if messages.is_empty() {
        return Err(error_body(
            StatusCode::BAD_REQUEST,
            "No chat messages found for this session",
        ));
    }

    let paper_title = request
        .paper_title
        .as_deref()
        .unwrap_or(DEFAULT_PAPER_TITLE);
    let exported = render_pdf(&ChatTranscript {
        paper_title,
        session_id: session_id.as_deref(),
        messages: &messages,
        exported_at: chrono::Local::now(),
    });

    let disposition = format!("attachment; filename=\"{}\"", exported.filename);
    Ok((
        [
            (CONTENT_TYPE, "application/pdf".to_string()),
            (CONTENT_DISPOSITION, disposition),
        ],
        exported.bytes,
    )
        .into_response())
}
