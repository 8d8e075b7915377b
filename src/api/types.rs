// src/api/types.rs

use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::chat::session::{Message, PaperContext};
use crate::corpus::{SearchFilters, SearchHit};
use crate::infra::errors::BioAstraError;

/// Request body for `POST /api/chat`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ChatRequest {
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub paper_context: Option<PaperContext>,
}

#[derive(Debug, Serialize)]
pub struct ChatResponse {
    pub success: bool,
    /// Rendered HTML.
    pub response: String,
    pub raw_response: String,
    /// Abbreviated session id.
    pub user_id: String,
}

/// Request body for `POST /api/export-chat`. The body itself is optional.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ExportRequest {
    #[serde(default)]
    pub paper_title: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ChatHistoryResponse {
    pub success: bool,
    pub chat_history: Vec<Message>,
    pub user_id: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct SearchResponse {
    pub success: bool,
    pub results: Vec<SearchHit>,
    pub total: usize,
    pub query: String,
    pub filters: SearchFilters,
}

#[derive(Debug, Serialize)]
pub struct PaperSummary {
    pub pmcid: String,
    pub title: String,
    pub category: String,
    pub year: i32,
    pub has_abstract: bool,
}

/// Error response body.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub error: String,
}

pub type ApiError = (StatusCode, Json<ErrorResponse>);

pub fn error_body(status: StatusCode, message: impl Into<String>) -> ApiError {
    (
        status,
        Json(ErrorResponse {
            success: false,
            error: message.into(),
        }),
    )
}

impl From<BioAstraError> for (StatusCode, Json<ErrorResponse>) {
    fn from(err: BioAstraError) -> Self {
        let status = match err.kind() {
            "validation" => StatusCode::BAD_REQUEST,
            "not_found" => StatusCode::NOT_FOUND,
            "generation" => StatusCode::BAD_GATEWAY,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        if status.is_server_error() {
            tracing::error!(kind = err.kind(), "{err}");
        }
        error_body(status, err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_status_mapping() {
        let cases = [
            (BioAstraError::validation("x"), StatusCode::BAD_REQUEST),
            (BioAstraError::not_found("Research paper"), StatusCode::NOT_FOUND),
            (
                BioAstraError::Configuration("no key".into()),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
            (
                BioAstraError::Generation {
                    provider: "google".into(),
                    message: "down".into(),
                },
                StatusCode::BAD_GATEWAY,
            ),
        ];
        for (err, expected) in cases {
            let (status, Json(body)) = ApiError::from(err);
            assert_eq!(status, expected);
            assert!(!body.success);
            assert!(!body.error.is_empty());
        }
    }

    #[test]
    fn test_chat_request_tolerates_missing_and_null_context() {
        let req: ChatRequest = serde_json::from_str(r#"{"message": "hi"}"#).unwrap();
        assert!(req.paper_context.is_none());
        let req: ChatRequest =
            serde_json::from_str(r#"{"message": "hi", "paper_context": null}"#).unwrap();
        assert!(req.paper_context.is_none());
        let req: ChatRequest = serde_json::from_str(r#"{}"#).unwrap();
        assert!(req.message.is_empty());
    }
}
