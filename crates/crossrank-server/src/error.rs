use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use crossrank_rerank::{RerankError, ScorerError};
use serde_json::json;
use thiserror::Error;

/// Errors surfaced by the HTTP handlers, rendered as `{"error", "message"}`.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("invalid request body: {message}")]
    InvalidRequest { status: StatusCode, message: String },

    #[error(transparent)]
    Rerank(#[from] RerankError),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::InvalidRequest { status, .. } => *status,
            Self::Rerank(RerankError::Scorer(ScorerError::Tokenization(_))) => {
                StatusCode::UNPROCESSABLE_ENTITY
            }
            Self::Rerank(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            Self::InvalidRequest { .. } => "invalid_request",
            Self::Rerank(RerankError::Scorer(ScorerError::Tokenization(_))) => {
                "tokenization_failed"
            }
            Self::Rerank(RerankError::Scorer(ScorerError::ResourceExhausted(_))) => {
                "resource_exhausted"
            }
            Self::Rerank(_) => "model_error",
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::InvalidRequest {
            status: rejection.status(),
            message: rejection.body_text(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match &self {
            Self::InvalidRequest { message, .. } => message.clone(),
            Self::Rerank(err) => err.to_string(),
        };
        let body = Json(json!({"error": self.code(), "message": message}));
        (status, body).into_response()
    }
}
