use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::documents::DocumentError;
use crate::llm_client::LlmError;
use crate::resume::docx_export::DocxExportError;
use crate::resume::normalize::NormalizeError;
use crate::resume::store::StoreError;

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Input text is empty")]
    EmptyInput,

    #[error("Unsupported file type: {0}")]
    UnsupportedFileType(String),

    #[error("Generation backend unavailable: {0}")]
    GenerationUnavailable(String),

    #[error("Malformed backend response: {0}")]
    MalformedResponse(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl From<LlmError> for AppError {
    fn from(err: LlmError) -> Self {
        match err {
            LlmError::EmptyContent => {
                AppError::MalformedResponse(LlmError::EmptyContent.to_string())
            }
            other => AppError::GenerationUnavailable(other.to_string()),
        }
    }
}

impl From<NormalizeError> for AppError {
    fn from(err: NormalizeError) -> Self {
        AppError::MalformedResponse(err.to_string())
    }
}

impl From<DocumentError> for AppError {
    fn from(err: DocumentError) -> Self {
        match err {
            DocumentError::UnsupportedFileType(mime) => AppError::UnsupportedFileType(mime),
            other => AppError::Validation(other.to_string()),
        }
    }
}

/// A rejected replace means the normalizer's contract was broken: a defect, not user error.
impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        AppError::Internal(anyhow::Error::new(err))
    }
}

impl From<DocxExportError> for AppError {
    fn from(err: DocxExportError) -> Self {
        AppError::Internal(anyhow::Error::new(err))
    }
}

impl AppError {
    fn parts(&self) -> (StatusCode, &'static str) {
        match self {
            AppError::EmptyInput => (StatusCode::BAD_REQUEST, "EMPTY_INPUT"),
            AppError::UnsupportedFileType(_) => {
                (StatusCode::UNSUPPORTED_MEDIA_TYPE, "UNSUPPORTED_FILE_TYPE")
            }
            AppError::GenerationUnavailable(_) => (StatusCode::BAD_GATEWAY, "GENERATION_UNAVAILABLE"),
            AppError::MalformedResponse(_) => {
                (StatusCode::UNPROCESSABLE_ENTITY, "MALFORMED_RESPONSE")
            }
            AppError::NotFound(_) => (StatusCode::NOT_FOUND, "NOT_FOUND"),
            AppError::Validation(_) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR"),
            AppError::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code) = self.parts();

        let message = match &self {
            AppError::GenerationUnavailable(msg) => {
                tracing::error!("Generation error: {msg}");
                "The resume generator is unavailable. Please try again.".to_string()
            }
            AppError::MalformedResponse(msg) => {
                tracing::error!("Malformed response: {msg}");
                "The resume generator returned an unreadable response. Please resubmit."
                    .to_string()
            }
            AppError::Internal(e) => {
                tracing::error!("Internal error: {e:?}");
                "An internal server error occurred".to_string()
            }
            other => other.to_string(),
        };

        let body = Json(json!({
            "error": {
                "code": code,
                "message": message
            }
        }));

        (status, body).into_response()
    }
}
