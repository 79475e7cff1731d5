use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::llm_client::LlmError;

/// Why an analysis run gave up on the scoring provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpstreamCause {
    /// Every attempt in the retry budget failed with a transient error.
    RetriesExhausted,
    /// Every attempt in the retry budget timed out.
    Timeout,
    /// The whole run outlived `analysis_deadline`.
    DeadlineExceeded,
    /// The provider answered with content we could not parse and lexical fallback is off.
    MalformedResponse,
    /// The provider refused the request for a non-credential, non-transient reason.
    Rejected,
}

impl UpstreamCause {
    pub fn is_timeout(self) -> bool {
        matches!(self, UpstreamCause::Timeout | UpstreamCause::DeadlineExceeded)
    }
}

/// Stable error kind exposed at the boundary alongside the human-readable message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    ValidationError,
    ExtractionError,
    AuthError,
    UpstreamError,
    Cancelled,
    InternalError,
}

impl ErrorKind {
    pub fn code(self) -> &'static str {
        match self {
            ErrorKind::ValidationError => "VALIDATION_ERROR",
            ErrorKind::ExtractionError => "EXTRACTION_ERROR",
            ErrorKind::AuthError => "AUTH_ERROR",
            ErrorKind::UpstreamError => "UPSTREAM_ERROR",
            ErrorKind::Cancelled => "CANCELLED",
            ErrorKind::InternalError => "INTERNAL_ERROR",
        }
    }
}

/// Engine-level error type. Any stage failing aborts the whole run; there is no partial result.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AnalysisError>`.
#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Could not extract requirements: {0}")]
    Extraction(String),

    #[error("Provider rejected the credential: {0}")]
    Auth(String),

    #[error("No provider credential configured or supplied")]
    MissingCredential,

    #[error("Scoring provider unavailable ({cause:?}): {message}")]
    Upstream {
        cause: UpstreamCause,
        message: String,
    },

    #[error("Analysis cancelled")]
    Cancelled,

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AnalysisError {
    pub fn upstream(cause: UpstreamCause, message: impl Into<String>) -> Self {
        AnalysisError::Upstream {
            cause,
            message: message.into(),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            AnalysisError::Validation(_) => ErrorKind::ValidationError,
            AnalysisError::Extraction(_) => ErrorKind::ExtractionError,
            AnalysisError::Auth(_) | AnalysisError::MissingCredential => ErrorKind::AuthError,
            AnalysisError::Upstream { .. } => ErrorKind::UpstreamError,
            AnalysisError::Cancelled => ErrorKind::Cancelled,
            AnalysisError::Internal(_) => ErrorKind::InternalError,
        }
    }
}

impl From<LlmError> for AnalysisError {
    /// Maps a provider failure that survived retry and fallback handling to its run-level kind.
    fn from(err: LlmError) -> Self {
        match err {
            LlmError::Auth(msg) => AnalysisError::Auth(msg),
            LlmError::Exhausted { attempts, last } => {
                let cause = if matches!(*last, LlmError::Timeout) {
                    UpstreamCause::Timeout
                } else {
                    UpstreamCause::RetriesExhausted
                };
                AnalysisError::upstream(cause, format!("gave up after {attempts} attempts: {last}"))
            }
            LlmError::Timeout => AnalysisError::upstream(UpstreamCause::Timeout, err.to_string()),
            LlmError::Malformed(_) | LlmError::EmptyContent => {
                AnalysisError::upstream(UpstreamCause::MalformedResponse, err.to_string())
            }
            LlmError::Rejected { .. } => {
                AnalysisError::upstream(UpstreamCause::Rejected, err.to_string())
            }
            LlmError::RateLimited(_) | LlmError::Unavailable { .. } | LlmError::Transport(_) => {
                AnalysisError::upstream(UpstreamCause::RetriesExhausted, err.to_string())
            }
        }
    }
}

impl IntoResponse for AnalysisError {
    fn into_response(self) -> Response {
        let kind = self.kind();
        let (status, message) = match &self {
            AnalysisError::Validation(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            AnalysisError::Extraction(msg) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                format!("{msg}. Try pasting the full job description, including its requirements."),
            ),
            AnalysisError::Auth(_) => (
                StatusCode::UNAUTHORIZED,
                "The scoring provider rejected the API key".to_string(),
            ),
            AnalysisError::MissingCredential => (
                StatusCode::UNAUTHORIZED,
                "No API key was supplied for the scoring provider".to_string(),
            ),
            AnalysisError::Upstream { cause, message } => {
                tracing::error!("Upstream error ({cause:?}): {message}");
                let status = if cause.is_timeout() {
                    StatusCode::GATEWAY_TIMEOUT
                } else {
                    StatusCode::BAD_GATEWAY
                };
                (
                    status,
                    "The scoring provider is unavailable. Please retry later.".to_string(),
                )
            }
            AnalysisError::Cancelled => (
                StatusCode::REQUEST_TIMEOUT,
                "The analysis was cancelled".to_string(),
            ),
            AnalysisError::Internal(msg) => {
                tracing::error!("Internal error: {msg}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "An internal error occurred".to_string(),
                )
            }
        };

        let body = Json(json!({
            "error": {
                "code": kind.code(),
                "message": message
            }
        }));

        (status, body).into_response()
    }
}
