//! Axum route handlers for the Analysis API.
//!
//! If the client disconnects, hyper drops the handler future and every provider
//! call still in flight for that run is dropped with it.

use axum::{
    extract::{rejection::JsonRejection, State},
    http::HeaderValue,
    response::{IntoResponse, Response},
    Json,
};
use serde::Deserialize;

use crate::analysis::engine::AnalysisInput;
use crate::analysis::models::ResultQuality;
use crate::errors::AnalysisError;
use crate::state::AppState;

/// Set on successful responses when part of the result came from the lexical fallback.
/// The value is the number of fallback batches.
pub const DEGRADED_HEADER: &str = "x-rolefit-degraded";

// ────────────────────────────────────────────────────────────────────────────
// Request types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct AnalyzeRequest {
    pub resume_text: String,
    pub jd_text: String,
    /// Overrides the server's provider key for this request only. Never logged.
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default)]
    pub model_name: Option<String>,
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/analyze
///
/// Scores a resume against a job description. Responds with exactly
/// `score`, `sub_scores`, `missing_skills`, `sentence_scores` and `recruiter_metrics`.
pub async fn handle_analyze(
    State(state): State<AppState>,
    payload: Result<Json<AnalyzeRequest>, JsonRejection>,
) -> Result<Response, AnalysisError> {
    let Json(request) = payload.map_err(|e| AnalysisError::Validation(e.body_text()))?;

    let api_key = request.api_key.as_deref().filter(|k| !k.trim().is_empty());
    let model = request.model_name.as_deref().filter(|m| !m.trim().is_empty());
    let provider = state.provider_for(api_key, model);

    let input = AnalysisInput {
        resume_text: request.resume_text,
        jd_text: request.jd_text,
    };
    let result = state.engine.analyze(&input, provider.as_ref()).await?;

    let quality = result.quality;
    let mut response = Json(result).into_response();
    if let ResultQuality::Degraded { fallback_batches } = quality {
        response
            .headers_mut()
            .insert(DEGRADED_HEADER, HeaderValue::from(fallback_batches));
    }
    Ok(response)
}
