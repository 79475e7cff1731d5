//! Axum route handlers for the Coaching API.

use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::coaching::writer::{rewrite_achievement, suggest_project};
use crate::errors::AnalysisError;
use crate::state::AppState;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct AchievementRequest {
    pub bullet_point: String,
    #[serde(default)]
    pub job_title: String,
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default)]
    pub model_name: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct AchievementResponse {
    pub enhanced_text: String,
}

#[derive(Debug, Deserialize)]
pub struct ProjectIdeaRequest {
    pub skill: String,
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default)]
    pub model_name: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ProjectIdeaResponse {
    pub idea: String,
    /// False when the idea is the offline template.
    pub generated: bool,
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/coach/achievement
///
/// Rewrites one resume bullet as a STAR achievement for the target job title.
pub async fn handle_achievement(
    State(state): State<AppState>,
    payload: Result<Json<AchievementRequest>, JsonRejection>,
) -> Result<Json<AchievementResponse>, AnalysisError> {
    let Json(request) = payload.map_err(|e| AnalysisError::Validation(e.body_text()))?;
    let llm = state.llm.with_credentials(
        non_blank(&request.api_key),
        non_blank(&request.model_name),
    );

    let enhanced_text = rewrite_achievement(
        &llm,
        &state.engine.retry_policy(),
        &request.bullet_point,
        &request.job_title,
    )
    .await?;

    Ok(Json(AchievementResponse { enhanced_text }))
}

/// POST /api/v1/coach/project
///
/// Suggests one portfolio project that demonstrates a missing skill.
pub async fn handle_project_idea(
    State(state): State<AppState>,
    payload: Result<Json<ProjectIdeaRequest>, JsonRejection>,
) -> Result<Json<ProjectIdeaResponse>, AnalysisError> {
    let Json(request) = payload.map_err(|e| AnalysisError::Validation(e.body_text()))?;
    let llm = state.llm.with_credentials(
        non_blank(&request.api_key),
        non_blank(&request.model_name),
    );

    let suggestion = suggest_project(&llm, &state.engine.retry_policy(), &request.skill).await?;

    Ok(Json(ProjectIdeaResponse {
        idea: suggestion.idea,
        generated: suggestion.generated,
    }))
}

fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.trim().is_empty())
}
