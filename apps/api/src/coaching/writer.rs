//! Coaching writer — single-shot provider calls that return one line of prose.

use serde::Deserialize;
use tracing::{info, warn};

use crate::coaching::prompts::{
    achievement_system, project_system, render_achievement_prompt, render_project_prompt,
    template_project_idea,
};
use crate::errors::AnalysisError;
use crate::llm_client::retry::{retry_with_backoff, RetryPolicy};
use crate::llm_client::{LlmClient, LlmError};

#[derive(Debug, Deserialize)]
struct AchievementReply {
    bullet: String,
}

#[derive(Debug, Deserialize)]
struct ProjectReply {
    idea: String,
}

/// A project suggestion and whether the provider wrote it.
#[derive(Debug, Clone, PartialEq)]
pub struct ProjectIdea {
    pub idea: String,
    pub generated: bool,
}

/// Rewrites `bullet` as a STAR achievement aimed at `job_title`.
///
/// Fails with `MissingCredential` before any call when the client has no key.
pub async fn rewrite_achievement(
    llm: &LlmClient,
    policy: &RetryPolicy,
    bullet: &str,
    job_title: &str,
) -> Result<String, AnalysisError> {
    if bullet.trim().is_empty() {
        return Err(AnalysisError::Validation("bullet_point cannot be empty".to_string()));
    }
    if !llm.has_credential() {
        return Err(AnalysisError::MissingCredential);
    }

    let prompt = render_achievement_prompt(bullet, job_title);
    let system = achievement_system();
    let reply: AchievementReply = retry_with_backoff(policy, "rewrite_achievement", || {
        llm.call_json(&prompt, &system)
    })
    .await?;

    let rewritten = clean_line(&reply.bullet).ok_or(LlmError::EmptyContent)?;
    info!("Rewrote bullet ({} → {} chars)", bullet.len(), rewritten.len());
    Ok(rewritten)
}

/// Suggests one portfolio project that demonstrates `skill`.
///
/// Without a credential this returns a template suggestion instead of failing.
pub async fn suggest_project(
    llm: &LlmClient,
    policy: &RetryPolicy,
    skill: &str,
) -> Result<ProjectIdea, AnalysisError> {
    if skill.trim().is_empty() {
        return Err(AnalysisError::Validation("skill cannot be empty".to_string()));
    }
    if !llm.has_credential() {
        warn!("No provider key; returning template project idea");
        return Ok(ProjectIdea {
            idea: template_project_idea(skill),
            generated: false,
        });
    }

    let prompt = render_project_prompt(skill);
    let system = project_system();
    let reply: ProjectReply = retry_with_backoff(policy, "suggest_project", || {
        llm.call_json(&prompt, &system)
    })
    .await?;

    let idea = clean_line(&reply.idea).ok_or(LlmError::EmptyContent)?;
    Ok(ProjectIdea {
        idea,
        generated: true,
    })
}

/// Trims whitespace and stray wrapping quotes; `None` when nothing is left.
fn clean_line(text: &str) -> Option<String> {
    let line = text
        .trim()
        .trim_matches(|c: char| matches!(c, '"' | '“' | '”'))
        .trim();
    (!line.is_empty()).then(|| line.to_string())
}
