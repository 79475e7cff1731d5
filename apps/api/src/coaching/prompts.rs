// All provider prompt constants for the coaching module.
// Reuses cross-cutting fragments from llm_client::prompts.

use crate::llm_client::prompts::JSON_ONLY_SYSTEM;

/// System prompt for bullet rewriting.
pub fn achievement_system() -> String {
    format!(
        "You are an expert resume writer who turns duty statements into measurable \
        achievements. {JSON_ONLY_SYSTEM}"
    )
}

/// Achievement prompt template. Replace: {job_title}, {bullet_json}
pub const ACHIEVEMENT_PROMPT_TEMPLATE: &str = r#"Rewrite the resume bullet below using the STAR method (Situation, Task, Action, Result).

Target job title: {job_title}
Original bullet (JSON string): {bullet_json}

Return a JSON object with this EXACT schema (no extra fields):
{
  "bullet": "Cut checkout latency 40% by rewriting the payment service in Rust, lifting conversion 3%."
}

Rules:
- Start with a strong action verb.
- Quantify results where the bullet supports it (numbers, percentages, scale).
- Keep it to one or two sentences.
- Do NOT invent employers, products or technologies absent from the bullet."#;

/// System prompt for project suggestions.
pub fn project_system() -> String {
    format!(
        "You are a career coach who suggests portfolio projects that prove a specific \
        skill to a hiring manager. {JSON_ONLY_SYSTEM}"
    )
}

/// Project prompt template. Replace: {skill_json}
pub const PROJECT_PROMPT_TEMPLATE: &str = r#"Suggest ONE specific, impressive project a candidate can build to demonstrate this skill: {skill_json}

Return a JSON object with this EXACT schema (no extra fields):
{
  "idea": "Build a library management system on MySQL that exercises joins, transactions and indexing."
}

Rules:
- Exactly one sentence.
- Name the concrete thing to build and what it exercises."#;

pub fn render_achievement_prompt(bullet: &str, job_title: &str) -> String {
    let job_title = if job_title.trim().is_empty() {
        "(not specified)"
    } else {
        job_title.trim()
    };
    // The template's {job_title} comes before the bullet, so only the first match is replaced.
    ACHIEVEMENT_PROMPT_TEMPLATE
        .replace("{bullet_json}", &quoted(bullet))
        .replacen("{job_title}", job_title, 1)
}

pub fn render_project_prompt(skill: &str) -> String {
    PROJECT_PROMPT_TEMPLATE.replace("{skill_json}", &quoted(skill))
}

/// Offline suggestion used when no credential is available.
pub fn template_project_idea(skill: &str) -> String {
    format!("Build a project using {}.", skill.trim())
}

fn quoted(text: &str) -> String {
    serde_json::to_string(text.trim()).unwrap_or_else(|_| format!("{text:?}"))
}
