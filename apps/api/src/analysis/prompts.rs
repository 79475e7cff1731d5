// All provider prompt constants for the analysis module.
// Reuses cross-cutting fragments from llm_client::prompts.

use crate::llm_client::prompts::JSON_ONLY_SYSTEM;

/// System prompt for sentence × requirement scoring.
pub fn scoring_system() -> String {
    format!(
        "You are an expert technical recruiter comparing resume sentences against \
        job requirements by meaning, not by shared keywords. {JSON_ONLY_SYSTEM}"
    )
}

/// Scoring prompt template.
/// Replace: {sentence_count}, {requirement_count}, {sentences_json}, {requirements_json}
pub const SCORING_PROMPT_TEMPLATE: &str = r#"Score how well each resume sentence demonstrates each job requirement.

Return a JSON object with this EXACT schema (no extra fields):
{
  "scores": [
    [0.0, 0.85, 0.1]
  ]
}

Rules:
- "scores" has exactly {sentence_count} rows, one per sentence, in the order given.
- Every row has exactly {requirement_count} numbers, one per requirement, in the order given.
- Each number is in [0.0, 1.0]:
  1.0 = the sentence directly demonstrates the requirement
  0.5 = related or partial evidence ("Led a team of 5 engineers" vs "team player")
  0.0 = no relation
- Judge meaning. Synonyms and paraphrases count ("coordinated a squad" demonstrates "leadership").

RESUME SENTENCES:
{sentences_json}

JOB REQUIREMENTS:
{requirements_json}"#;

/// System prompt for requirement classification.
pub fn classification_system() -> String {
    format!(
        "You are an expert job description analyst. You sort job requirements into \
        fixed categories. {JSON_ONLY_SYSTEM}"
    )
}

/// Classification prompt template.
/// Replace: {phrase_count}, {phrases_json}
pub const CLASSIFICATION_PROMPT_TEMPLATE: &str = r#"Assign each job requirement to exactly one category.

Return a JSON object with this EXACT schema (no extra fields):
{
  "categories": ["Hard Skills", "Soft Skills"]
}

CATEGORY OPTIONS (pick exactly one per requirement):
- "Hard Skills": languages, tools, frameworks, technical domains
- "Soft Skills": communication, collaboration, leadership, personal traits
- "Experience": tenure, seniority, track record, prior roles or industries
- "Education": degrees, fields of study, certifications

"categories" has exactly {phrase_count} entries, in the order given.

REQUIREMENTS:
{phrases_json}"#;

pub fn render_scoring_prompt(sentences: &[String], requirements: &[String]) -> String {
    fill(
        SCORING_PROMPT_TEMPLATE,
        &[
            ("{sentence_count}", sentences.len().to_string()),
            ("{requirement_count}", requirements.len().to_string()),
            ("{sentences_json}", numbered_json(sentences)),
            ("{requirements_json}", numbered_json(requirements)),
        ],
    )
}

pub fn render_classification_prompt(phrases: &[String]) -> String {
    fill(
        CLASSIFICATION_PROMPT_TEMPLATE,
        &[
            ("{phrase_count}", phrases.len().to_string()),
            ("{phrases_json}", numbered_json(phrases)),
        ],
    )
}

/// Substitutes placeholders in one pass over `template`; inserted text is never rescanned.
fn fill(template: &str, values: &[(&str, String)]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;
    while let Some(start) = rest.find('{') {
        out.push_str(&rest[..start]);
        let tail = &rest[start..];
        match values.iter().find(|(key, _)| tail.starts_with(key)) {
            Some((key, value)) => {
                out.push_str(value);
                rest = &tail[key.len()..];
            }
            None => {
                out.push('{');
                rest = &tail[1..];
            }
        }
    }
    out.push_str(rest);
    out
}

/// One JSON string per line, prefixed with its 0-based position.
fn numbered_json(items: &[String]) -> String {
    items
        .iter()
        .enumerate()
        .map(|(i, item)| {
            let quoted = serde_json::to_string(item).unwrap_or_else(|_| format!("{item:?}"));
            format!("{i}: {quoted}")
        })
        .collect::<Vec<_>>()
        .join("\n")
}
