// Prompt fragments shared by every provider call.
// Task-specific templates live in analysis/prompts.rs.

/// System prompt fragment that enforces JSON-only output.
pub const JSON_ONLY_SYSTEM: &str = "You are a strict resume-screening assistant. \
    Respond with a single valid JSON object and nothing else. \
    Do NOT wrap it in markdown code fences. \
    Do NOT add commentary, caveats or apologies.";
