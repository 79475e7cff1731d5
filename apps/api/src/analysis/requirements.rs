//! Requirement Extractor — turns raw job-description text into categorized, weighted requirements.
//!
//! Pipeline:
//! 1. Segment the JD with the resume segmenter (same boundary rules).
//! 2. Track section headings ("Requirements:", "Nice to have:", "About us"). They set the
//!    default requirement level, and "about"/benefits sections are skipped entirely.
//! 3. Strip lead-ins ("We need", "You will"), split list clauses on `,`/`;`, normalize phrases.
//! 4. Deduplicate by canonical phrase (case-insensitive), counting repetitions.
//! 5. Weight: level base × position decay × repetition bonus, clamped to (0, 1].
//! 6. Classify lexically from cue phrases; anything with no cue is left for the
//!    provider's semantic classification (see `engine`).
//!
//! CATEGORY TIE-BREAK: Education cues win outright. Otherwise a phrase that states a
//! tenure ("5+ years of Python") is Experience, because the measurable requirement is
//! the duration. Otherwise Hard Skills beats Soft Skills on equal cue counts.

use std::collections::HashMap;
use std::sync::OnceLock;

use regex::Regex;

use crate::analysis::lexicon::Lexicons;
use crate::analysis::models::{Category, RequirementItem};
use crate::analysis::segmenter::segment;
use crate::analysis::text::{content_tokens, tokenize};
use crate::errors::AnalysisError;

/// How strongly the JD asks for a requirement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum RequirementLevel {
    Preferred,
    Implied,
    Required,
}

impl RequirementLevel {
    /// Base weights are spaced so that position and repetition adjustments can never
    /// lift a lower level above the floor of a higher one.
    fn base_weight(self) -> f32 {
        match self {
            RequirementLevel::Required => 1.0,
            RequirementLevel::Implied => 0.7,
            RequirementLevel::Preferred => 0.4,
        }
    }
}

/// Earliest requirement keeps its full weight; the last one loses this fraction.
const POSITION_DECAY: f32 = 0.1;
/// Bonus per repeat mention, capped at `MAX_REPEAT_BONUS_STEPS` repeats.
const REPEAT_BONUS: f32 = 0.05;
const MAX_REPEAT_BONUS_STEPS: usize = 2;
/// Label before a colon longer than this is prose, not a heading.
const MAX_LABEL_WORDS: usize = 6;
/// Split "X and Y" only in short list items; longer parts are prose.
const MAX_CONJUNCTION_SPLIT_WORDS: usize = 6;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    General,
    Requirements,
    Preferred,
    Responsibilities,
    Skip,
}

impl Section {
    fn level(self) -> RequirementLevel {
        match self {
            Section::Requirements => RequirementLevel::Required,
            Section::Preferred => RequirementLevel::Preferred,
            Section::General | Section::Responsibilities | Section::Skip => {
                RequirementLevel::Implied
            }
        }
    }
}

/// An extracted requirement whose category may still be unknown.
#[derive(Debug, Clone, PartialEq)]
pub struct RequirementCandidate {
    pub phrase: String,
    pub category: Option<Category>,
    pub importance: f32,
    pub order: usize,
}

// ────────────────────────────────────────────────────────────────────────────
// Patterns
// ────────────────────────────────────────────────────────────────────────────

fn tenure_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?i)\b\d+\s*\+?\s*(?:-\s*\d+\s*)?(?:years?|yrs?)\b").expect("valid regex")
    })
}

fn preferred_cue() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(
            r"(?i)\b(?:nice[- ]to[- ]have|preferred|a plus|bonus|ideally|desirable|good to have)\b",
        )
        .expect("valid regex")
    })
}

fn required_cue() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?i)\b(?:required|must|mandatory|essential|minimum)\b").expect("valid regex")
    })
}

/// A whole line that is nothing but a section heading, e.g. "Preferred Qualifications".
fn bare_heading() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(
            r"(?ix)^
            (?:(?:the|our|your|key|core|basic|minimum|preferred|required|desired|technical|additional)\s+)*
            (?:requirements|qualifications|skills|nice[-\s]to[-\s]haves?|bonus(?:\s+points)?
              |about\s+(?:us|the\s+company|the\s+team)|benefits|perks|responsibilities|duties
              |what\s+you(?:'ll|\s+will)\s+do|what\s+we\s+offer|who\s+you\s+are|what\s+you\s+bring)
            \s*:?$",
        )
        .expect("valid regex")
    })
}

fn trailing_level_marker() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(
            r"(?i)\s*\(?\b(?:(?:is|are)\s+)?(?:required|preferred|a plus|a bonus|nice[- ]to[- ]have|mandatory|desirable)\b\)?[.!]?\s*$",
        )
        .expect("valid regex")
    })
}

/// Lead-ins stripped from the front of a requirement clause, longest first.
const LEAD_INS: &[&str] = &[
    "the ideal candidate will have",
    "the ideal candidate has",
    "the ideal candidate is",
    "candidates should have",
    "candidates must have",
    "we are looking for",
    "we're looking for",
    "you should have",
    "you must have",
    "we are seeking",
    "we're seeking",
    "you will need",
    "you will have",
    "you'll need",
    "you'll have",
    "looking for",
    "you will be",
    "you will",
    "you'll be",
    "you'll",
    "must have",
    "should have",
    "you bring",
    "you have",
    "you are",
    "you're",
    "must be",
    "we need",
    "we want",
    "seeking",
];

const ARTICLES: &[&str] = &["a ", "an ", "the "];

const ROLE_NOUNS: &[&str] = &[
    "engineer",
    "developer",
    "scientist",
    "manager",
    "analyst",
    "designer",
    "architect",
    "director",
    "intern",
    "specialist",
    "consultant",
    "administrator",
    "associate",
    "lead",
];

// ────────────────────────────────────────────────────────────────────────────
// Public API
// ────────────────────────────────────────────────────────────────────────────

/// Extracts requirement candidates from `jd_text`.
///
/// Fails with `Validation` on empty input and `Extraction` when non-empty text yields nothing.
pub fn extract_candidates(
    jd_text: &str,
    lexicons: &Lexicons,
) -> Result<Vec<RequirementCandidate>, AnalysisError> {
    let sentences = segment(jd_text, lexicons)
        .map_err(|_| AnalysisError::Validation("jd_text cannot be empty".to_string()))?;

    let mut section = Section::General;
    let mut collected: Vec<(String, RequirementLevel)> = Vec::new();

    for (i, sentence) in sentences.iter().enumerate() {
        let text = sentence.text.trim();

        if i == 0 && sentences.len() > 1 && looks_like_title(text) {
            continue;
        }

        // A list item never opens a section; "- Nice to have: Kafka" labels only itself.
        let (content, line_section) = match split_heading(text) {
            Some((heading, rest)) if sentence.list_item => {
                if rest.is_empty() {
                    (text, section)
                } else {
                    (rest, heading)
                }
            }
            Some((heading, rest)) => {
                section = heading;
                (rest, heading)
            }
            None => (text, section),
        };
        if line_section == Section::Skip || content.is_empty() {
            continue;
        }

        let sentence_level = inline_level(content).unwrap_or_else(|| line_section.level());
        for part in split_clause(strip_lead_in(content)) {
            let level = inline_level(&part).unwrap_or(sentence_level);
            if let Some(phrase) = normalize_phrase(&part) {
                collected.push((phrase, level));
            }
        }
    }

    let candidates = weigh(collected, lexicons);
    if candidates.is_empty() {
        return Err(AnalysisError::Extraction(
            "no requirements found in the job description".to_string(),
        ));
    }
    Ok(candidates)
}

/// Lexical category for a phrase, or `None` when no cue applies.
pub fn classify_phrase(phrase: &str, lexicons: &Lexicons) -> Option<Category> {
    let tokens = tokenize(phrase);
    let [hard, soft, experience, education] = lexicons.cue_hits(&tokens);

    if education > 0 {
        Some(Category::Education)
    } else if tenure_pattern().is_match(phrase) {
        Some(Category::Experience)
    } else if hard > 0 && hard >= soft {
        Some(Category::HardSkills)
    } else if soft > 0 {
        Some(Category::SoftSkills)
    } else if experience > 0 {
        Some(Category::Experience)
    } else {
        None
    }
}

/// Phrases still lacking a category, in extraction order.
pub fn unresolved_phrases(candidates: &[RequirementCandidate]) -> Vec<String> {
    candidates
        .iter()
        .filter(|c| c.category.is_none())
        .map(|c| c.phrase.clone())
        .collect()
}

/// Fills unresolved categories from `resolved` (same order as `unresolved_phrases`).
/// Any candidate left without a category once `resolved` runs out becomes Hard Skills.
pub fn finalize(
    candidates: Vec<RequirementCandidate>,
    resolved: Vec<Category>,
) -> Vec<RequirementItem> {
    let mut resolved = resolved.into_iter();
    candidates
        .into_iter()
        .map(|c| RequirementItem {
            category: c
                .category
                .or_else(|| resolved.next())
                .unwrap_or(Category::HardSkills),
            phrase: c.phrase,
            importance: c.importance,
            order: c.order,
        })
        .collect()
}

// ────────────────────────────────────────────────────────────────────────────
// Internals
// ────────────────────────────────────────────────────────────────────────────

fn looks_like_title(text: &str) -> bool {
    if text.ends_with(['.', '!', '?', ':']) {
        return false;
    }
    let tokens = tokenize(text);
    tokens.len() <= 8
        && tokens
            .iter()
            .any(|t| ROLE_NOUNS.iter().any(|r| t.trim_end_matches('s') == *r))
}

fn section_for_label(label: &str) -> Option<Section> {
    let label = label.trim().trim_end_matches(':').trim().to_lowercase();
    let has = |keys: &[&str]| keys.iter().any(|k| label.contains(k));

    if has(&[
        "nice to have",
        "nice-to-have",
        "preferred",
        "bonus",
        "plus",
        "desired",
        "good to have",
    ]) {
        Some(Section::Preferred)
    } else if has(&[
        "about",
        "benefit",
        "perks",
        "who we are",
        "why join",
        "compensation",
        "salary",
        "equal opportunity",
        "what we offer",
        "location",
    ]) {
        Some(Section::Skip)
    } else if has(&[
        "requirement",
        "qualification",
        "must have",
        "must-have",
        "required",
        "what you need",
        "what you bring",
        "what we're looking for",
        "what we are looking for",
        "who you are",
        "skills",
        "minimum",
    ]) {
        Some(Section::Requirements)
    } else if has(&[
        "responsibilit",
        "what you'll do",
        "what you will do",
        "duties",
        "the role",
        "your role",
        "day to day",
        "day-to-day",
    ]) {
        Some(Section::Responsibilities)
    } else {
        None
    }
}

/// Recognizes "Requirements:", "Nice to have: Kafka", or a line that is only a heading
/// such as "Responsibilities" or "Preferred Qualifications".
/// Returns the section and whatever content follows the heading.
fn split_heading(text: &str) -> Option<(Section, &str)> {
    if let Some((label, rest)) = text.split_once(':') {
        if label.split_whitespace().count() <= MAX_LABEL_WORDS {
            let rest = rest.trim();
            if let Some(section) = section_for_label(label) {
                return Some((section, rest));
            }
            if rest.is_empty() {
                return Some((Section::General, rest));
            }
        }
    }
    if bare_heading().is_match(text.trim()) {
        return section_for_label(text).map(|s| (s, ""));
    }
    None
}

fn inline_level(text: &str) -> Option<RequirementLevel> {
    if preferred_cue().is_match(text) {
        Some(RequirementLevel::Preferred)
    } else if required_cue().is_match(text) {
        Some(RequirementLevel::Required)
    } else {
        None
    }
}

fn strip_lead_in(text: &str) -> &str {
    let lower = text.to_lowercase();
    for lead in LEAD_INS {
        if !lower.starts_with(lead) {
            continue;
        }
        if let Some(rest) = text.get(lead.len()..) {
            if rest.is_empty() || rest.starts_with(|c: char| c.is_whitespace() || c == ':') {
                return rest.trim_start_matches(|c: char| c.is_whitespace() || c == ':');
            }
        }
    }
    text
}

/// Splits a clause into list items: always on `,`/`;`, and on "and"/"or" inside short items.
fn split_clause(text: &str) -> Vec<String> {
    let parts: Vec<&str> = text.split([',', ';']).collect();
    let is_list = parts.len() > 1;
    let mut out = Vec::new();

    for part in parts {
        let part = part.trim();
        let part = strip_leading_word(part, &["and", "or", "as well as", "&"]);
        if part.is_empty() {
            continue;
        }
        if is_list && part.split_whitespace().count() <= MAX_CONJUNCTION_SPLIT_WORDS {
            for piece in split_conjunctions(part) {
                out.push(piece);
            }
        } else {
            out.push(part.to_string());
        }
    }
    out
}

fn split_conjunctions(part: &str) -> Vec<String> {
    let mut pieces = vec![part.to_string()];
    for sep in [" and ", " or ", " & "] {
        pieces = pieces
            .iter()
            .flat_map(|p| p.split(sep).map(str::to_string).collect::<Vec<_>>())
            .collect();
    }
    pieces
        .into_iter()
        .map(|p| p.trim().to_string())
        .filter(|p| !p.is_empty())
        .collect()
}

fn strip_leading_word<'a>(text: &'a str, words: &[&str]) -> &'a str {
    let lower = text.to_lowercase();
    for word in words {
        if !lower.starts_with(word) {
            continue;
        }
        if let Some(rest) = text.get(word.len()..) {
            if rest.starts_with(char::is_whitespace) {
                return rest.trim_start();
            }
        }
    }
    text
}

/// Produces the canonical phrase, or `None` if nothing meaningful is left.
fn normalize_phrase(raw: &str) -> Option<String> {
    let mut phrase = raw.trim().to_string();
    phrase = trailing_level_marker().replace(&phrase, "").into_owned();
    phrase = strip_lead_in(&phrase).to_string();

    let punctuation: &[char] = &['.', ',', ';', ':', '!', '?', '(', ')', '"', '\'', '“', '”'];
    phrase = phrase.trim().trim_matches(punctuation).trim().to_string();

    let lower = phrase.to_lowercase();
    for article in ARTICLES {
        if lower.starts_with(article) {
            if let Some(rest) = phrase.get(article.len()..) {
                phrase = rest.trim_start().to_string();
            }
            break;
        }
    }

    let phrase = phrase.split_whitespace().collect::<Vec<_>>().join(" ");
    if content_tokens(&phrase).is_empty() {
        return None;
    }
    Some(phrase)
}

/// Deduplicates by canonical phrase and assigns importance weights.
fn weigh(
    collected: Vec<(String, RequirementLevel)>,
    lexicons: &Lexicons,
) -> Vec<RequirementCandidate> {
    struct Entry {
        phrase: String,
        level: RequirementLevel,
        mentions: usize,
    }

    let mut index: HashMap<String, usize> = HashMap::new();
    let mut entries: Vec<Entry> = Vec::new();
    for (phrase, level) in collected {
        let key = phrase.to_lowercase();
        match index.get(&key) {
            Some(&i) => {
                let entry = &mut entries[i];
                entry.mentions += 1;
                entry.level = entry.level.max(level);
            }
            None => {
                index.insert(key, entries.len());
                entries.push(Entry {
                    phrase,
                    level,
                    mentions: 1,
                });
            }
        }
    }

    let last = entries.len().saturating_sub(1).max(1) as f32;
    entries
        .into_iter()
        .enumerate()
        .map(|(order, entry)| {
            let position = 1.0 - POSITION_DECAY * (order as f32 / last);
            let repeats = (entry.mentions - 1).min(MAX_REPEAT_BONUS_STEPS) as f32;
            let importance = (entry.level.base_weight() * position * (1.0 + REPEAT_BONUS * repeats))
                .clamp(f32::MIN_POSITIVE, 1.0);
            RequirementCandidate {
                category: classify_phrase(&entry.phrase, lexicons),
                phrase: entry.phrase,
                importance,
                order,
            }
        })
        .collect()
}
