//! Lexicons — buzzwords, action verbs, abbreviations and category cue phrases.
//!
//! These are configuration data, not algorithm. Built-in defaults can be overridden
//! field-by-field from a JSON file (`LEXICON_PATH`). Once compiled, a `Lexicons` value
//! is immutable and shared read-only across concurrent runs behind an `Arc`.

use std::collections::HashSet;
use std::path::Path;

use anyhow::{Context, Result};
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::analysis::models::Category;
use crate::analysis::text::{contains_sequence, tokenize};

// ────────────────────────────────────────────────────────────────────────────
// Raw (serializable) lexicon data
// ────────────────────────────────────────────────────────────────────────────

/// Lexicon file contents. Any field left out keeps its built-in default.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LexiconData {
    pub buzzwords: Vec<String>,
    pub action_verbs: Vec<String>,
    /// Lowercase, without the trailing period: "inc", "b.s", "ph.d".
    pub abbreviations: Vec<String>,
    pub category_cues: CategoryCueData,
}

/// Seed phrases that suggest a requirement's category.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CategoryCueData {
    pub hard_skills: Vec<String>,
    pub soft_skills: Vec<String>,
    pub experience: Vec<String>,
    pub education: Vec<String>,
}

fn owned(words: &[&str]) -> Vec<String> {
    words.iter().map(|w| w.to_string()).collect()
}

impl Default for LexiconData {
    fn default() -> Self {
        Self {
            buzzwords: owned(&[
                "synergy",
                "hardworking",
                "hard-working",
                "motivated",
                "team player",
                "detail-oriented",
                "proactive",
                "passionate",
                "driven",
                "self-starter",
                "go-getter",
                "results-oriented",
                "think outside the box",
            ]),
            action_verbs: owned(&[
                "led",
                "built",
                "engineered",
                "developed",
                "managed",
                "created",
                "designed",
                "implemented",
                "orchestrated",
                "spearheaded",
                "executed",
                "launched",
                "architected",
                "delivered",
                "drove",
                "improved",
                "increased",
                "reduced",
                "optimized",
                "automated",
                "established",
                "founded",
                "mentored",
                "coordinated",
                "streamlined",
                "shipped",
                "migrated",
                "scaled",
                "owned",
                "analyzed",
                "negotiated",
                "achieved",
                "initiated",
                "resolved",
                "deployed",
                "authored",
                "published",
            ]),
            abbreviations: owned(&[
                "inc", "ltd", "co", "corp", "llc", "jr", "sr", "dr", "mr", "mrs", "ms", "prof",
                "st", "vs", "etc", "e.g", "i.e", "approx", "dept", "univ", "no", "b.s", "b.a",
                "m.s", "m.a", "ph.d", "m.b.a", "b.sc", "m.sc", "b.tech", "m.tech", "u.s", "u.k",
                "jan", "feb", "mar", "apr", "jun", "jul", "aug", "sep", "sept", "oct", "nov",
                "dec",
            ]),
            category_cues: CategoryCueData::default(),
        }
    }
}

impl Default for CategoryCueData {
    fn default() -> Self {
        Self {
            hard_skills: owned(&[
                "programming",
                "software",
                "coding",
                "python",
                "java",
                "javascript",
                "typescript",
                "rust",
                "golang",
                "c++",
                "c#",
                "scala",
                "kotlin",
                "swift",
                "ruby",
                "php",
                "sql",
                "nosql",
                "postgresql",
                "mysql",
                "mongodb",
                "redis",
                "kafka",
                "spark",
                "hadoop",
                "aws",
                "azure",
                "gcp",
                "cloud",
                "docker",
                "kubernetes",
                "terraform",
                "linux",
                "git",
                "ci/cd",
                "react",
                "angular",
                "vue",
                "node.js",
                "django",
                "flask",
                "spring boot",
                "graphql",
                "rest",
                "api",
                "microservices",
                "distributed systems",
                "systems programming",
                "machine learning",
                "deep learning",
                "pytorch",
                "tensorflow",
                "nlp",
                "computer vision",
                "data analysis",
                "statistics",
                "excel",
                "tableau",
                "html",
                "css",
                "security",
                "networking",
                "devops",
                "testing",
                "algorithms",
                "data structures",
                "backend",
                "frontend",
                "database",
                "embedded",
                "android",
                "ios",
                "etl",
                "infrastructure",
            ]),
            soft_skills: owned(&[
                "communication",
                "teamwork",
                "team player",
                "team",
                "collaboration",
                "leadership",
                "problem solving",
                "interpersonal",
                "adaptability",
                "creativity",
                "critical thinking",
                "time management",
                "mentoring",
                "ownership",
                "self-motivated",
                "presentation",
                "stakeholders",
                "empathy",
                "organized",
                "attention to detail",
                "work independently",
                "negotiation",
                "written",
                "verbal",
            ]),
            experience: owned(&[
                "experience",
                "years",
                "track record",
                "background",
                "senior",
                "seniority",
                "hands-on",
                "industry",
                "history of",
                "previous role",
            ]),
            education: owned(&[
                "degree",
                "bachelor",
                "master",
                "phd",
                "ph.d",
                "doctorate",
                "b.s",
                "m.s",
                "b.a",
                "bsc",
                "msc",
                "mba",
                "diploma",
                "university",
                "college",
                "graduate",
                "certification",
                "certified",
                "certificate",
                "coursework",
                "gpa",
            ]),
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Compiled lexicons
// ────────────────────────────────────────────────────────────────────────────

/// Compiled, immutable lexicons handed to the segmenter, extractor and metrics calculator.
#[derive(Debug, Clone)]
pub struct Lexicons {
    buzzword_pattern: Option<Regex>,
    action_verbs: HashSet<String>,
    abbreviations: HashSet<String>,
    /// Per category, each cue phrase as a token sequence.
    cues: Vec<(Category, Vec<Vec<String>>)>,
}

impl Default for Lexicons {
    fn default() -> Self {
        Self::compile(LexiconData::default()).expect("built-in lexicons must compile")
    }
}

impl Lexicons {
    pub fn compile(data: LexiconData) -> Result<Self> {
        let terms: Vec<String> = data
            .buzzwords
            .iter()
            .map(|b| b.trim())
            .filter(|b| !b.is_empty())
            .map(|b| regex::escape(&b.to_lowercase()))
            .collect();
        let buzzword_pattern = if terms.is_empty() {
            None
        } else {
            let pattern = format!(r"(?i)\b(?:{})\b", terms.join("|"));
            Some(Regex::new(&pattern).context("failed to compile buzzword pattern")?)
        };

        let normalize = |words: &[String]| -> HashSet<String> {
            words
                .iter()
                .map(|w| w.trim().trim_end_matches('.').to_lowercase())
                .filter(|w| !w.is_empty())
                .collect()
        };

        let cue_tokens = |phrases: &[String]| -> Vec<Vec<String>> {
            phrases
                .iter()
                .map(|p| tokenize(p))
                .filter(|t| !t.is_empty())
                .collect()
        };

        let cues = vec![
            (Category::HardSkills, cue_tokens(&data.category_cues.hard_skills)),
            (Category::SoftSkills, cue_tokens(&data.category_cues.soft_skills)),
            (Category::Experience, cue_tokens(&data.category_cues.experience)),
            (Category::Education, cue_tokens(&data.category_cues.education)),
        ];

        Ok(Self {
            buzzword_pattern,
            action_verbs: normalize(&data.action_verbs),
            abbreviations: normalize(&data.abbreviations),
            cues,
        })
    }

    /// Loads lexicons from `path` when given, otherwise uses the built-in defaults.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let data = match path {
            Some(path) => {
                let raw = std::fs::read_to_string(path)
                    .with_context(|| format!("failed to read lexicon file {}", path.display()))?;
                serde_json::from_str::<LexiconData>(&raw)
                    .with_context(|| format!("failed to parse lexicon file {}", path.display()))?
            }
            None => LexiconData::default(),
        };
        Self::compile(data)
    }

    /// Case-insensitive, word-boundary occurrences of any buzzword in `text`.
    pub fn count_buzzwords(&self, text: &str) -> usize {
        self.buzzword_pattern
            .as_ref()
            .map(|re| re.find_iter(text).count())
            .unwrap_or(0)
    }

    pub fn is_action_verb(&self, token: &str) -> bool {
        self.action_verbs.contains(&token.to_lowercase())
    }

    /// `word` is the token before a period, without the period itself.
    pub fn is_abbreviation(&self, word: &str) -> bool {
        self.abbreviations.contains(&word.to_lowercase())
    }

    /// Number of distinct cue phrases of each category found in `tokens`,
    /// indexed in `Category::ALL` order.
    pub fn cue_hits(&self, tokens: &[String]) -> [usize; 4] {
        let mut hits = [0usize; 4];
        for (category, phrases) in &self.cues {
            let slot = Category::ALL
                .iter()
                .position(|c| c == category)
                .unwrap_or_default();
            hits[slot] = phrases
                .iter()
                .filter(|cue| contains_sequence(tokens, cue))
                .count();
        }
        hits
    }
}
