//! Value types shared by every stage of an analysis run.

use std::ops::Range;

use serde::{Deserialize, Serialize};

use crate::analysis::lexicon::Lexicons;
use crate::analysis::segmenter::segment;
use crate::errors::AnalysisError;

// ────────────────────────────────────────────────────────────────────────────
// Categories
// ────────────────────────────────────────────────────────────────────────────

/// The four requirement categories. Every requirement belongs to exactly one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Category {
    #[serde(rename = "Hard Skills")]
    HardSkills,
    #[serde(rename = "Soft Skills")]
    SoftSkills,
    Experience,
    Education,
}

impl Category {
    pub const ALL: [Category; 4] = [
        Category::HardSkills,
        Category::SoftSkills,
        Category::Experience,
        Category::Education,
    ];

    /// Lenient label parsing for provider output: "Hard Skills", "hard_skills", "HardSkills".
    pub fn from_label(raw: &str) -> Option<Self> {
        let key: String = raw
            .chars()
            .filter(|c| c.is_ascii_alphanumeric())
            .collect::<String>()
            .to_ascii_lowercase();
        match key.as_str() {
            "hardskills" | "hardskill" | "technical" | "technicalskills" => {
                Some(Category::HardSkills)
            }
            "softskills" | "softskill" => Some(Category::SoftSkills),
            "experience" => Some(Category::Experience),
            "education" => Some(Category::Education),
            _ => None,
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Resume side
// ────────────────────────────────────────────────────────────────────────────

/// One segmented sentence. `index` is its 0-based position in the document
/// and is carried unchanged into the heatmap.
#[derive(Debug, Clone, PartialEq)]
pub struct Sentence {
    pub index: usize,
    pub text: String,
    /// Came from a bulleted or numbered line.
    pub list_item: bool,
}

/// Resume text plus its segmentation. Owned by exactly one analysis run.
#[derive(Debug, Clone)]
pub struct ResumeDocument {
    text: String,
    sentences: Vec<Sentence>,
}

impl ResumeDocument {
    /// Segments `text`. Fails with `Validation` on empty or whitespace-only input.
    pub fn parse(text: &str, lexicons: &Lexicons) -> Result<Self, AnalysisError> {
        let sentences = segment(text, lexicons)
            .map_err(|_| AnalysisError::Validation("resume_text cannot be empty".to_string()))?;
        Ok(Self {
            text: text.to_string(),
            sentences,
        })
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn sentences(&self) -> &[Sentence] {
        &self.sentences
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Job description side
// ────────────────────────────────────────────────────────────────────────────

/// A single categorized, weighted need extracted from the job description.
#[derive(Debug, Clone, PartialEq)]
pub struct RequirementItem {
    /// Canonical phrase; also the dedup key (case-insensitive).
    pub phrase: String,
    pub category: Category,
    /// In (0, 1]. Explicitly required ≥ implied ≥ nice-to-have.
    pub importance: f32,
    /// Extraction order, used as the tie-break when importances are equal.
    pub order: usize,
}

// ────────────────────────────────────────────────────────────────────────────
// Score matrix
// ────────────────────────────────────────────────────────────────────────────

/// Dense sentence × requirement similarity matrix, every cell in [0, 1].
#[derive(Debug, Clone, PartialEq)]
pub struct MatchMatrix {
    sentences: usize,
    requirements: usize,
    cells: Vec<f32>,
}

/// Scores for one rectangular block of the matrix, as produced by one provider batch.
#[derive(Debug, Clone, PartialEq)]
pub struct BatchScores {
    pub sentences: Range<usize>,
    pub requirements: Range<usize>,
    /// One row per sentence in `sentences`, one column per requirement in `requirements`.
    pub rows: Vec<Vec<f32>>,
}

impl MatchMatrix {
    pub fn new(sentences: usize, requirements: usize) -> Self {
        Self {
            sentences,
            requirements,
            cells: vec![0.0; sentences * requirements],
        }
    }

    #[cfg(test)]
    pub fn from_rows(rows: Vec<Vec<f32>>) -> Self {
        let sentences = rows.len();
        let requirements = rows.first().map(Vec::len).unwrap_or(0);
        let mut matrix = Self::new(sentences, requirements);
        matrix.fill(&BatchScores {
            sentences: 0..sentences,
            requirements: 0..requirements,
            rows,
        });
        matrix
    }

    pub fn get(&self, sentence: usize, requirement: usize) -> f32 {
        self.cells[sentence * self.requirements + requirement]
    }

    /// Writes one batch's block. Batches cover disjoint blocks, so order is irrelevant.
    pub fn fill(&mut self, batch: &BatchScores) {
        for (row, sentence) in batch.rows.iter().zip(batch.sentences.clone()) {
            for (value, requirement) in row.iter().zip(batch.requirements.clone()) {
                self.cells[sentence * self.requirements + requirement] = *value;
            }
        }
    }

    /// Heatmap projection: best score of each sentence over all requirements.
    pub fn best_per_sentence(&self) -> Vec<f32> {
        (0..self.sentences)
            .map(|s| {
                (0..self.requirements)
                    .map(|r| self.get(s, r))
                    .fold(0.0, f32::max)
            })
            .collect()
    }

    /// Coverage projection: best score of each requirement over all sentences.
    pub fn best_per_requirement(&self) -> Vec<f32> {
        (0..self.requirements)
            .map(|r| {
                (0..self.sentences)
                    .map(|s| self.get(s, r))
                    .fold(0.0, f32::max)
            })
            .collect()
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Result
// ────────────────────────────────────────────────────────────────────────────

/// Category → value in [0, 100]. Serialized with the human category names as keys.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CategorySubScores {
    #[serde(rename = "Hard Skills")]
    pub hard_skills: f32,
    #[serde(rename = "Soft Skills")]
    pub soft_skills: f32,
    #[serde(rename = "Experience")]
    pub experience: f32,
    #[serde(rename = "Education")]
    pub education: f32,
}

impl CategorySubScores {
    pub fn get(&self, category: Category) -> f32 {
        match category {
            Category::HardSkills => self.hard_skills,
            Category::SoftSkills => self.soft_skills,
            Category::Experience => self.experience,
            Category::Education => self.education,
        }
    }

    pub fn set(&mut self, category: Category, value: f32) {
        match category {
            Category::HardSkills => self.hard_skills = value,
            Category::SoftSkills => self.soft_skills = value,
            Category::Experience => self.experience = value,
            Category::Education => self.education = value,
        }
    }
}

/// Deterministic document-quality statistics, independent of the job description.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecruiterMetrics {
    pub reading_time: String,
    pub buzzword_count: u32,
    pub action_verb_count: u32,
}

/// Whether every batch was scored by the provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ResultQuality {
    #[default]
    Full,
    /// Some batches (or the requirement classification) used the lexical fallback.
    Degraded { fallback_batches: usize },
}

/// Final fit assessment. Serializes to exactly the five transport fields.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalysisResult {
    pub score: u32,
    pub sub_scores: CategorySubScores,
    pub missing_skills: Vec<String>,
    /// `[sentence text, best similarity]`, one per resume sentence, in document order.
    pub sentence_scores: Vec<(String, f32)>,
    pub recruiter_metrics: RecruiterMetrics,
    #[serde(skip)]
    pub quality: ResultQuality,
}
