//! Semantic Matcher — fills the sentence × requirement similarity matrix.
//!
//! The matrix is cut into rectangular blocks of at most `batch_sentences` ×
//! `batch_requirements` cells. Each block is one provider call (with retry), and
//! at most `max_concurrent_batches` calls are in flight at once. Blocks are
//! disjoint, so completion order never changes the result.
//!
//! When a block's reply is unusable and `lexical_fallback` is on, that block is
//! scored by token overlap instead and the run is reported as degraded.

use std::ops::Range;

use futures::stream::{self, StreamExt, TryStreamExt};
use tracing::{debug, info, warn};

use crate::analysis::models::{BatchScores, Category, MatchMatrix, RequirementItem, Sentence};
use crate::analysis::provider::ScoringProvider;
use crate::analysis::text::lexical_overlap;
use crate::config::EngineConfig;
use crate::errors::AnalysisError;
use crate::llm_client::retry::retry_with_backoff;

/// One provider call's slice of the matrix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockPlan {
    pub sentences: Range<usize>,
    pub requirements: Range<usize>,
}

/// Filled matrix plus how many blocks had to fall back to lexical scoring.
#[derive(Debug, Clone)]
pub struct MatchOutcome {
    pub matrix: MatchMatrix,
    pub fallback_batches: usize,
}

/// Provider categories for unresolved requirements.
#[derive(Debug, Clone, PartialEq)]
pub struct Classification {
    pub categories: Vec<Category>,
    /// The provider reply was unusable and every phrase defaulted to Hard Skills.
    pub fallback: bool,
}

struct ScoredBlock {
    scores: BatchScores,
    fallback: bool,
}

/// Tiles an `sentences` × `requirements` matrix with blocks no larger than the batch limits.
/// Every cell is covered by exactly one block.
pub fn plan_batches(
    sentences: usize,
    requirements: usize,
    batch_sentences: usize,
    batch_requirements: usize,
) -> Vec<BlockPlan> {
    let step_s = batch_sentences.max(1);
    let step_r = batch_requirements.max(1);
    let mut plan = Vec::new();
    for s in (0..sentences).step_by(step_s) {
        for r in (0..requirements).step_by(step_r) {
            plan.push(BlockPlan {
                sentences: s..(s + step_s).min(sentences),
                requirements: r..(r + step_r).min(requirements),
            });
        }
    }
    plan
}

pub struct SemanticMatcher<'a> {
    provider: &'a dyn ScoringProvider,
    config: &'a EngineConfig,
}

impl<'a> SemanticMatcher<'a> {
    pub fn new(provider: &'a dyn ScoringProvider, config: &'a EngineConfig) -> Self {
        Self { provider, config }
    }

    /// Scores every sentence against every requirement.
    ///
    /// The first block that fails for good aborts the whole match; blocks still
    /// in flight are dropped with it.
    pub async fn score(
        &self,
        sentences: &[Sentence],
        requirements: &[RequirementItem],
    ) -> Result<MatchOutcome, AnalysisError> {
        let sentence_texts: Vec<String> = sentences.iter().map(|s| s.text.clone()).collect();
        let requirement_texts: Vec<String> =
            requirements.iter().map(|r| r.phrase.clone()).collect();

        let mut matrix = MatchMatrix::new(sentence_texts.len(), requirement_texts.len());
        let plan = plan_batches(
            sentence_texts.len(),
            requirement_texts.len(),
            self.config.batch_sentences,
            self.config.batch_requirements,
        );
        if plan.is_empty() {
            return Ok(MatchOutcome {
                matrix,
                fallback_batches: 0,
            });
        }

        info!(
            "Scoring {}x{} matrix in {} batches (max {} concurrent)",
            sentence_texts.len(),
            requirement_texts.len(),
            plan.len(),
            self.config.max_concurrent_batches
        );

        let blocks: Vec<ScoredBlock> = stream::iter(plan)
            .map(|block| self.score_block(&sentence_texts, &requirement_texts, block))
            .buffer_unordered(self.config.max_concurrent_batches.max(1))
            .try_collect()
            .await?;

        let mut fallback_batches = 0;
        for block in &blocks {
            matrix.fill(&block.scores);
            if block.fallback {
                fallback_batches += 1;
            }
        }

        Ok(MatchOutcome {
            matrix,
            fallback_batches,
        })
    }

    async fn score_block(
        &self,
        sentences: &[String],
        requirements: &[String],
        block: BlockPlan,
    ) -> Result<ScoredBlock, AnalysisError> {
        let batch_sentences = &sentences[block.sentences.clone()];
        let batch_requirements = &requirements[block.requirements.clone()];

        let result = retry_with_backoff(&self.config.retry, "score_batch", || {
            self.provider.score_batch(batch_sentences, batch_requirements)
        })
        .await;

        let (rows, fallback) = match result {
            Ok(rows) => (clamp_scores(rows, &block), false),
            Err(err) if err.is_parse_failure() && self.config.lexical_fallback => {
                warn!(
                    "Batch s{:?} r{:?} unusable ({}), falling back to lexical overlap",
                    block.sentences, block.requirements, err
                );
                (lexical_rows(batch_sentences, batch_requirements), true)
            }
            Err(err) => return Err(err.into()),
        };

        debug!("Batch s{:?} r{:?} scored", block.sentences, block.requirements);

        Ok(ScoredBlock {
            scores: BatchScores {
                sentences: block.sentences,
                requirements: block.requirements,
                rows,
            },
            fallback,
        })
    }

    /// Asks the provider to categorize phrases no lexical cue could place.
    pub async fn classify(&self, phrases: &[String]) -> Result<Classification, AnalysisError> {
        if phrases.is_empty() {
            return Ok(Classification {
                categories: Vec::new(),
                fallback: false,
            });
        }

        let result = retry_with_backoff(&self.config.retry, "classify_requirements", || {
            self.provider.classify_requirements(phrases)
        })
        .await;

        match result {
            Ok(categories) => Ok(Classification {
                categories,
                fallback: false,
            }),
            Err(err) if err.is_parse_failure() && self.config.lexical_fallback => {
                warn!(
                    "Classification reply unusable ({}), defaulting {} requirements to Hard Skills",
                    err,
                    phrases.len()
                );
                Ok(Classification {
                    categories: vec![Category::HardSkills; phrases.len()],
                    fallback: true,
                })
            }
            Err(err) => Err(err.into()),
        }
    }
}

/// Forces every value into [0, 1]. Infinities clamp by sign; NaN becomes 0.
fn clamp_scores(mut rows: Vec<Vec<f32>>, block: &BlockPlan) -> Vec<Vec<f32>> {
    let mut adjusted = 0usize;
    for value in rows.iter_mut().flatten() {
        let clamped = if value.is_nan() {
            0.0
        } else {
            (*value).clamp(0.0, 1.0)
        };
        if !value.is_finite() || clamped != *value {
            adjusted += 1;
            *value = clamped;
        }
    }
    if adjusted > 0 {
        warn!(
            "Batch s{:?} r{:?}: clamped {} out-of-range scores",
            block.sentences, block.requirements, adjusted
        );
    }
    rows
}

fn lexical_rows(sentences: &[String], requirements: &[String]) -> Vec<Vec<f32>> {
    sentences
        .iter()
        .map(|s| requirements.iter().map(|r| lexical_overlap(s, r)).collect())
        .collect()
}
