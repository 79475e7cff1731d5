//! Scoring provider — the narrow seam between the engine and any semantic backend.
//!
//! The engine only ever asks two questions: "how well does each of these sentences
//! demonstrate each of these requirements?" and "which category is each of these
//! phrases?". `LlmScoringProvider` answers them through `LlmClient`; tests swap in
//! a scripted stub.
//!
//! Implementations make ONE attempt per call. Retry and lexical fallback are the
//! matcher's job, so a reply of the wrong shape must surface as `LlmError::Malformed`.

use async_trait::async_trait;
use serde::Deserialize;

use crate::analysis::models::Category;
use crate::analysis::prompts::{
    classification_system, render_classification_prompt, render_scoring_prompt, scoring_system,
};
use crate::llm_client::{LlmClient, LlmError};

#[async_trait]
pub trait ScoringProvider: Send + Sync {
    /// One row per sentence, one column per requirement. Values are nominally in [0, 1];
    /// callers clamp anything outside.
    async fn score_batch(
        &self,
        sentences: &[String],
        requirements: &[String],
    ) -> Result<Vec<Vec<f32>>, LlmError>;

    /// One category per phrase, in input order.
    async fn classify_requirements(&self, phrases: &[String]) -> Result<Vec<Category>, LlmError>;

    /// Whether a call could possibly authenticate. Checked once before any call is made.
    fn has_credential(&self) -> bool {
        true
    }
}

#[derive(Debug, Deserialize)]
struct ScoreReply {
    scores: Vec<Vec<f32>>,
}

#[derive(Debug, Deserialize)]
struct ClassificationReply {
    categories: Vec<String>,
}

/// Provider backed by the Messages API.
#[derive(Debug, Clone)]
pub struct LlmScoringProvider {
    client: LlmClient,
}

impl LlmScoringProvider {
    pub fn new(client: LlmClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl ScoringProvider for LlmScoringProvider {
    async fn score_batch(
        &self,
        sentences: &[String],
        requirements: &[String],
    ) -> Result<Vec<Vec<f32>>, LlmError> {
        let prompt = render_scoring_prompt(sentences, requirements);
        let reply: ScoreReply = self.client.call_json(&prompt, &scoring_system()).await?;
        check_score_shape(&reply.scores, sentences.len(), requirements.len())?;
        Ok(reply.scores)
    }

    async fn classify_requirements(&self, phrases: &[String]) -> Result<Vec<Category>, LlmError> {
        let prompt = render_classification_prompt(phrases);
        let reply: ClassificationReply = self
            .client
            .call_json(&prompt, &classification_system())
            .await?;

        if reply.categories.len() != phrases.len() {
            return Err(LlmError::Malformed(format!(
                "expected {} categories, got {}",
                phrases.len(),
                reply.categories.len()
            )));
        }
        reply
            .categories
            .iter()
            .map(|label| {
                Category::from_label(label)
                    .ok_or_else(|| LlmError::Malformed(format!("unknown category {label:?}")))
            })
            .collect()
    }

    fn has_credential(&self) -> bool {
        self.client.has_credential()
    }
}

fn check_score_shape(rows: &[Vec<f32>], sentences: usize, requirements: usize) -> Result<(), LlmError> {
    if rows.len() != sentences {
        return Err(LlmError::Malformed(format!(
            "expected {sentences} score rows, got {}",
            rows.len()
        )));
    }
    if let Some((i, row)) = rows.iter().enumerate().find(|(_, r)| r.len() != requirements) {
        return Err(LlmError::Malformed(format!(
            "score row {i} has {} values, expected {requirements}",
            row.len()
        )));
    }
    Ok(())
}

/// Scripted provider for tests across the analysis module.
#[cfg(test)]
pub mod testing {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::time::Duration;

    use super::*;
    use crate::analysis::text::lexical_overlap;

    type ScoreFn = dyn Fn(&[String], &[String]) -> Result<Vec<Vec<f32>>, LlmError> + Send + Sync;
    type ClassifyFn = dyn Fn(&[String]) -> Result<Vec<Category>, LlmError> + Send + Sync;

    /// Counts concurrent and abandoned `score_batch` calls.
    #[derive(Debug, Default)]
    pub struct CallStats {
        pub score_calls: AtomicUsize,
        pub classify_calls: AtomicUsize,
        pub in_flight: AtomicUsize,
        pub max_in_flight: AtomicUsize,
        /// Calls dropped before they returned.
        pub abandoned: AtomicUsize,
    }

    impl CallStats {
        pub fn score_calls(&self) -> usize {
            self.score_calls.load(Ordering::SeqCst)
        }

        pub fn classify_calls(&self) -> usize {
            self.classify_calls.load(Ordering::SeqCst)
        }

        pub fn max_in_flight(&self) -> usize {
            self.max_in_flight.load(Ordering::SeqCst)
        }

        pub fn abandoned(&self) -> usize {
            self.abandoned.load(Ordering::SeqCst)
        }
    }

    struct InFlight<'a> {
        stats: &'a CallStats,
        finished: bool,
    }

    impl<'a> InFlight<'a> {
        fn enter(stats: &'a CallStats) -> Self {
            let now = stats.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            stats.max_in_flight.fetch_max(now, Ordering::SeqCst);
            Self {
                stats,
                finished: false,
            }
        }
    }

    impl Drop for InFlight<'_> {
        fn drop(&mut self) {
            self.stats.in_flight.fetch_sub(1, Ordering::SeqCst);
            if !self.finished {
                self.stats.abandoned.fetch_add(1, Ordering::SeqCst);
            }
        }
    }

    pub struct ScriptedProvider {
        score: Box<ScoreFn>,
        classify: Box<ClassifyFn>,
        delay: Option<Duration>,
        credential: bool,
        pub stats: Arc<CallStats>,
    }

    impl ScriptedProvider {
        pub fn new<F>(score: F) -> Self
        where
            F: Fn(&[String], &[String]) -> Result<Vec<Vec<f32>>, LlmError> + Send + Sync + 'static,
        {
            Self {
                score: Box::new(score),
                classify: Box::new(|phrases: &[String]| Ok(vec![Category::HardSkills; phrases.len()])),
                delay: None,
                credential: true,
                stats: Arc::new(CallStats::default()),
            }
        }

        /// Scores every cell with the same value.
        pub fn constant(value: f32) -> Self {
            Self::new(move |s, r| Ok(vec![vec![value; r.len()]; s.len()]))
        }

        /// Scores by token overlap, so paraphrase-free fixtures behave predictably.
        pub fn lexical() -> Self {
            Self::new(|sentences, requirements| {
                Ok(sentences
                    .iter()
                    .map(|s| requirements.iter().map(|r| lexical_overlap(s, r)).collect())
                    .collect())
            })
        }

        /// Every call fails with the error `make` builds.
        pub fn failing<F>(make: F) -> Self
        where
            F: Fn() -> LlmError + Send + Sync + 'static,
        {
            Self::new(move |_, _| Err(make()))
        }

        pub fn with_classifier<F>(mut self, classify: F) -> Self
        where
            F: Fn(&[String]) -> Result<Vec<Category>, LlmError> + Send + Sync + 'static,
        {
            self.classify = Box::new(classify);
            self
        }

        pub fn with_delay(mut self, delay: Duration) -> Self {
            self.delay = Some(delay);
            self
        }

        pub fn without_credential(mut self) -> Self {
            self.credential = false;
            self
        }
    }

    #[async_trait]
    impl ScoringProvider for ScriptedProvider {
        async fn score_batch(
            &self,
            sentences: &[String],
            requirements: &[String],
        ) -> Result<Vec<Vec<f32>>, LlmError> {
            self.stats.score_calls.fetch_add(1, Ordering::SeqCst);
            let mut guard = InFlight::enter(&self.stats);
            if let Some(delay) = self.delay {
                tokio::time::sleep(delay).await;
            }
            let result = (self.score)(sentences, requirements);
            guard.finished = true;
            result
        }

        async fn classify_requirements(
            &self,
            phrases: &[String],
        ) -> Result<Vec<Category>, LlmError> {
            self.stats.classify_calls.fetch_add(1, Ordering::SeqCst);
            (self.classify)(phrases)
        }

        fn has_credential(&self) -> bool {
            self.credential
        }
    }
}
