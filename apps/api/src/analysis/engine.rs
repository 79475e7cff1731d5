//! Analysis Engine — runs one resume/JD pair through the whole pipeline.
//!
//! segment → extract → classify → match → aggregate / missing skills / metrics
//!
//! Every run gets its own `run_id` span. Runs share nothing mutable: the lexicons are
//! read-only behind an `Arc` and every matrix, document and requirement list is owned
//! by the run that built it, so concurrent runs cannot observe each other.
//!
//! The whole run is bounded by `analysis_deadline`. Dropping the returned future (or
//! firing the cancel signal passed to `analyze_until`) drops every in-flight provider
//! call with it.

use std::future::Future;
use std::sync::Arc;

use tracing::{info, info_span, warn, Instrument};
use uuid::Uuid;

use crate::analysis::aggregation::{category_sub_scores, overall_score};
use crate::analysis::lexicon::Lexicons;
use crate::analysis::matcher::SemanticMatcher;
use crate::analysis::missing_skills::detect_missing;
use crate::analysis::models::{AnalysisResult, ResultQuality, ResumeDocument};
use crate::analysis::provider::ScoringProvider;
use crate::analysis::recruiter_metrics;
use crate::analysis::requirements::{extract_candidates, finalize, unresolved_phrases};
use crate::config::EngineConfig;
use crate::errors::{AnalysisError, UpstreamCause};
use crate::llm_client::retry::RetryPolicy;

/// The two texts one analysis compares.
#[derive(Debug, Clone)]
pub struct AnalysisInput {
    pub resume_text: String,
    pub jd_text: String,
}

#[derive(Debug, Clone)]
pub struct Engine {
    config: EngineConfig,
    lexicons: Arc<Lexicons>,
}

impl Engine {
    pub fn new(config: EngineConfig, lexicons: Arc<Lexicons>) -> Self {
        Self { config, lexicons }
    }

    /// Retry budget shared with the other provider-backed endpoints.
    pub fn retry_policy(&self) -> RetryPolicy {
        self.config.retry
    }

    /// Analyzes `input`, scoring through `provider`.
    pub async fn analyze(
        &self,
        input: &AnalysisInput,
        provider: &dyn ScoringProvider,
    ) -> Result<AnalysisResult, AnalysisError> {
        let run_id = Uuid::new_v4();
        let deadline = self.config.analysis_deadline;

        async move {
            match tokio::time::timeout(deadline, self.run(input, provider)).await {
                Ok(result) => result,
                Err(_) => {
                    warn!("Analysis exceeded deadline of {}ms", deadline.as_millis());
                    Err(AnalysisError::upstream(
                        UpstreamCause::DeadlineExceeded,
                        format!("analysis exceeded {}ms", deadline.as_millis()),
                    ))
                }
            }
        }
        .instrument(info_span!("analysis", %run_id))
        .await
    }

    /// Like `analyze`, but gives up with `Cancelled` as soon as `cancel` completes.
    pub async fn analyze_until<C>(
        &self,
        input: &AnalysisInput,
        provider: &dyn ScoringProvider,
        cancel: C,
    ) -> Result<AnalysisResult, AnalysisError>
    where
        C: Future<Output = ()>,
    {
        tokio::select! {
            result = self.analyze(input, provider) => result,
            _ = cancel => {
                info!("Analysis cancelled by caller");
                Err(AnalysisError::Cancelled)
            }
        }
    }

    async fn run(
        &self,
        input: &AnalysisInput,
        provider: &dyn ScoringProvider,
    ) -> Result<AnalysisResult, AnalysisError> {
        let resume = ResumeDocument::parse(&input.resume_text, &self.lexicons)?;
        let candidates = extract_candidates(&input.jd_text, &self.lexicons)?;
        info!(
            "Segmented {} resume sentences, extracted {} requirements",
            resume.sentences().len(),
            candidates.len()
        );

        if !provider.has_credential() {
            return Err(AnalysisError::MissingCredential);
        }

        let matcher = SemanticMatcher::new(provider, &self.config);

        let unresolved = unresolved_phrases(&candidates);
        let classification = matcher.classify(&unresolved).await?;
        if !unresolved.is_empty() {
            info!("Provider classified {} requirements", unresolved.len());
        }
        let requirements = finalize(candidates, classification.categories);

        let outcome = matcher.score(resume.sentences(), &requirements).await?;

        let sub_scores = category_sub_scores(&outcome.matrix, &requirements);
        let score = overall_score(&sub_scores, &self.config.category_weights);
        let missing_skills = detect_missing(
            &outcome.matrix,
            &requirements,
            self.config.coverage_threshold,
        );
        let sentence_scores = resume
            .sentences()
            .iter()
            .zip(outcome.matrix.best_per_sentence())
            .map(|(sentence, best)| (sentence.text.clone(), best))
            .collect();
        let recruiter_metrics =
            recruiter_metrics::compute(&resume, &self.lexicons, self.config.words_per_minute);

        let fallback_batches = outcome.fallback_batches + usize::from(classification.fallback);
        let quality = if fallback_batches > 0 {
            warn!("Result degraded: {} fallback batches", fallback_batches);
            ResultQuality::Degraded { fallback_batches }
        } else {
            ResultQuality::Full
        };

        info!(
            "Analysis complete: score={}, missing_skills={}",
            score,
            missing_skills.len()
        );

        Ok(AnalysisResult {
            score,
            sub_scores,
            missing_skills,
            sentence_scores,
            recruiter_metrics,
            quality,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use crate::analysis::models::Category;
    use crate::analysis::provider::testing::ScriptedProvider;
    use crate::errors::ErrorKind;
    use crate::llm_client::LlmError;

    const STARTUP_JD: &str = "Senior Rust Engineer — Core Infrastructure\n\
        Requirements: 5+ years Rust required, systems programming required, distributed systems expertise required.\n\
        Nice to have: Kubernetes, Kafka experience a plus.\n\
        About Us: Fast-paced Series B startup disrupting fintech infrastructure.";

    const RUST_RESUME: &str = "Senior Engineer with 6 years of Rust experience.\n\
        • Built distributed systems handling 1M requests per second.\n\
        • Led systems programming work on a custom allocator.\n\
        • Deployed services on Kubernetes.";

    fn engine() -> Engine {
        Engine::new(EngineConfig::default(), Arc::new(Lexicons::default()))
    }

    fn input(resume: &str, jd: &str) -> AnalysisInput {
        AnalysisInput {
            resume_text: resume.to_string(),
            jd_text: jd.to_string(),
        }
    }

    #[tokio::test]
    async fn test_full_coverage_scores_one_hundred() {
        let provider = ScriptedProvider::constant(1.0);
        let result = engine()
            .analyze(&input(RUST_RESUME, STARTUP_JD), &provider)
            .await
            .unwrap();

        assert_eq!(result.score, 100);
        assert!(result.missing_skills.is_empty());
        assert_eq!(result.sentence_scores.len(), 4);
        assert!(result.sentence_scores.iter().all(|(_, s)| *s == 1.0));
        assert_eq!(result.quality, ResultQuality::Full);
    }

    #[tokio::test]
    async fn test_strong_match_ranks_above_weak_match() {
        let provider = ScriptedProvider::lexical();
        let strong = engine()
            .analyze(&input(RUST_RESUME, STARTUP_JD), &provider)
            .await
            .unwrap();
        let weak = engine()
            .analyze(
                &input("Managed retail inventory.\nTrained new cashiers.", STARTUP_JD),
                &provider,
            )
            .await
            .unwrap();

        assert!(strong.score > weak.score, "{} <= {}", strong.score, weak.score);
        assert!(weak.missing_skills.contains(&"5+ years Rust".to_string()));
        assert!(!strong.missing_skills.contains(&"systems programming".to_string()));
    }

    #[tokio::test]
    async fn test_team_player_half_covered_is_not_missing() {
        let provider = ScriptedProvider::lexical();
        let result = engine()
            .analyze(
                &input("Led a team of 5 engineers.", "We need a team player."),
                &provider,
            )
            .await
            .unwrap();

        assert_eq!(
            result.sentence_scores,
            vec![("Led a team of 5 engineers.".to_string(), 0.5)]
        );
        assert!(result.missing_skills.is_empty());
        assert!((result.sub_scores.soft_skills - 50.0).abs() < 1e-3);
        assert_eq!(result.sub_scores.hard_skills, 100.0);
        assert_eq!(result.score, 88);
        assert_eq!(result.recruiter_metrics.action_verb_count, 1);
    }

    #[tokio::test]
    async fn test_nothing_covered_lists_every_requirement_by_importance() {
        let provider = ScriptedProvider::constant(0.0);
        let result = engine()
            .analyze(
                &input(
                    "Managed retail inventory.",
                    "Required: SQL.\nNice to have: Tableau.\nResponsibilities: build dashboards.",
                ),
                &provider,
            )
            .await
            .unwrap();

        assert_eq!(
            result.missing_skills,
            vec!["SQL", "build dashboards", "Tableau"]
        );
        assert_eq!(result.sentence_scores[0].1, 0.0);
    }

    #[tokio::test]
    async fn test_unresolved_requirements_are_classified_by_provider() {
        let provider = ScriptedProvider::constant(0.0)
            .with_classifier(|p| Ok(vec![Category::Experience; p.len()]));
        let result = engine()
            .analyze(
                &input("Managed retail inventory.", "Define the product roadmap."),
                &provider,
            )
            .await
            .unwrap();

        assert_eq!(provider.stats.classify_calls(), 1);
        assert_eq!(result.sub_scores.experience, 0.0);
        assert_eq!(result.sub_scores.hard_skills, 100.0);
        assert_eq!(result.score, 75);
    }

    #[tokio::test]
    async fn test_malformed_replies_degrade_but_complete() {
        let provider = ScriptedProvider::failing(|| LlmError::Malformed("prose".into()));
        let result = engine()
            .analyze(
                &input("Led a team of 5 engineers.", "We need a team player."),
                &provider,
            )
            .await
            .unwrap();

        assert_eq!(
            result.quality,
            ResultQuality::Degraded { fallback_batches: 1 }
        );
        assert_eq!(result.sentence_scores[0].1, 0.5);
    }

    #[tokio::test]
    async fn test_malformed_replies_fail_without_fallback() {
        let provider = ScriptedProvider::failing(|| LlmError::Malformed("prose".into()));
        let engine = Engine::new(
            EngineConfig {
                lexical_fallback: false,
                ..EngineConfig::default()
            },
            Arc::new(Lexicons::default()),
        );
        let err = engine
            .analyze(&input("Led a team.", "We need a team player."), &provider)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            AnalysisError::Upstream {
                cause: UpstreamCause::MalformedResponse,
                ..
            }
        ));
    }

    #[tokio::test]
    async fn test_empty_inputs_fail_before_any_call() {
        let provider = ScriptedProvider::constant(1.0);
        let err = engine()
            .analyze(&input("   ", STARTUP_JD), &provider)
            .await
            .unwrap_err();
        assert!(matches!(err, AnalysisError::Validation(_)));

        let err = engine()
            .analyze(&input(RUST_RESUME, ""), &provider)
            .await
            .unwrap_err();
        assert!(matches!(err, AnalysisError::Validation(_)));
        assert_eq!(provider.stats.score_calls(), 0);
    }

    #[tokio::test]
    async fn test_jd_without_requirements_is_extraction_error() {
        let provider = ScriptedProvider::constant(1.0);
        let err = engine()
            .analyze(&input(RUST_RESUME, "About us: a fintech company."), &provider)
            .await
            .unwrap_err();
        assert!(matches!(err, AnalysisError::Extraction(_)));
    }

    #[tokio::test]
    async fn test_missing_credential_fails_before_any_call() {
        let provider = ScriptedProvider::constant(1.0).without_credential();
        let err = engine()
            .analyze(&input(RUST_RESUME, STARTUP_JD), &provider)
            .await
            .unwrap_err();
        assert!(matches!(err, AnalysisError::MissingCredential));
        assert_eq!(err.kind(), ErrorKind::AuthError);
        assert_eq!(provider.stats.score_calls(), 0);
        assert_eq!(provider.stats.classify_calls(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_deadline_aborts_run_and_in_flight_calls() {
        let provider = ScriptedProvider::constant(1.0).with_delay(Duration::from_secs(600));
        let engine = Engine::new(
            EngineConfig {
                analysis_deadline: Duration::from_secs(5),
                ..EngineConfig::default()
            },
            Arc::new(Lexicons::default()),
        );

        let err = engine
            .analyze(&input(RUST_RESUME, STARTUP_JD), &provider)
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            AnalysisError::Upstream {
                cause: UpstreamCause::DeadlineExceeded,
                ..
            }
        ));
        assert!(provider.stats.abandoned() >= 1);
        assert_eq!(provider.stats.in_flight.load(std::sync::atomic::Ordering::SeqCst), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_signal_stops_run() {
        let provider = ScriptedProvider::constant(1.0).with_delay(Duration::from_secs(60));

        let err = engine()
            .analyze_until(
                &input(RUST_RESUME, STARTUP_JD),
                &provider,
                tokio::time::sleep(Duration::from_millis(100)),
            )
            .await
            .unwrap_err();

        assert!(matches!(err, AnalysisError::Cancelled));
        assert!(provider.stats.abandoned() >= 1);
    }

    #[tokio::test]
    async fn test_concurrent_runs_are_independent() {
        let engine = engine();
        let provider = ScriptedProvider::lexical();
        let a = input(RUST_RESUME, STARTUP_JD);
        let b = input("Led a team of 5 engineers.", "We need a team player.");

        let (ra, rb) = tokio::join!(engine.analyze(&a, &provider), engine.analyze(&b, &provider));
        let solo_a = engine.analyze(&a, &provider).await.unwrap();
        let solo_b = engine.analyze(&b, &provider).await.unwrap();

        assert_eq!(ra.unwrap(), solo_a);
        assert_eq!(rb.unwrap(), solo_b);
    }

    #[tokio::test]
    async fn test_result_invariants() {
        let provider = ScriptedProvider::lexical();
        let result = engine()
            .analyze(&input(RUST_RESUME, STARTUP_JD), &provider)
            .await
            .unwrap();

        assert!(result.score <= 100);
        for category in Category::ALL {
            let sub = result.sub_scores.get(category);
            assert!((0.0..=100.0).contains(&sub), "{category:?} = {sub}");
        }
        let texts: Vec<&str> = result
            .sentence_scores
            .iter()
            .map(|(t, _)| t.as_str())
            .collect();
        assert_eq!(texts[0], "Senior Engineer with 6 years of Rust experience.");
        assert_eq!(texts.len(), 4);
        assert!(result
            .sentence_scores
            .iter()
            .all(|(_, s)| (0.0..=1.0).contains(s)));
    }
}
