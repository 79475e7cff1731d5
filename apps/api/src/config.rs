use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use anyhow::{bail, Context, Result};

use crate::analysis::models::Category;
use crate::llm_client::retry::RetryPolicy;

pub const DEFAULT_PROVIDER_BASE_URL: &str = "https://api.anthropic.com/v1/messages";
pub const DEFAULT_PROVIDER_MODEL: &str = "claude-sonnet-4-5";

/// Application configuration loaded from environment variables.
/// Fails at startup if a variable is present but malformed.
#[derive(Clone)]
pub struct Config {
    pub port: u16,
    pub rust_log: String,
    pub provider: ProviderSettings,
    pub engine: EngineConfig,
    pub lexicon_path: Option<PathBuf>,
}

/// Connection settings for the external scoring provider.
/// The API key is opaque: forwarded upstream, never logged.
#[derive(Clone)]
pub struct ProviderSettings {
    pub api_key: Option<String>,
    pub model: String,
    pub base_url: String,
    pub timeout: Duration,
}

impl fmt::Debug for ProviderSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProviderSettings")
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("model", &self.model)
            .field("base_url", &self.base_url)
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("port", &self.port)
            .field("rust_log", &self.rust_log)
            .field("provider", &self.provider)
            .field("engine", &self.engine)
            .field("lexicon_path", &self.lexicon_path)
            .finish()
    }
}

/// Per-category weights for the overall fit score. Must sum to 1.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CategoryWeights {
    pub hard_skills: f32,
    pub soft_skills: f32,
    pub experience: f32,
    pub education: f32,
}

impl Default for CategoryWeights {
    fn default() -> Self {
        Self {
            hard_skills: 0.25,
            soft_skills: 0.25,
            experience: 0.25,
            education: 0.25,
        }
    }
}

impl CategoryWeights {
    const SUM_TOLERANCE: f32 = 1e-3;

    pub fn get(&self, category: Category) -> f32 {
        match category {
            Category::HardSkills => self.hard_skills,
            Category::SoftSkills => self.soft_skills,
            Category::Experience => self.experience,
            Category::Education => self.education,
        }
    }

    pub fn validate(&self) -> Result<()> {
        let all = [
            self.hard_skills,
            self.soft_skills,
            self.experience,
            self.education,
        ];
        if all.iter().any(|w| !w.is_finite() || *w < 0.0) {
            bail!("category weights must be finite and non-negative, got {all:?}");
        }
        let sum: f32 = all.iter().sum();
        if (sum - 1.0).abs() > Self::SUM_TOLERANCE {
            bail!("category weights must sum to 1, got {sum}");
        }
        Ok(())
    }
}

impl FromStr for CategoryWeights {
    type Err = anyhow::Error;

    /// Parses `"hard,soft,experience,education"`, e.g. `"0.4,0.2,0.3,0.1"`.
    fn from_str(s: &str) -> Result<Self> {
        let parts = s
            .split(',')
            .map(|p| p.trim().parse::<f32>())
            .collect::<std::result::Result<Vec<_>, _>>()
            .context("category weights must be numbers")?;
        let &[hard_skills, soft_skills, experience, education] = parts.as_slice() else {
            bail!("expected 4 category weights, got {}", parts.len());
        };
        let weights = CategoryWeights {
            hard_skills,
            soft_skills,
            experience,
            education,
        };
        weights.validate()?;
        Ok(weights)
    }
}

/// Tunables for a single analysis run. Every field has a documented default.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// A requirement whose best match is strictly below this is reported missing.
    pub coverage_threshold: f32,
    pub category_weights: CategoryWeights,
    /// Sentences per provider request.
    pub batch_sentences: usize,
    /// Requirements per provider request.
    pub batch_requirements: usize,
    pub max_concurrent_batches: usize,
    pub retry: RetryPolicy,
    pub analysis_deadline: Duration,
    /// Score a batch by lexical overlap when the provider returns unparseable content.
    pub lexical_fallback: bool,
    pub words_per_minute: u32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            coverage_threshold: 0.5,
            category_weights: CategoryWeights::default(),
            batch_sentences: 16,
            batch_requirements: 24,
            max_concurrent_batches: 4,
            retry: RetryPolicy::default(),
            analysis_deadline: Duration::from_secs(90),
            lexical_fallback: true,
            words_per_minute: 250,
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        let defaults = EngineConfig::default();
        let engine = EngineConfig {
            coverage_threshold: env_or("COVERAGE_THRESHOLD", defaults.coverage_threshold)?,
            category_weights: env_or("CATEGORY_WEIGHTS", defaults.category_weights)?,
            batch_sentences: env_or("BATCH_SENTENCES", defaults.batch_sentences)?,
            batch_requirements: env_or("BATCH_REQUIREMENTS", defaults.batch_requirements)?,
            max_concurrent_batches: env_or(
                "MAX_CONCURRENT_BATCHES",
                defaults.max_concurrent_batches,
            )?,
            retry: RetryPolicy {
                max_attempts: env_or("RETRY_MAX_ATTEMPTS", defaults.retry.max_attempts)?,
                base_delay: env_millis("RETRY_BASE_DELAY_MS", defaults.retry.base_delay)?,
                max_delay: env_millis("RETRY_MAX_DELAY_MS", defaults.retry.max_delay)?,
            },
            analysis_deadline: env_millis("ANALYSIS_DEADLINE_MS", defaults.analysis_deadline)?,
            lexical_fallback: env_or("LEXICAL_FALLBACK", defaults.lexical_fallback)?,
            words_per_minute: env_or("WORDS_PER_MINUTE", defaults.words_per_minute)?,
        };
        engine.validate()?;

        Ok(Config {
            port: env_or("PORT", 8080u16).context("PORT must be a valid port number")?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
            provider: ProviderSettings {
                api_key: std::env::var("PROVIDER_API_KEY")
                    .ok()
                    .filter(|k| !k.trim().is_empty()),
                model: std::env::var("PROVIDER_MODEL")
                    .unwrap_or_else(|_| DEFAULT_PROVIDER_MODEL.to_string()),
                base_url: std::env::var("PROVIDER_BASE_URL")
                    .unwrap_or_else(|_| DEFAULT_PROVIDER_BASE_URL.to_string()),
                timeout: env_millis("PROVIDER_TIMEOUT_MS", Duration::from_secs(20))?,
            },
            engine,
            lexicon_path: std::env::var("LEXICON_PATH").ok().map(PathBuf::from),
        })
    }
}

impl EngineConfig {
    pub fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.coverage_threshold) {
            bail!(
                "COVERAGE_THRESHOLD must be within [0, 1], got {}",
                self.coverage_threshold
            );
        }
        self.category_weights.validate()?;
        if self.batch_sentences == 0 || self.batch_requirements == 0 {
            bail!("batch sizes must be at least 1");
        }
        if self.max_concurrent_batches == 0 {
            bail!("MAX_CONCURRENT_BATCHES must be at least 1");
        }
        if self.retry.max_attempts == 0 {
            bail!("RETRY_MAX_ATTEMPTS must be at least 1");
        }
        if self.words_per_minute == 0 {
            bail!("WORDS_PER_MINUTE must be at least 1");
        }
        Ok(())
    }
}

fn env_or<T>(key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: fmt::Display,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .map_err(|e| anyhow::anyhow!("Environment variable '{key}' is invalid: {e}")),
        Err(_) => Ok(default),
    }
}

fn env_millis(key: &str, default: Duration) -> Result<Duration> {
    let ms = env_or(key, default.as_millis() as u64)?;
    Ok(Duration::from_millis(ms))
}
