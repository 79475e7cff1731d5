// Resume/JD fit analysis.
// Implements: segmentation, requirement extraction, semantic matching, aggregation, metrics.
// All provider calls go through `provider::ScoringProvider`; nothing here talks HTTP directly.

pub mod aggregation;
pub mod engine;
pub mod handlers;
pub mod lexicon;
pub mod matcher;
pub mod missing_skills;
pub mod models;
pub mod prompts;
pub mod provider;
pub mod recruiter_metrics;
pub mod requirements;
pub mod segmenter;
pub mod text;

pub use engine::{AnalysisInput, Engine};
pub use lexicon::Lexicons;
