//! Missing Skills — requirements no resume sentence covers well enough.

use std::cmp::Ordering;
use std::collections::HashSet;

use crate::analysis::models::{MatchMatrix, RequirementItem};

/// Phrases whose best sentence score is strictly below `threshold`,
/// most important first (ties keep JD order), without case-insensitive duplicates.
pub fn detect_missing(
    matrix: &MatchMatrix,
    requirements: &[RequirementItem],
    threshold: f32,
) -> Vec<String> {
    let best = matrix.best_per_requirement();
    let mut uncovered: Vec<&RequirementItem> = requirements
        .iter()
        .zip(&best)
        .filter(|(_, score)| **score < threshold)
        .map(|(req, _)| req)
        .collect();

    uncovered.sort_by(|a, b| {
        b.importance
            .partial_cmp(&a.importance)
            .unwrap_or(Ordering::Equal)
            .then(a.order.cmp(&b.order))
    });

    let mut seen = HashSet::new();
    uncovered
        .into_iter()
        .filter(|req| seen.insert(req.phrase.to_lowercase()))
        .map(|req| req.phrase.clone())
        .collect()
}
