//! Score Aggregator — collapses the match matrix into per-category and overall scores.
//!
//! Per category: importance-weighted mean of each requirement's best sentence score,
//! scaled to 0–100 and rounded to two decimals. A category with no requirements
//! has nothing to miss and scores `NEUTRAL_SUB_SCORE`.
//!
//! Overall: weighted sum of the four sub-scores, rounded to the nearest integer.

use crate::analysis::models::{Category, CategorySubScores, MatchMatrix, RequirementItem};
use crate::config::CategoryWeights;

/// Sub-score for a category the job description never asks about.
pub const NEUTRAL_SUB_SCORE: f32 = 100.0;

pub fn category_sub_scores(
    matrix: &MatchMatrix,
    requirements: &[RequirementItem],
) -> CategorySubScores {
    let best = matrix.best_per_requirement();
    let mut scores = CategorySubScores {
        hard_skills: NEUTRAL_SUB_SCORE,
        soft_skills: NEUTRAL_SUB_SCORE,
        experience: NEUTRAL_SUB_SCORE,
        education: NEUTRAL_SUB_SCORE,
    };

    for category in Category::ALL {
        let (weighted, total) = requirements
            .iter()
            .zip(&best)
            .filter(|(req, _)| req.category == category)
            .fold((0.0f32, 0.0f32), |(weighted, total), (req, score)| {
                (weighted + req.importance * score, total + req.importance)
            });
        if total > 0.0 {
            scores.set(category, round2((weighted / total * 100.0).clamp(0.0, 100.0)));
        }
    }
    scores
}

pub fn overall_score(sub_scores: &CategorySubScores, weights: &CategoryWeights) -> u32 {
    let total: f32 = Category::ALL
        .iter()
        .map(|&c| weights.get(c) * sub_scores.get(c))
        .sum();
    total.round().clamp(0.0, 100.0) as u32
}

fn round2(value: f32) -> f32 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn req(phrase: &str, category: Category, importance: f32, order: usize) -> RequirementItem {
        RequirementItem {
            phrase: phrase.to_string(),
            category,
            importance,
            order,
        }
    }

    #[test]
    fn test_importance_weighted_mean_per_category() {
        let reqs = vec![
            req("Rust", Category::HardSkills, 1.0, 0),
            req("Kafka", Category::HardSkills, 0.5, 1),
        ];
        let matrix = MatchMatrix::from_rows(vec![vec![1.0, 0.0], vec![0.2, 0.4]]);

        let scores = category_sub_scores(&matrix, &reqs);
        assert!((scores.hard_skills - 80.0).abs() < 1e-3);
        assert_eq!(scores.soft_skills, NEUTRAL_SUB_SCORE);
        assert_eq!(scores.experience, NEUTRAL_SUB_SCORE);
        assert_eq!(scores.education, NEUTRAL_SUB_SCORE);
    }

    #[test]
    fn test_sub_scores_round_to_two_decimals() {
        let reqs = vec![
            req("a", Category::SoftSkills, 1.0, 0),
            req("b", Category::SoftSkills, 1.0, 1),
            req("c", Category::SoftSkills, 1.0, 2),
        ];
        let matrix = MatchMatrix::from_rows(vec![vec![1.0, 0.0, 0.0]]);
        let scores = category_sub_scores(&matrix, &reqs);
        assert!((scores.soft_skills - 33.33).abs() < 1e-3);
    }

    #[test]
    fn test_overall_is_weighted_sum() {
        let sub = CategorySubScores {
            hard_skills: 80.0,
            soft_skills: 100.0,
            experience: 100.0,
            education: 100.0,
        };
        assert_eq!(overall_score(&sub, &CategoryWeights::default()), 95);

        let weights = CategoryWeights {
            hard_skills: 0.7,
            soft_skills: 0.1,
            experience: 0.1,
            education: 0.1,
        };
        assert_eq!(overall_score(&sub, &weights), 86);
    }

    #[test]
    fn test_bounds() {
        let zero = CategorySubScores {
            hard_skills: 0.0,
            soft_skills: 0.0,
            experience: 0.0,
            education: 0.0,
        };
        assert_eq!(overall_score(&zero, &CategoryWeights::default()), 0);

        let reqs = vec![req("a", Category::Education, 1.0, 0)];
        let full = category_sub_scores(&MatchMatrix::from_rows(vec![vec![1.0]]), &reqs);
        assert_eq!(overall_score(&full, &CategoryWeights::default()), 100);
    }

    #[test]
    fn test_raising_a_cell_never_lowers_the_score() {
        let reqs = vec![
            req("Rust", Category::HardSkills, 1.0, 0),
            req("team player", Category::SoftSkills, 0.7, 1),
            req("5+ years", Category::Experience, 0.9, 2),
        ];
        let weights = CategoryWeights::default();
        let mut rows = vec![vec![0.2, 0.1, 0.3], vec![0.4, 0.0, 0.1]];
        let mut previous = overall_score(
            &category_sub_scores(&MatchMatrix::from_rows(rows.clone()), &reqs),
            &weights,
        );
        for (s, r) in [(0, 1), (1, 2), (1, 0), (0, 1)] {
            rows[s][r] = (rows[s][r] + 0.3f32).min(1.0);
            let next = overall_score(
                &category_sub_scores(&MatchMatrix::from_rows(rows.clone()), &reqs),
                &weights,
            );
            assert!(next >= previous, "{next} < {previous}");
            previous = next;
        }
    }
}
