//! Score Combiner: merges evaluation and rerank scores into the final ranking.

use std::collections::HashMap;

use crate::models::candidate::CandidateProfile;
use crate::models::results::{EvaluationResult, JobRanking, RankedCandidate, RerankResult};
use crate::text::round_to;

#[derive(Debug, Clone, Copy)]
pub struct CombineWeights {
    pub evaluation: f64,
    pub rerank: f64,
}

impl Default for CombineWeights {
    fn default() -> Self {
        Self {
            evaluation: 0.6,
            rerank: 0.4,
        }
    }
}

/// `min(1, round(0.6 * evaluation + 0.4 * rerank, 3))`, floored at 0.
pub fn final_score(evaluation: f64, rerank: f64, weights: &CombineWeights) -> f64 {
    round_to(weights.evaluation * evaluation + weights.rerank * rerank, 3).clamp(0.0, 1.0)
}

/// Combines per-candidate results and sorts descending by final score.
///
/// The sort is stable, so candidates with equal scores keep their retrieval order.
/// Candidates missing from either map score 0 for that half.
pub fn combine(
    candidates: &[CandidateProfile],
    evaluations: &HashMap<String, EvaluationResult>,
    reranks: &HashMap<String, RerankResult>,
) -> JobRanking {
    let weights = CombineWeights::default();

    let mut ranked: Vec<RankedCandidate> = candidates
        .iter()
        .map(|profile| {
            let evaluation = evaluations.get(&profile.id).cloned();
            let evaluation_score = evaluation.as_ref().map(|e| e.score).unwrap_or(0.0);
            let rerank_score = reranks.get(&profile.id).map(|r| r.score).unwrap_or(0.0);
            RankedCandidate {
                profile: profile.clone(),
                evaluation,
                rerank_score,
                final_score: final_score(evaluation_score, rerank_score, &weights),
            }
        })
        .collect();

    ranked.sort_by(|a, b| b.final_score.total_cmp(&a.final_score));

    let object_ids = ranked.iter().map(|r| r.profile.id.clone()).collect();
    JobRanking {
        candidates: ranked,
        object_ids,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::candidate::normalize_profile;
    use serde_json::json;

    fn candidate(id: &str) -> CandidateProfile {
        normalize_profile(&json!({ "id": id }))
    }

    fn evaluation(id: &str, score: f64) -> (String, EvaluationResult) {
        (
            id.to_string(),
            EvaluationResult {
                candidate_id: id.to_string(),
                matched_terms: vec![],
                experience_years: 0,
                education: vec![],
                score,
            },
        )
    }

    fn rerank(id: &str, score: f64) -> (String, RerankResult) {
        (
            id.to_string(),
            RerankResult {
                candidate_id: id.to_string(),
                score,
            },
        )
    }

    #[test]
    fn test_final_score_formula() {
        let w = CombineWeights::default();
        assert_eq!(final_score(1.0, 1.0, &w), 1.0);
        assert_eq!(final_score(0.0, 0.0, &w), 0.0);
        // 0.6*0.33 + 0.4*0.5 = 0.398
        assert_eq!(final_score(0.33, 0.5, &w), 0.398);
        // 0.6*0.67 + 0.4*0.33 = 0.534
        assert_eq!(final_score(0.67, 0.33, &w), 0.534);
    }

    #[test]
    fn test_final_score_bounded_over_grid() {
        let w = CombineWeights::default();
        for e in 0..=20 {
            for r in 0..=20 {
                let score = final_score(e as f64 / 20.0, r as f64 / 20.0, &w);
                assert!((0.0..=1.0).contains(&score), "e={e} r={r} -> {score}");
            }
        }
    }

    #[test]
    fn test_sorted_descending_with_ids() {
        let candidates = vec![candidate("a"), candidate("b"), candidate("c")];
        let evaluations = HashMap::from([evaluation("a", 0.1), evaluation("b", 0.9), evaluation("c", 0.5)]);
        let reranks = HashMap::from([rerank("a", 0.1), rerank("b", 0.9), rerank("c", 0.5)]);

        let ranking = combine(&candidates, &evaluations, &reranks);
        assert_eq!(ranking.object_ids, vec!["b", "c", "a"]);
        assert_eq!(ranking.candidates[0].final_score, 0.9);
    }

    #[test]
    fn test_ties_keep_input_order() {
        let candidates = vec![candidate("x"), candidate("y"), candidate("z")];
        let evaluations = HashMap::from([evaluation("x", 0.5), evaluation("y", 0.5), evaluation("z", 0.8)]);
        let reranks = HashMap::new();

        let ranking = combine(&candidates, &evaluations, &reranks);
        assert_eq!(ranking.object_ids, vec!["z", "x", "y"]);
    }

    #[test]
    fn test_missing_evaluation_counts_as_zero() {
        let candidates = vec![candidate("a")];
        let reranks = HashMap::from([rerank("a", 1.0)]);

        let ranking = combine(&candidates, &HashMap::new(), &reranks);
        assert!(ranking.candidates[0].evaluation.is_none());
        assert_eq!(ranking.candidates[0].rerank_score, 1.0);
        assert_eq!(ranking.candidates[0].final_score, 0.4);
    }

    #[test]
    fn test_rerank_breaks_evaluation_tie() {
        let candidates = vec![candidate("b"), candidate("a")];
        let evaluations = HashMap::from([evaluation("a", 0.5), evaluation("b", 0.5)]);
        let reranks = HashMap::from([rerank("a", 1.0), rerank("b", 0.0)]);

        let ranking = combine(&candidates, &evaluations, &reranks);
        assert_eq!(ranking.object_ids, vec!["a", "b"]);
    }
}
