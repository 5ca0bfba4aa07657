use async_trait::async_trait;

use crate::models::candidate::CandidateProfile;
use crate::models::job::JobSpec;
use crate::models::results::RerankResult;
use crate::rerank::Reranker;
use crate::text::{alpha_tokens, round_to};

/// At most this many job keywords are considered.
const MAX_KEYWORDS: usize = 40;

/// Keyword-overlap reranker. Fast, deterministic, no external call.
///
/// Keywords are the first 40 unique alphabetic words (3+ letters) of the job
/// title and description; a candidate scores matched / keywords over its
/// lowercased rerank summary, two decimals.
#[derive(Debug, Clone, Copy, Default)]
pub struct KeywordReranker;

#[async_trait]
impl Reranker for KeywordReranker {
    async fn rerank(&self, job: &JobSpec, candidates: &[CandidateProfile]) -> Vec<RerankResult> {
        keyword_scores(job, candidates)
    }

    fn backend(&self) -> &'static str {
        "keyword"
    }
}

pub fn keyword_scores(job: &JobSpec, candidates: &[CandidateProfile]) -> Vec<RerankResult> {
    let keywords: Vec<String> = alpha_tokens(&job.headline())
        .into_iter()
        .take(MAX_KEYWORDS)
        .collect();

    candidates
        .iter()
        .map(|candidate| {
            let text = candidate.rerank_summary.to_lowercase();
            let matched = keywords.iter().filter(|k| text.contains(k.as_str())).count();
            let score = if keywords.is_empty() {
                0.0
            } else {
                round_to(matched as f64 / keywords.len() as f64, 2)
            };
            RerankResult {
                candidate_id: candidate.id.clone(),
                score,
            }
        })
        .collect()
}
