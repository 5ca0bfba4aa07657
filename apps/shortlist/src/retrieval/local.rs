use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;

use crate::models::candidate::CandidateProfile;
use crate::models::job::JobSpec;
use crate::retrieval::{Corpus, Retriever};
use crate::text::token_set;

/// Token-overlap ranking over the local corpus.
///
/// overlap = |job tokens ∩ rerank-summary tokens|, both normalized. Sorted
/// descending; ties keep corpus order.
#[derive(Debug, Clone)]
pub struct LocalRetriever {
    corpus: Arc<Corpus>,
}

impl LocalRetriever {
    pub fn new(corpus: Arc<Corpus>) -> Self {
        Self { corpus }
    }

    pub fn rank(&self, job: &JobSpec, top_n: usize) -> Vec<CandidateProfile> {
        let job_tokens = token_set(&job.criteria_text());

        let mut scored: Vec<(usize, &CandidateProfile)> = self
            .corpus
            .candidates()
            .iter()
            .map(|candidate| {
                let candidate_tokens = token_set(&candidate.rerank_summary);
                let overlap = job_tokens
                    .iter()
                    .filter(|t| candidate_tokens.contains(*t))
                    .count();
                (overlap, candidate)
            })
            .collect();

        // stable: equal overlaps stay in corpus order
        scored.sort_by(|a, b| b.0.cmp(&a.0));

        debug!(
            "Local retrieval scored {} candidates against {} job tokens",
            scored.len(),
            job_tokens.len()
        );

        scored
            .into_iter()
            .take(top_n)
            .map(|(_, candidate)| candidate.clone())
            .collect()
    }
}

#[async_trait]
impl Retriever for LocalRetriever {
    async fn retrieve(&self, job: &JobSpec, top_n: usize) -> Vec<CandidateProfile> {
        self.rank(job, top_n)
    }

    fn backend(&self) -> &'static str {
        "local"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::candidate::normalize_profile;
    use serde_json::json;

    fn sample_corpus() -> Arc<Corpus> {
        let records = [
            ("p1", "Pastry chef"),
            ("e1", "Backend engineer, Rust and Postgres"),
            ("e2", "Rust backend engineer with Kafka and Postgres"),
            ("l1", "Corporate lawyer"),
            ("e3", "Frontend engineer"),
        ];
        Arc::new(Corpus::new(
            records
                .iter()
                .map(|(id, summary)| normalize_profile(&json!({"_id": id, "rerankSummary": summary})))
                .collect(),
        ))
    }

    fn ids(candidates: &[CandidateProfile]) -> Vec<&str> {
        candidates.iter().map(|c| c.id.as_str()).collect()
    }

    #[tokio::test]
    async fn test_ranks_by_overlap() {
        let retriever = LocalRetriever::new(sample_corpus());
        let job = JobSpec {
            title: "Backend Engineer".to_string(),
            description: "Rust, Postgres and Kafka".to_string(),
            ..Default::default()
        };
        let results = retriever.retrieve(&job, 3).await;
        // e2: backend engineer rust kafka postgres and = 6; e1: backend engineer rust and postgres = 5;
        // e3: engineer = 1
        assert_eq!(ids(&results), vec!["e2", "e1", "e3"]);
    }

    #[test]
    fn test_ties_keep_corpus_order() {
        let retriever = LocalRetriever::new(sample_corpus());
        let results = retriever.rank(&JobSpec::new("Sommelier", ""), 10);
        assert_eq!(ids(&results), vec!["p1", "e1", "e2", "l1", "e3"]);
    }

    #[test]
    fn test_top_n_bounds_output() {
        let retriever = LocalRetriever::new(sample_corpus());
        assert_eq!(retriever.rank(&JobSpec::new("engineer", ""), 2).len(), 2);
        assert!(retriever.rank(&JobSpec::new("engineer", ""), 0).is_empty());
    }

    #[test]
    fn test_empty_corpus() {
        let retriever = LocalRetriever::new(Arc::new(Corpus::default()));
        assert!(retriever.rank(&JobSpec::new("anything", ""), 10).is_empty());
    }
}
