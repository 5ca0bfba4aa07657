use std::collections::HashMap;

use async_trait::async_trait;
use serde_json::Value;
use tracing::{info, warn};

use crate::errors::{FallbackReason, Service};
use crate::llm_client::LlmClient;
use crate::models::candidate::CandidateProfile;
use crate::models::job::{scalar_to_string, JobSpec};
use crate::models::results::RerankResult;
use crate::rerank::keyword::keyword_scores;
use crate::rerank::prompts::build_rerank_prompt;
use crate::rerank::Reranker;

/// Semantic reranker via one chat-completion call per job.
///
/// Any failure (missing key, network, non-2xx, unparsable reply) is logged and
/// the keyword scores are returned instead.
pub struct LlmReranker {
    llm: LlmClient,
}

impl LlmReranker {
    pub fn new(llm: LlmClient) -> Self {
        Self { llm }
    }

    async fn llm_scores(
        &self,
        job: &JobSpec,
        candidates: &[CandidateProfile],
    ) -> Result<Vec<RerankResult>, FallbackReason> {
        let prompt = build_rerank_prompt(job, candidates);
        let reply: Value = self.llm.complete_json(&prompt).await?;
        let scores = scores_by_id(&reply)?;

        Ok(candidates
            .iter()
            .map(|c| RerankResult {
                candidate_id: c.id.clone(),
                score: scores.get(&c.id).copied().unwrap_or(0.0),
            })
            .collect())
    }
}

#[async_trait]
impl Reranker for LlmReranker {
    async fn rerank(&self, job: &JobSpec, candidates: &[CandidateProfile]) -> Vec<RerankResult> {
        if candidates.is_empty() {
            return Vec::new();
        }
        match self.llm_scores(job, candidates).await {
            Ok(results) => {
                info!(
                    "Reranked {} candidates with {}",
                    results.len(),
                    self.llm.chat_model()
                );
                results
            }
            Err(reason) => {
                warn!("Reranker error, falling back to keyword scores: {reason}");
                keyword_scores(job, candidates)
            }
        }
    }

    fn backend(&self) -> &'static str {
        "llm"
    }
}

/// Reads `[{id, score}, ...]`, a lone `{id, score}` object, or an object
/// wrapping such an array. Scores are clamped to [0, 1]; entries without an id
/// or a numeric score are ignored.
fn scores_by_id(reply: &Value) -> Result<HashMap<String, f64>, FallbackReason> {
    let items = match reply {
        Value::Array(items) => items.as_slice(),
        Value::Object(fields) if fields.contains_key("id") && fields.contains_key("score") => {
            std::slice::from_ref(reply)
        }
        Value::Object(fields) => fields
            .values()
            .find_map(Value::as_array)
            .map(Vec::as_slice)
            .ok_or_else(|| malformed("object reply without a score array"))?,
        _ => return Err(malformed("reply is neither an array nor an object")),
    };

    let mut scores = HashMap::with_capacity(items.len());
    for item in items {
        let id = item.get("id").and_then(scalar_to_string);
        let score = item.get("score").and_then(Value::as_f64);
        if let (Some(id), Some(score)) = (id, score) {
            scores.insert(id, score.clamp(0.0, 1.0));
        }
    }
    Ok(scores)
}

fn malformed(detail: &str) -> FallbackReason {
    FallbackReason::Malformed {
        service: Service::ChatCompletion,
        detail: detail.to_string(),
    }
}
