//! Reranker: an independent semantic score per candidate.
//!
//! Default: `KeywordReranker` (deterministic keyword overlap, no I/O).
//! `LlmReranker` asks a chat model for scores and falls back to the keyword
//! path on any failure. The composition root picks one from `Config`.

use async_trait::async_trait;

use crate::models::candidate::CandidateProfile;
use crate::models::job::JobSpec;
use crate::models::results::RerankResult;

pub mod keyword;
pub mod llm;
pub mod prompts;

pub use keyword::KeywordReranker;
pub use llm::LlmReranker;

/// Implementations never fail: the output always has one entry per input
/// candidate, in input order.
#[async_trait]
pub trait Reranker: Send + Sync {
    async fn rerank(&self, job: &JobSpec, candidates: &[CandidateProfile]) -> Vec<RerankResult>;

    /// Backend name for logs.
    fn backend(&self) -> &'static str;
}
