//! Retriever: bounded top-N candidate shortlist for a job.
//!
//! `LocalRetriever` ranks the in-memory corpus by token overlap.
//! `RemoteRetriever` asks a vector-search service first and falls back to the
//! local ranking, invisibly to callers, on any failure or empty result.

use async_trait::async_trait;

use crate::models::candidate::CandidateProfile;
use crate::models::job::JobSpec;

pub mod corpus;
pub mod local;
pub mod remote;

pub use corpus::Corpus;
pub use local::LocalRetriever;
pub use remote::RemoteRetriever;

#[async_trait]
pub trait Retriever: Send + Sync {
    /// At most `top_n` candidates, best first. Never fails.
    async fn retrieve(&self, job: &JobSpec, top_n: usize) -> Vec<CandidateProfile>;

    /// Backend name for logs.
    fn backend(&self) -> &'static str;
}
