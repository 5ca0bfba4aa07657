use serde::{Deserialize, Serialize};

use crate::models::candidate::CandidateProfile;

/// Maximum number of matched terms reported per evaluation.
pub const MAX_MATCHED_TERMS: usize = 20;

/// Criterion Evaluator output for one candidate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EvaluationResult {
    pub candidate_id: String,
    /// First-match order, at most `MAX_MATCHED_TERMS`.
    pub matched_terms: Vec<String>,
    /// Number of experience entries on the profile, not tenure.
    pub experience_years: u32,
    pub education: Vec<String>,
    /// In [0, 1], two decimals.
    pub score: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RerankResult {
    pub candidate_id: String,
    pub score: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RankedCandidate {
    pub profile: CandidateProfile,
    pub evaluation: Option<EvaluationResult>,
    pub rerank_score: f64,
    pub final_score: f64,
}

/// Combined, sorted output for one job: the ranked list plus the identifiers in
/// rank order, which is what gets submitted.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobRanking {
    pub candidates: Vec<RankedCandidate>,
    pub object_ids: Vec<String>,
}

/// Single-profile scoring outcome for one job config.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryOutcome {
    pub job_title: String,
    pub evaluation: Option<EvaluationResult>,
    pub rerank_score: Option<f64>,
    pub final_score: Option<f64>,
    #[serde(default)]
    pub skipped: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl QueryOutcome {
    pub fn skipped(job_title: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            job_title: job_title.into(),
            evaluation: None,
            rerank_score: None,
            final_score: None,
            skipped: true,
            reason: Some(reason.into()),
        }
    }
}
