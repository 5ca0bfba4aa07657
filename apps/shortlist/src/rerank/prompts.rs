// Prompt text for the LLM reranker.

use crate::llm_client::prompts::JSON_ONLY_INSTRUCTION;
use crate::models::candidate::CandidateProfile;
use crate::models::job::JobSpec;

const RERANK_PREAMBLE: &str = "You are a scoring assistant. Given the job description and candidate \
    summaries, return a JSON array of objects with fields {\"id\": \"<candidate id>\", \"score\": <number 0-1>} \
    representing how well each candidate matches the job. Include every candidate exactly once.";

/// One prompt covering every candidate, so the model is called once per job.
pub fn build_rerank_prompt(job: &JobSpec, candidates: &[CandidateProfile]) -> String {
    let candidate_blocks = candidates
        .iter()
        .map(|c| format!("ID: {}\nSummary: {}", c.id, c.rerank_summary))
        .collect::<Vec<_>>()
        .join("\n\n");

    format!(
        "{RERANK_PREAMBLE} {JSON_ONLY_INSTRUCTION}\n\nJob description:\n{}\n{}\n\nCandidates:\n{candidate_blocks}",
        job.title, job.description
    )
}
