//! Criterion Evaluator: scores a candidate against a job with domain-aware vocabularies.
//!
//! Algorithm:
//! 1. Normalize job text (title, description, criteria) and profile text
//! 2. Classify the domain from the raw title + description
//! 3. Use the domain's curated keyword list, or for `general` the job's own
//!    alphabetic tokens minus stop words
//! 4. A term matches on an exact substring hit, or on its alternate spelling
//!    (`&` → " and ", `-` and `/` → " ")
//! 5. score = matched / vocabulary, two decimals; 0.0 for an empty vocabulary
//!
//! Pure and deterministic: no I/O, no suspension points.

use std::collections::HashSet;

use once_cell::sync::Lazy;
use tracing::debug;

use crate::models::candidate::CandidateProfile;
use crate::models::job::JobSpec;
use crate::models::results::{EvaluationResult, MAX_MATCHED_TERMS};
use crate::scoring::domain::{classify, Domain};
use crate::text::{alpha_tokens, normalize, round_to};

const LEGAL_KEYWORDS: &[&str] = &[
    "m&a",
    "merger",
    "mergers",
    "acquisition",
    "acquisitions",
    "due diligence",
    "due-diligence",
    "contract",
    "contracts",
    "negotiation",
    "negotiations",
    "compliance",
    "regulatory",
    "corporate",
    "securities",
    "litigation",
    "transaction",
    "drafting",
    "counsel",
    "counseling",
    "jd",
];

const DATA_KEYWORDS: &[&str] = &[
    "machine learning",
    "ml",
    "python",
    "statistics",
    "data",
    "feature engineering",
    "model",
    "deep learning",
    "nlp",
    "analysis",
];

const ENGINEERING_KEYWORDS: &[&str] = &[
    "javascript",
    "node",
    "python",
    "backend",
    "api",
    "microservice",
    "microservices",
    "cloud",
    "aws",
    "gcp",
    "docker",
    "kubernetes",
];

/// Dropped from the generic vocabulary. Only words of 3+ letters can ever
/// reach this filter; the short ones are kept so the list reads complete.
static STOP_WORDS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "the", "and", "for", "with", "that", "this", "from", "have", "has", "had", "are", "was",
        "were", "will", "would", "could", "should", "a", "an", "in", "on", "of", "to", "by", "as",
        "at", "is", "be", "or", "it", "its", "their", "they", "them", "these", "those", "which",
        "years", "year", "experience", "expertise", "strong", "skills", "work", "working",
    ]
    .into_iter()
    .collect()
});

/// Curated vocabulary for a domain; empty for `general`.
pub fn domain_keywords(domain: Domain) -> &'static [&'static str] {
    match domain {
        Domain::Legal => LEGAL_KEYWORDS,
        Domain::Data => DATA_KEYWORDS,
        Domain::Engineering => ENGINEERING_KEYWORDS,
        Domain::General => &[],
    }
}

/// Scores `profile` against `job`. Never fails; absent fields are already
/// defaulted by the profile normalizer.
pub fn evaluate(profile: &CandidateProfile, job: &JobSpec) -> EvaluationResult {
    let job_text = normalize(&job.criteria_text());
    let profile_text = normalize(&profile.profile_text());
    let domain = classify(&job.headline());

    let vocabulary: Vec<String> = match domain_keywords(domain) {
        [] => generic_vocabulary(&job_text),
        curated => curated.iter().map(|k| k.to_string()).collect(),
    };

    let matched: Vec<String> = vocabulary
        .iter()
        .filter(|term| term_matches(&profile_text, term))
        .cloned()
        .collect();

    let score = if vocabulary.is_empty() {
        0.0
    } else {
        round_to(matched.len() as f64 / vocabulary.len() as f64, 2)
    };

    debug!(
        "Evaluated candidate {} as {domain}: {}/{} terms, score {score}",
        profile.id,
        matched.len(),
        vocabulary.len()
    );

    EvaluationResult {
        candidate_id: profile.id.clone(),
        matched_terms: matched.into_iter().take(MAX_MATCHED_TERMS).collect(),
        experience_years: profile.experience.len() as u32,
        education: profile.education.clone(),
        score,
    }
}

/// Unique alphabetic job tokens (3+ letters) that are not stop words.
fn generic_vocabulary(job_text: &str) -> Vec<String> {
    alpha_tokens(job_text)
        .into_iter()
        .filter(|t| !STOP_WORDS.contains(t.as_str()))
        .collect()
}

fn term_matches(profile_text: &str, term: &str) -> bool {
    let term = term.to_lowercase();
    if profile_text.contains(&term) {
        return true;
    }
    let alternate = term.replace('&', " and ").replace(['-', '/'], " ");
    profile_text.contains(&alternate)
}
