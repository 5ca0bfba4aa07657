// Scoring: domain classification, criterion evaluation, score combination.
// Everything here is pure; external calls live in retrieval/ and rerank/.

pub mod combiner;
pub mod domain;
pub mod evaluator;
