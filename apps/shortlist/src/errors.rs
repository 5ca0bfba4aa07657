use std::fmt;

use thiserror::Error;

/// Why an external call did not produce a usable result.
///
/// Every external-call wrapper returns `Result<T, FallbackReason>`; callers log
/// the reason and take their deterministic path. None of these reach the user.
#[derive(Debug, Error)]
pub enum FallbackReason {
    #[error("{0} credentials not configured")]
    MissingCredentials(Service),

    #[error("{service} request failed: {source}")]
    Http {
        service: Service,
        #[source]
        source: reqwest::Error,
    },

    #[error("{service} returned status {status}: {body}")]
    Status {
        service: Service,
        status: u16,
        body: String,
    },

    #[error("{service} response malformed: {detail}")]
    Malformed { service: Service, detail: String },

    #[error("{service} returned no results")]
    Empty { service: Service },
}

/// The external services the core talks to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Service {
    Embedding,
    VectorSearch,
    ChatCompletion,
}

impl fmt::Display for Service {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Service::Embedding => "embedding",
            Service::VectorSearch => "vector search",
            Service::ChatCompletion => "chat completion",
        })
    }
}

/// A job config that cannot be scored. Reported as a skip, never as a crash.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SkipReason {
    #[error("empty or missing config file")]
    EmptyInput,

    #[error("invalid YAML content: {0}")]
    ConfigInvalid(String),
}

impl SkipReason {
    /// Short reason string surfaced in query output.
    pub fn label(&self) -> &'static str {
        match self {
            SkipReason::EmptyInput => "empty or missing config file",
            SkipReason::ConfigInvalid(_) => "invalid YAML content",
        }
    }
}

/// Failures of the collaborator layer: reading corpora and profiles, writing
/// submissions, posting to the evaluation endpoint.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Submission error: {0}")]
    Submission(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

impl PipelineError {
    pub fn io(path: impl fmt::Display, source: std::io::Error) -> Self {
        PipelineError::Io {
            path: path.to_string(),
            source,
        }
    }
}
