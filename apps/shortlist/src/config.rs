use std::path::PathBuf;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use tracing::warn;

const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com/v1";
const DEFAULT_RERANK_MODEL: &str = "gpt-4o-mini";
const DEFAULT_EMBEDDING_MODEL: &str = "text-embedding-3-small";
const DEFAULT_VECTOR_SEARCH_ENDPOINT: &str = "https://api.turbopuffer.io/v1/search";
const DEFAULT_EVAL_ENDPOINT: &str = "https://mercor-dev--search-eng-interview.modal.run/evaluate";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetrievalMode {
    Local,
    Remote,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RerankMode {
    Heuristic,
    Llm,
}

/// Run configuration, read once at start-up and passed into every component
/// that needs credentials or toggles. Nothing reads the environment after this.
#[derive(Debug, Clone)]
pub struct Config {
    pub openai_api_key: Option<String>,
    pub openai_base_url: String,
    pub rerank_model: String,
    pub embedding_model: String,
    pub vector_search_api_key: Option<String>,
    pub vector_search_endpoint: String,
    pub retrieval_mode: RetrievalMode,
    pub rerank_mode: RerankMode,
    pub eval_remote: bool,
    pub eval_endpoint: String,
    pub auth_email: Option<String>,
    pub force_submit_empty: bool,
    pub configs_dir: PathBuf,
    pub corpus_path: PathBuf,
    pub output_dir: PathBuf,
    pub top_n: usize,
    pub http_timeout: Duration,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from any key lookup. Blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };
        let get_or = |key: &str, default: &str| get(key).unwrap_or_else(|| default.to_string());

        let openai_api_key = get("OAI_KEY").or_else(|| get("OPENAI_API_KEY"));
        let vector_search_api_key = get("TURBOPUFFER_API_KEY");

        let retrieval_mode = match get("RETRIEVER").as_deref() {
            None if vector_search_api_key.is_some() => RetrievalMode::Remote,
            None => RetrievalMode::Local,
            Some("local") => RetrievalMode::Local,
            Some("remote") if vector_search_api_key.is_none() => {
                warn!("RETRIEVER=remote but TURBOPUFFER_API_KEY is not set; using local retrieval");
                RetrievalMode::Local
            }
            Some("remote") => RetrievalMode::Remote,
            Some(other) => bail!("RETRIEVER must be 'local' or 'remote', got '{other}'"),
        };

        let rerank_mode = match get("RERANKER").as_deref() {
            None if openai_api_key.is_some() => RerankMode::Llm,
            None => RerankMode::Heuristic,
            Some("heuristic") => RerankMode::Heuristic,
            Some("llm") if openai_api_key.is_none() => {
                warn!("RERANKER=llm but no OpenAI key is set; using heuristic reranking");
                RerankMode::Heuristic
            }
            Some("llm") => RerankMode::Llm,
            Some(other) => bail!("RERANKER must be 'llm' or 'heuristic', got '{other}'"),
        };

        let top_n = match get("TOP_N") {
            Some(v) => v
                .parse::<usize>()
                .context("TOP_N must be a positive integer")?,
            None => 10,
        };
        if top_n == 0 {
            bail!("TOP_N must be a positive integer");
        }

        let http_timeout_secs = match get("HTTP_TIMEOUT_SECS") {
            Some(v) => v
                .parse::<u64>()
                .context("HTTP_TIMEOUT_SECS must be a whole number of seconds")?,
            None => 30,
        };

        Ok(Config {
            openai_api_key,
            openai_base_url: get_or("OPENAI_BASE_URL", DEFAULT_OPENAI_BASE_URL),
            rerank_model: get_or("RERANK_MODEL", DEFAULT_RERANK_MODEL),
            embedding_model: get_or("EMBEDDING_MODEL", DEFAULT_EMBEDDING_MODEL),
            vector_search_api_key,
            vector_search_endpoint: get_or("TURBOPUFFER_ENDPOINT", DEFAULT_VECTOR_SEARCH_ENDPOINT),
            retrieval_mode,
            rerank_mode,
            eval_remote: parse_flag(get("EVAL_REMOTE"), "EVAL_REMOTE")?,
            eval_endpoint: get_or("EVAL_ENDPOINT", DEFAULT_EVAL_ENDPOINT),
            auth_email: get("AUTH_EMAIL"),
            force_submit_empty: parse_flag(get("FORCE_SUBMIT_EMPTY"), "FORCE_SUBMIT_EMPTY")?,
            configs_dir: PathBuf::from(get_or("CONFIGS_DIR", "configs")),
            corpus_path: PathBuf::from(get_or("CORPUS_PATH", "tpuf_sample.json")),
            output_dir: PathBuf::from(get_or("OUTPUT_DIR", "output/submissions")),
            top_n,
            http_timeout: Duration::from_secs(http_timeout_secs),
        })
    }
}

fn parse_flag(value: Option<String>, key: &str) -> Result<bool> {
    match value.as_deref().map(str::to_ascii_lowercase).as_deref() {
        None | Some("false") | Some("0") | Some("no") => Ok(false),
        Some("true") | Some("1") | Some("yes") => Ok(true),
        Some(other) => bail!("{key} must be true or false, got '{other}'"),
    }
}
