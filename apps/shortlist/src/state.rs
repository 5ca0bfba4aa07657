use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::info;

use crate::config::{Config, RerankMode, RetrievalMode};
use crate::jobs::submission::EvaluationClient;
use crate::llm_client::LlmClient;
use crate::pipeline::Pipeline;
use crate::rerank::{KeywordReranker, LlmReranker, Reranker};
use crate::retrieval::{Corpus, LocalRetriever, RemoteRetriever, Retriever};

/// Everything a CLI run needs, built once from `Config`.
pub struct AppState {
    pub config: Config,
    pub pipeline: Pipeline,
    /// Present only when both `EVAL_REMOTE` and `AUTH_EMAIL` are set.
    pub submitter: Option<EvaluationClient>,
}

impl AppState {
    pub fn build(config: Config, corpus: Arc<Corpus>) -> Result<Self> {
        let llm = LlmClient::from_config(&config).context("Failed to build LLM HTTP client")?;
        let local = LocalRetriever::new(corpus);

        let retriever: Arc<dyn Retriever> = match config.retrieval_mode {
            RetrievalMode::Local => Arc::new(local),
            RetrievalMode::Remote => {
                let embedder = llm.has_credentials().then(|| llm.clone());
                Arc::new(
                    RemoteRetriever::new(
                        &config.vector_search_endpoint,
                        config.vector_search_api_key.clone(),
                        embedder,
                        local,
                        config.http_timeout,
                    )
                    .context("Failed to build vector-search HTTP client")?,
                )
            }
        };

        let reranker: Arc<dyn Reranker> = match config.rerank_mode {
            RerankMode::Heuristic => Arc::new(KeywordReranker),
            RerankMode::Llm => Arc::new(LlmReranker::new(llm)),
        };

        let submitter = match (config.eval_remote, config.auth_email.as_deref()) {
            (true, Some(auth)) => Some(
                EvaluationClient::new(&config.eval_endpoint, auth, config.http_timeout)
                    .context("Failed to build evaluation HTTP client")?,
            ),
            _ => None,
        };

        let pipeline = Pipeline::new(retriever, reranker, config.top_n);
        let (retrieval, rerank) = pipeline.backends();
        info!("Pipeline ready: {retrieval} retrieval, {rerank} reranking, top {}", config.top_n);

        Ok(Self {
            config,
            pipeline,
            submitter,
        })
    }
}
