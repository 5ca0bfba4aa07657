use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use serde_json::Value;
use tracing::{info, warn};

use crate::errors::{FallbackReason, Service};
use crate::llm_client::LlmClient;
use crate::models::candidate::{normalize_batch, CandidateProfile};
use crate::models::job::JobSpec;
use crate::retrieval::{LocalRetriever, Retriever};
use crate::text::normalize;

/// Response keys a vector-search service may list its hits under, in precedence order.
const HIT_KEYS: [&str; 4] = ["candidates", "hits", "results", "matches"];

#[derive(Debug, Serialize)]
#[serde(untagged)]
enum SearchRequest<'a> {
    Vector { vector: Vec<f32>, top_k: usize },
    Text { query: &'a str, top_k: usize },
}

/// Vector search first, local token overlap on any failure.
///
/// 1. Embed the normalized job text when an embedding client with credentials
///    is configured (failure here only drops the vector, not the search)
/// 2. POST `{vector, top_k}` or `{query, top_k}` to the search endpoint
/// 3. Normalize hits to `CandidateProfile`; hits without an id are dropped
/// 4. Network error, non-2xx, unreadable body or zero usable hits → local ranking
pub struct RemoteRetriever {
    client: Client,
    endpoint: String,
    api_key: Option<String>,
    embedder: Option<LlmClient>,
    local: LocalRetriever,
}

impl RemoteRetriever {
    pub fn new(
        endpoint: &str,
        api_key: Option<String>,
        embedder: Option<LlmClient>,
        local: LocalRetriever,
        timeout: Duration,
    ) -> Result<Self, reqwest::Error> {
        Ok(Self {
            client: Client::builder().timeout(timeout).build()?,
            endpoint: endpoint.to_string(),
            api_key,
            embedder,
            local,
        })
    }

    async fn search(&self, job: &JobSpec, top_n: usize) -> Result<Vec<CandidateProfile>, FallbackReason> {
        let service = Service::VectorSearch;
        let api_key = self
            .api_key
            .as_deref()
            .ok_or(FallbackReason::MissingCredentials(service))?;

        let query = normalize(&job.criteria_text());
        let request = match self.embed_query(&query).await {
            Some(vector) => SearchRequest::Vector { vector, top_k: top_n },
            None => SearchRequest::Text { query: &query, top_k: top_n },
        };

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(api_key)
            .json(&request)
            .send()
            .await
            .map_err(|source| FallbackReason::Http { service, source })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(FallbackReason::Status {
                service,
                status: status.as_u16(),
                body,
            });
        }

        let payload: Value = response.json().await.map_err(|e| FallbackReason::Malformed {
            service,
            detail: e.to_string(),
        })?;

        let mut hits = normalize_batch(extract_hits(&payload));
        hits.truncate(top_n);
        if hits.is_empty() {
            return Err(FallbackReason::Empty { service });
        }
        Ok(hits)
    }

    async fn embed_query(&self, query: &str) -> Option<Vec<f32>> {
        let embedder = self.embedder.as_ref().filter(|e| e.has_credentials())?;
        match embedder.embed(query).await {
            Ok(vector) => Some(vector),
            Err(reason) => {
                warn!("Embedding generation failed, searching by text: {reason}");
                None
            }
        }
    }
}

#[async_trait]
impl Retriever for RemoteRetriever {
    async fn retrieve(&self, job: &JobSpec, top_n: usize) -> Vec<CandidateProfile> {
        match self.search(job, top_n).await {
            Ok(hits) => {
                info!("Vector search returned {} candidates", hits.len());
                hits
            }
            Err(reason) => {
                warn!("Remote retrieval failed, falling back to local corpus: {reason}");
                self.local.rank(job, top_n)
            }
        }
    }

    fn backend(&self) -> &'static str {
        "remote"
    }
}

/// The hit list: the payload itself if it is an array, else the first of
/// `HIT_KEYS` that holds an array.
fn extract_hits(payload: &Value) -> &[Value] {
    if let Value::Array(items) = payload {
        return items;
    }
    HIT_KEYS
        .iter()
        .find_map(|key| payload.get(key).and_then(Value::as_array))
        .map(Vec::as_slice)
        .unwrap_or(&[])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::candidate::normalize_profile;
    use crate::retrieval::Corpus;
    use crate::testing::{capture_json, closed_port_url, serve_json};
    use serde_json::json;
    use std::sync::Arc;

    const TIMEOUT: Duration = Duration::from_secs(5);

    fn local() -> LocalRetriever {
        let corpus = Corpus::new(vec![
            normalize_profile(&json!({"_id": "l1", "rerankSummary": "Pastry chef"})),
            normalize_profile(&json!({"_id": "l2", "rerankSummary": "Rust backend engineer"})),
            normalize_profile(&json!({"_id": "l3", "rerankSummary": "Backend engineer"})),
        ]);
        LocalRetriever::new(Arc::new(corpus))
    }

    fn job() -> JobSpec {
        JobSpec::new("Rust Backend Engineer", "")
    }

    fn ids(candidates: &[CandidateProfile]) -> Vec<&str> {
        candidates.iter().map(|c| c.id.as_str()).collect()
    }

    fn embedder(base_url: &str) -> LlmClient {
        LlmClient::new(
            Some("sk-test".to_string()),
            base_url,
            "gpt-4o-mini",
            "text-embedding-3-small",
            TIMEOUT,
        )
        .unwrap()
    }

    #[tokio::test]
    async fn test_remote_hits_are_normalized() {
        let body = json!({"hits": [
            {"_id": "r1", "rerankSummary": "remote one"},
            {"name": "no identifier"},
            {"id": 2, "attributes": {"rerankSummary": "remote two"}}
        ]});
        let (url, request) = capture_json(200, &body.to_string()).await;
        let retriever = RemoteRetriever::new(&url, Some("tp-test".into()), None, local(), TIMEOUT).unwrap();

        let results = retriever.retrieve(&job(), 5).await;
        assert_eq!(ids(&results), vec!["r1", "2"]);
        assert_eq!(results[1].rerank_summary, "remote two");

        let request = request.await.unwrap();
        let sent: Value = serde_json::from_str(&request.body).unwrap();
        assert_eq!(sent, json!({"query": "rust backend engineer", "top_k": 5}));
        assert_eq!(request.header("authorization"), Some("Bearer tp-test"));
    }

    #[tokio::test]
    async fn test_remote_results_truncated_to_top_n() {
        let body = json!({"results": [{"id": "a"}, {"id": "b"}, {"id": "c"}]});
        let url = serve_json(200, &body.to_string()).await;
        let retriever = RemoteRetriever::new(&url, Some("tp-test".into()), None, local(), TIMEOUT).unwrap();
        assert_eq!(ids(&retriever.retrieve(&job(), 2).await), vec!["a", "b"]);
    }

    #[tokio::test]
    async fn test_embedding_vector_is_sent() {
        let embed_url = serve_json(200, r#"{"data": [{"embedding": [0.5, 0.25], "index": 0}]}"#).await;
        let (search_url, request) = capture_json(200, r#"{"matches": [{"_id": "v1"}]}"#).await;
        let retriever = RemoteRetriever::new(
            &search_url,
            Some("tp-test".into()),
            Some(embedder(&embed_url)),
            local(),
            TIMEOUT,
        )
        .unwrap();

        assert_eq!(ids(&retriever.retrieve(&job(), 3).await), vec!["v1"]);
        let sent: Value = serde_json::from_str(&request.await.unwrap().body).unwrap();
        assert_eq!(sent, json!({"vector": [0.5, 0.25], "top_k": 3}));
    }

    #[tokio::test]
    async fn test_embedding_failure_searches_by_text() {
        let (search_url, request) = capture_json(200, r#"{"candidates": [{"_id": "t1"}]}"#).await;
        let retriever = RemoteRetriever::new(
            &search_url,
            Some("tp-test".into()),
            Some(embedder(&closed_port_url().await)),
            local(),
            TIMEOUT,
        )
        .unwrap();

        assert_eq!(ids(&retriever.retrieve(&job(), 3).await), vec!["t1"]);
        let sent: Value = serde_json::from_str(&request.await.unwrap().body).unwrap();
        assert!(sent.get("query").is_some());
        assert!(sent.get("vector").is_none());
    }

    #[tokio::test]
    async fn test_network_failure_equals_local() {
        let retriever =
            RemoteRetriever::new(&closed_port_url().await, Some("tp-test".into()), None, local(), TIMEOUT).unwrap();
        let expected = local().rank(&job(), 2);
        assert_eq!(retriever.retrieve(&job(), 2).await, expected);
        assert_eq!(ids(&expected), vec!["l2", "l3"]);
    }

    #[tokio::test]
    async fn test_non_2xx_equals_local() {
        let url = serve_json(503, "down for maintenance").await;
        let retriever = RemoteRetriever::new(&url, Some("tp-test".into()), None, local(), TIMEOUT).unwrap();
        assert_eq!(retriever.retrieve(&job(), 10).await, local().rank(&job(), 10));
    }

    #[tokio::test]
    async fn test_empty_or_idless_hits_equal_local() {
        let url = serve_json(200, r#"{"hits": [{"name": "anonymous"}]}"#).await;
        let retriever = RemoteRetriever::new(&url, Some("tp-test".into()), None, local(), TIMEOUT).unwrap();
        assert_eq!(retriever.retrieve(&job(), 10).await, local().rank(&job(), 10));
    }

    #[tokio::test]
    async fn test_missing_key_equals_local() {
        let retriever = RemoteRetriever::new("http://127.0.0.1:1", None, None, local(), TIMEOUT).unwrap();
        assert_eq!(retriever.retrieve(&job(), 10).await, local().rank(&job(), 10));
    }

    #[test]
    fn test_extract_hits_shapes() {
        assert_eq!(extract_hits(&json!([{"id": "a"}])).len(), 1);
        assert_eq!(extract_hits(&json!({"matches": [{"id": "a"}, {"id": "b"}]})).len(), 2);
        // first present key wins, even when empty
        assert!(extract_hits(&json!({"candidates": [], "hits": [{"id": "a"}]})).is_empty());
        assert!(extract_hits(&json!({"data": []})).is_empty());
    }
}
