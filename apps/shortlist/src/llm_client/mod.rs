//! LLM Client: the single point of entry for chat-completion and embedding calls.
//!
//! No other module talks to the OpenAI-compatible API directly. Every call is a
//! single attempt: any failure comes back as a `FallbackReason` and the caller
//! takes its deterministic path. There is no retry loop.

use std::time::Duration;

use reqwest::Client;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use tracing::debug;

use crate::config::Config;
use crate::errors::{FallbackReason, Service};

pub mod prompts;

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    temperature: f32,
    messages: Vec<ChatMessage<'a>>,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
    usage: Option<Usage>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: AssistantMessage,
}

#[derive(Debug, Deserialize)]
struct AssistantMessage {
    content: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct Usage {
    prompt_tokens: u32,
    completion_tokens: u32,
}

#[derive(Debug, Serialize)]
struct EmbeddingRequest<'a> {
    model: &'a str,
    input: &'a str,
}

#[derive(Debug, Deserialize)]
struct EmbeddingResponse {
    #[serde(default)]
    data: Vec<EmbeddingData>,
}

#[derive(Debug, Deserialize)]
struct EmbeddingData {
    embedding: Vec<f32>,
}

/// Client for an OpenAI-compatible API, built once from `Config`.
#[derive(Clone)]
pub struct LlmClient {
    client: Client,
    api_key: Option<String>,
    base_url: String,
    chat_model: String,
    embedding_model: String,
}

impl LlmClient {
    pub fn new(
        api_key: Option<String>,
        base_url: &str,
        chat_model: &str,
        embedding_model: &str,
        timeout: Duration,
    ) -> Result<Self, reqwest::Error> {
        Ok(Self {
            client: Client::builder().timeout(timeout).build()?,
            api_key,
            base_url: base_url.trim_end_matches('/').to_string(),
            chat_model: chat_model.to_string(),
            embedding_model: embedding_model.to_string(),
        })
    }

    pub fn from_config(config: &Config) -> Result<Self, reqwest::Error> {
        Self::new(
            config.openai_api_key.clone(),
            &config.openai_base_url,
            &config.rerank_model,
            &config.embedding_model,
            config.http_timeout,
        )
    }

    pub fn has_credentials(&self) -> bool {
        self.api_key.is_some()
    }

    pub fn chat_model(&self) -> &str {
        &self.chat_model
    }

    /// One chat-completion round trip at temperature 0. Returns the text of the
    /// first choice.
    pub async fn complete(&self, prompt: &str) -> Result<String, FallbackReason> {
        let service = Service::ChatCompletion;
        let api_key = self
            .api_key
            .as_deref()
            .ok_or(FallbackReason::MissingCredentials(service))?;

        let body = ChatRequest {
            model: &self.chat_model,
            temperature: 0.0,
            messages: vec![ChatMessage {
                role: "user",
                content: prompt,
            }],
        };
        let parsed: ChatResponse = self
            .post_json(service, "chat/completions", api_key, &body)
            .await?;

        if let Some(usage) = &parsed.usage {
            debug!(
                "Chat completion succeeded: prompt_tokens={}, completion_tokens={}",
                usage.prompt_tokens, usage.completion_tokens
            );
        }

        parsed
            .choices
            .into_iter()
            .find_map(|choice| choice.message.content)
            .filter(|text| !text.trim().is_empty())
            .ok_or(FallbackReason::Empty { service })
    }

    /// Calls `complete` and deserializes the reply, tolerating code fences and
    /// prose around a single embedded JSON value.
    pub async fn complete_json<T: DeserializeOwned>(&self, prompt: &str) -> Result<T, FallbackReason> {
        let text = self.complete(prompt).await?;
        parse_json_reply(&text).map_err(|detail| FallbackReason::Malformed {
            service: Service::ChatCompletion,
            detail,
        })
    }

    /// Embeds a single input string.
    pub async fn embed(&self, input: &str) -> Result<Vec<f32>, FallbackReason> {
        let service = Service::Embedding;
        let api_key = self
            .api_key
            .as_deref()
            .ok_or(FallbackReason::MissingCredentials(service))?;

        let body = EmbeddingRequest {
            model: &self.embedding_model,
            input,
        };
        let parsed: EmbeddingResponse = self.post_json(service, "embeddings", api_key, &body).await?;

        parsed
            .data
            .into_iter()
            .next()
            .map(|d| d.embedding)
            .filter(|v| !v.is_empty())
            .ok_or(FallbackReason::Empty { service })
    }

    async fn post_json<B, T>(
        &self,
        service: Service,
        path: &str,
        api_key: &str,
        body: &B,
    ) -> Result<T, FallbackReason>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let response = self
            .client
            .post(format!("{}/{}", self.base_url, path))
            .bearer_auth(api_key)
            .json(body)
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

        response.json::<T>().await.map_err(|e| FallbackReason::Malformed {
            service,
            detail: e.to_string(),
        })
    }
}

/// Parses a model reply as JSON: directly, then after stripping code fences,
/// then from the first embedded array or object.
pub fn parse_json_reply<T: DeserializeOwned>(text: &str) -> Result<T, String> {
    let direct_err = match serde_json::from_str(text) {
        Ok(value) => return Ok(value),
        Err(e) => e,
    };
    if let Ok(value) = serde_json::from_str(strip_json_fences(text)) {
        return Ok(value);
    }
    let fragment = extract_json_fragment(text).ok_or_else(|| direct_err.to_string())?;
    serde_json::from_str(fragment).map_err(|e| e.to_string())
}

/// Strips ```json ... ``` or ``` ... ``` code fences from LLM output.
fn strip_json_fences(text: &str) -> &str {
    let text = text.trim();
    if let Some(stripped) = text.strip_prefix("```json") {
        stripped
            .trim_start()
            .strip_suffix("```")
            .map(|s| s.trim())
            .unwrap_or(stripped.trim_start())
    } else if let Some(stripped) = text.strip_prefix("```") {
        stripped
            .trim_start()
            .strip_suffix("```")
            .map(|s| s.trim())
            .unwrap_or(stripped.trim_start())
    } else {
        text
    }
}

/// The span from the first `[` or `{` to the last matching closer.
fn extract_json_fragment(text: &str) -> Option<&str> {
    let start = text.find(['[', '{'])?;
    let closer = if text[start..].starts_with('[') { ']' } else { '}' };
    let end = text.rfind(closer)?;
    (end > start).then(|| &text[start..=end])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{closed_port_url, serve_json};
    use serde_json::{json, Value};

    fn client(base_url: &str, api_key: Option<&str>) -> LlmClient {
        LlmClient::new(
            api_key.map(str::to_string),
            base_url,
            "gpt-4o-mini",
            "text-embedding-3-small",
            Duration::from_secs(5),
        )
        .unwrap()
    }

    #[test]
    fn test_strip_json_fences_with_json_tag() {
        let input = "```json\n{\"key\": \"value\"}\n```";
        assert_eq!(strip_json_fences(input), "{\"key\": \"value\"}");
    }

    #[test]
    fn test_strip_json_fences_without_tag() {
        let input = "```\n{\"key\": \"value\"}\n```";
        assert_eq!(strip_json_fences(input), "{\"key\": \"value\"}");
    }

    #[test]
    fn test_strip_json_fences_no_fences() {
        let input = "{\"key\": \"value\"}";
        assert_eq!(strip_json_fences(input), "{\"key\": \"value\"}");
    }

    #[test]
    fn test_extract_fragment_prefers_first_bracket() {
        let text = r#"Here you go: [{"id": "a", "score": 0.5}] hope it helps"#;
        assert_eq!(extract_json_fragment(text), Some(r#"[{"id": "a", "score": 0.5}]"#));
    }

    #[test]
    fn test_extract_fragment_none_without_json() {
        assert_eq!(extract_json_fragment("no json here"), None);
    }

    #[test]
    fn test_parse_json_reply_with_prose() {
        let value: Value = parse_json_reply("Sure! [1, 2, 3]").unwrap();
        assert_eq!(value, json!([1, 2, 3]));
    }

    #[test]
    fn test_parse_json_reply_rejects_garbage() {
        assert!(parse_json_reply::<Value>("I cannot help with that").is_err());
    }

    #[tokio::test]
    async fn test_complete_without_key_is_missing_credentials() {
        let llm = client("http://127.0.0.1:1", None);
        let err = llm.complete("hi").await.unwrap_err();
        assert!(matches!(err, FallbackReason::MissingCredentials(Service::ChatCompletion)));
    }

    #[tokio::test]
    async fn test_complete_network_failure_is_http_reason() {
        let llm = client(&closed_port_url().await, Some("sk-test"));
        let err = llm.complete("hi").await.unwrap_err();
        assert!(matches!(err, FallbackReason::Http { .. }));
    }

    #[tokio::test]
    async fn test_complete_non_2xx_is_status_reason() {
        let url = serve_json(500, r#"{"error": "boom"}"#).await;
        let llm = client(&url, Some("sk-test"));
        let err = llm.complete("hi").await.unwrap_err();
        assert!(matches!(err, FallbackReason::Status { status: 500, .. }));
    }

    #[tokio::test]
    async fn test_complete_returns_first_choice() {
        let body = json!({
            "choices": [{"message": {"role": "assistant", "content": "[{\"id\":\"a\",\"score\":1}]"}}],
            "usage": {"prompt_tokens": 10, "completion_tokens": 5}
        });
        let url = serve_json(200, &body.to_string()).await;
        let llm = client(&url, Some("sk-test"));
        let text = llm.complete("hi").await.unwrap();
        assert_eq!(text, "[{\"id\":\"a\",\"score\":1}]");
    }

    #[tokio::test]
    async fn test_complete_tolerates_partial_usage() {
        let body = json!({
            "choices": [{"message": {"content": "ok"}}],
            "usage": {"prompt_tokens": 10, "total_tokens": 10}
        });
        let url = serve_json(200, &body.to_string()).await;
        let llm = client(&url, Some("sk-test"));
        assert_eq!(llm.complete("hi").await.unwrap(), "ok");
    }

    #[tokio::test]
    async fn test_complete_empty_choices_is_empty_reason() {
        let url = serve_json(200, r#"{"choices": []}"#).await;
        let llm = client(&url, Some("sk-test"));
        let err = llm.complete("hi").await.unwrap_err();
        assert!(matches!(err, FallbackReason::Empty { .. }));
    }

    #[tokio::test]
    async fn test_embed_returns_vector() {
        let url = serve_json(200, r#"{"data": [{"embedding": [0.1, 0.2, 0.3], "index": 0}]}"#).await;
        let llm = client(&url, Some("sk-test"));
        let vector = llm.embed("backend engineer").await.unwrap();
        assert_eq!(vector, vec![0.1, 0.2, 0.3]);
    }

    #[tokio::test]
    async fn test_embed_malformed_body() {
        let url = serve_json(200, "not json").await;
        let llm = client(&url, Some("sk-test"));
        let err = llm.embed("x").await.unwrap_err();
        assert!(matches!(err, FallbackReason::Malformed { service: Service::Embedding, .. }));
    }
}
