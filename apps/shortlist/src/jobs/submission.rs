use std::time::Duration;

use reqwest::Client;
use serde::Serialize;
use serde_json::Value;
use tracing::info;

use crate::errors::PipelineError;

#[derive(Debug, Serialize)]
struct EvaluationRequest<'a> {
    config_path: &'a str,
    object_ids: &'a [String],
}

/// Posts rankings to the external evaluation endpoint.
///
/// The endpoint identifies the submitter by the raw `Authorization` header.
pub struct EvaluationClient {
    client: Client,
    endpoint: String,
    auth: String,
}

impl EvaluationClient {
    pub fn new(endpoint: &str, auth: &str, timeout: Duration) -> Result<Self, reqwest::Error> {
        Ok(Self {
            client: Client::builder().timeout(timeout).build()?,
            endpoint: endpoint.to_string(),
            auth: auth.to_string(),
        })
    }

    pub async fn submit(&self, config: &str, object_ids: &[String]) -> Result<Value, PipelineError> {
        let response = self
            .client
            .post(&self.endpoint)
            .header(reqwest::header::AUTHORIZATION, &self.auth)
            .json(&EvaluationRequest {
                config_path: config,
                object_ids,
            })
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(PipelineError::Submission(format!(
                "{config} rejected with status {status}: {body}"
            )));
        }

        let reply: Value = response.json().await?;
        info!("Evaluation endpoint accepted {config} ({} ids)", object_ids.len());
        Ok(reply)
    }
}
