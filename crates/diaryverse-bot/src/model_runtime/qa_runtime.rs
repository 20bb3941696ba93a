//! Question-answering runtime adapter
//!
//! Speaks the Hugging Face pipeline wire format used by the Inference API
//! and self-hosted inference toolkits:
//! `{"inputs": {"question", "context"}}` → `{"answer", "score", "start", "end"}`.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

use super::runtime_trait::*;

#[derive(Debug, Serialize)]
struct QaRequest<'a> {
    inputs: QaInputs<'a>,
}

#[derive(Debug, Serialize)]
struct QaInputs<'a> {
    question: &'a str,
    context: &'a str,
}

#[derive(Debug, Deserialize)]
struct QaResponse {
    answer: String,
    score: f64,
    start: usize,
    end: usize,
}

/// Some deployments wrap the single result in a list.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum QaPayload {
    Single(QaResponse),
    Many(Vec<QaResponse>),
}

pub struct QaRuntime {
    endpoint: String,
    model: String,
    http_client: reqwest::Client,
}

impl QaRuntime {
    pub fn new(
        endpoint: impl Into<String>,
        model: impl Into<String>,
        timeout: Duration,
    ) -> anyhow::Result<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| anyhow::anyhow!("Failed to build QA HTTP client: {}", e))?;

        Ok(Self {
            endpoint: endpoint.into().trim_end_matches('/').to_string(),
            model: model.into(),
            http_client,
        })
    }
}

#[async_trait]
impl QuestionAnswerer for QaRuntime {
    async fn answer(&self, question: &str, context: &str) -> anyhow::Result<QaAnswer> {
        debug!("QA request: question {} chars, context {} chars", question.len(), context.len());

        let request = QaRequest {
            inputs: QaInputs { question, context },
        };

        let response = self.http_client
            .post(&self.endpoint)
            .json(&request)
            .send()
            .await
            .map_err(|e| anyhow::anyhow!("QA backend request failed: {}", e))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(anyhow::anyhow!("QA backend returned {}: {}", status, body));
        }

        let payload: QaPayload = response.json().await
            .map_err(|e| anyhow::anyhow!("Failed to parse QA response: {}", e))?;

        let best = match payload {
            QaPayload::Single(result) => result,
            QaPayload::Many(results) => results
                .into_iter()
                .max_by(|a, b| a.score.total_cmp(&b.score))
                .ok_or_else(|| anyhow::anyhow!("QA backend returned no answers"))?,
        };

        Ok(QaAnswer {
            answer: best.answer,
            confidence: best.score,
            start: Some(best.start),
            end: Some(best.end),
        })
    }

    fn metadata(&self) -> ModelMetadata {
        ModelMetadata {
            model: self.model.clone(),
            endpoint: self.endpoint.clone(),
            task: "question-answering".to_string(),
        }
    }
}
