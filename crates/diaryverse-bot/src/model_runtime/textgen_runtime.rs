//! Text-generation runtime adapter (OpenAI-compatible `/v1/completions`).

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

use super::runtime_trait::*;

#[derive(Debug, Serialize)]
struct CompletionRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    max_tokens: u32,
    n: u32,
    temperature: f32,
    top_p: f32,
    top_k: u32,
    stream: bool,
}

#[derive(Debug, Deserialize)]
struct CompletionResponse {
    choices: Vec<CompletionChoice>,
}

#[derive(Debug, Deserialize)]
struct CompletionChoice {
    #[serde(default)]
    index: u32,
    text: String,
}

pub struct TextGenRuntime {
    base_url: String,
    model: String,
    http_client: reqwest::Client,
}

impl TextGenRuntime {
    pub fn new(
        base_url: impl Into<String>,
        model: impl Into<String>,
        timeout: Duration,
    ) -> anyhow::Result<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| anyhow::anyhow!("Failed to build text generation HTTP client: {}", e))?;

        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            model: model.into(),
            http_client,
        })
    }

    fn completions_url(&self) -> String {
        format!("{}/v1/completions", self.base_url)
    }
}

#[async_trait]
impl TextGenerator for TextGenRuntime {
    async fn generate(
        &self,
        prompt: &str,
        params: &SamplingParams,
        num_sequences: u32,
    ) -> anyhow::Result<Vec<String>> {
        debug!("Text generation: {} sequence(s), max_tokens {}", num_sequences, params.max_tokens);

        let request = CompletionRequest {
            model: &self.model,
            prompt,
            max_tokens: params.max_tokens,
            n: num_sequences,
            temperature: params.temperature,
            top_p: params.top_p,
            top_k: params.top_k,
            stream: false,
        };

        let response = self.http_client
            .post(self.completions_url())
            .json(&request)
            .send()
            .await
            .map_err(|e| anyhow::anyhow!("Text generation request failed: {}", e))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(anyhow::anyhow!("Text generation backend returned {}: {}", status, body));
        }

        let mut completion: CompletionResponse = response.json().await
            .map_err(|e| anyhow::anyhow!("Failed to parse text generation response: {}", e))?;

        if completion.choices.is_empty() {
            return Err(anyhow::anyhow!("Text generation backend returned no choices"));
        }
        completion.choices.sort_by_key(|c| c.index);

        Ok(completion.choices
            .into_iter()
            .map(|c| format!("{}{}", prompt, c.text))
            .collect())
    }

    fn metadata(&self) -> ModelMetadata {
        ModelMetadata {
            model: self.model.clone(),
            endpoint: self.base_url.clone(),
            task: "text-generation".to_string(),
        }
    }
}
