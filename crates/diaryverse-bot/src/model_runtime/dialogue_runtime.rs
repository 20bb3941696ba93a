//! Dialogue runtime adapter
//!
//! Talks to an OpenAI-compatible inference server (llama-server, vLLM, TGI)
//! through `/v1/models` and `/v1/chat/completions`. The server owns the
//! weights, tokenizer and device placement; this adapter only selects the
//! model id and forwards the conversation window.

use arc_swap::ArcSwap;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info};

use super::runtime_trait::*;
use crate::memory::Message;

#[derive(Debug, Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: &'a [Message],
    max_tokens: u32,
    temperature: f32,
    top_p: f32,
    top_k: u32,
    repeat_penalty: f32,
    stream: bool,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: Option<Message>,
}

#[derive(Debug, Deserialize)]
struct ModelList {
    #[serde(default)]
    data: Vec<ModelEntry>,
}

#[derive(Debug, Deserialize)]
struct ModelEntry {
    id: String,
}

pub struct DialogueRuntime {
    base_url: String,
    primary_model: String,
    fallback_model: String,
    active_model: ArcSwap<String>,
    loaded: AtomicBool,
    http_client: reqwest::Client,
}

impl DialogueRuntime {
    pub fn new(
        base_url: impl Into<String>,
        primary_model: impl Into<String>,
        fallback_model: impl Into<String>,
        timeout: Duration,
    ) -> anyhow::Result<Self> {
        let primary_model = primary_model.into();
        let http_client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| anyhow::anyhow!("Failed to build dialogue HTTP client: {}", e))?;

        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            active_model: ArcSwap::new(Arc::new(primary_model.clone())),
            primary_model,
            fallback_model: fallback_model.into(),
            loaded: AtomicBool::new(false),
            http_client,
        })
    }

    fn models_url(&self) -> String {
        format!("{}/v1/models", self.base_url)
    }

    fn completions_url(&self) -> String {
        format!("{}/v1/chat/completions", self.base_url)
    }

    /// Whether a failed load of `model` should be retried with the smaller variant.
    fn should_fall_back(&self, model: &str) -> bool {
        (model.contains("medium") || model.contains("large")) && model != self.fallback_model
    }

    pub fn is_loaded(&self) -> bool {
        self.loaded.load(Ordering::Acquire)
    }

    /// Confirms the server is reachable and serves `model`.
    ///
    /// An empty model listing is accepted: single-model servers often
    /// report nothing useful there.
    async fn probe(&self, model: &str) -> anyhow::Result<()> {
        let resp = self.http_client
            .get(self.models_url())
            .send()
            .await
            .map_err(|e| anyhow::anyhow!("Model server unreachable at {}: {}", self.base_url, e))?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            return Err(anyhow::anyhow!("Model listing returned {}: {}", status, body));
        }

        let listing: ModelList = resp.json().await
            .map_err(|e| anyhow::anyhow!("Failed to parse model listing: {}", e))?;

        if !listing.data.is_empty() && !listing.data.iter().any(|m| m.id == model) {
            let served: Vec<&str> = listing.data.iter().map(|m| m.id.as_str()).collect();
            return Err(anyhow::anyhow!("Model {} is not served (available: {:?})", model, served));
        }

        Ok(())
    }

    /// Selects the model that will answer chat requests.
    ///
    /// Returns the active model id. Medium and large models fall back to the
    /// configured smaller model when they cannot be reached.
    pub async fn load(&self) -> anyhow::Result<String> {
        info!("Initializing dialogue model: {}", self.primary_model);

        let chosen = match self.probe(&self.primary_model).await {
            Ok(()) => self.primary_model.clone(),
            Err(e) => {
                error!("Error loading model {}: {}", self.primary_model, e);
                if !self.should_fall_back(&self.primary_model) {
                    return Err(e);
                }
                info!("Attempting fallback to {}...", self.fallback_model);
                if let Err(fallback_error) = self.probe(&self.fallback_model).await {
                    error!("Fallback also failed: {}", fallback_error);
                    return Err(fallback_error);
                }
                info!("Fallback model loaded successfully!");
                self.fallback_model.clone()
            }
        };

        self.active_model.store(Arc::new(chosen.clone()));
        self.loaded.store(true, Ordering::Release);
        info!("Dialogue model ready: {}", chosen);
        Ok(chosen)
    }
}

#[async_trait]
impl DialogueModel for DialogueRuntime {
    async fn reply(&self, history: &[Message], params: &SamplingParams) -> anyhow::Result<String> {
        let model = self.active_model.load_full();
        debug!("Dialogue request: {} messages, max_tokens {}", history.len(), params.max_tokens);

        let request = ChatCompletionRequest {
            model: model.as_str(),
            messages: history,
            max_tokens: params.max_tokens,
            temperature: params.temperature,
            top_p: params.top_p,
            top_k: params.top_k,
            repeat_penalty: params.repeat_penalty,
            stream: false,
        };

        let response = self.http_client
            .post(self.completions_url())
            .json(&request)
            .send()
            .await
            .map_err(|e| anyhow::anyhow!("Dialogue backend request failed: {}", e))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(anyhow::anyhow!("Dialogue backend returned {}: {}", status, body));
        }

        let completion: ChatCompletionResponse = response.json().await
            .map_err(|e| anyhow::anyhow!("Failed to parse dialogue response: {}", e))?;

        Ok(completion.choices
            .into_iter()
            .next()
            .and_then(|c| c.message)
            .map(|m| m.content)
            .unwrap_or_default())
    }

    fn model_name(&self) -> String {
        self.active_model.load().as_ref().clone()
    }

    fn metadata(&self) -> ModelMetadata {
        ModelMetadata {
            model: self.model_name(),
            endpoint: self.base_url.clone(),
            task: "conversational".to_string(),
        }
    }
}
