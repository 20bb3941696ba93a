use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::memory::Message;

/// Decoding parameters forwarded to the inference server.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SamplingParams {
    pub max_tokens: u32,
    pub temperature: f32,
    pub top_p: f32,
    pub top_k: u32,
    pub repeat_penalty: f32,
}

impl SamplingParams {
    /// Defaults used for conversational replies.
    pub fn dialogue(max_tokens: u32, temperature: f32) -> Self {
        Self {
            max_tokens,
            temperature,
            top_p: 0.9,
            top_k: 50,
            repeat_penalty: 1.2,
        }
    }

    /// Defaults used for free-form prompt continuation.
    pub fn creative(max_tokens: u32) -> Self {
        Self {
            max_tokens,
            temperature: 0.8,
            top_p: 0.95,
            top_k: 50,
            repeat_penalty: 1.0,
        }
    }
}

impl Default for SamplingParams {
    fn default() -> Self {
        Self::dialogue(150, 0.7)
    }
}

/// Extractive answer located inside the supplied context.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QaAnswer {
    pub answer: String,
    pub confidence: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end: Option<usize>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelMetadata {
    pub model: String,
    pub endpoint: String,
    pub task: String,
}

#[async_trait]
pub trait DialogueModel: Send + Sync {
    /// Produces the next assistant turn for the given conversation window.
    async fn reply(&self, history: &[Message], params: &SamplingParams) -> anyhow::Result<String>;

    /// Identifier of the model currently answering.
    fn model_name(&self) -> String;

    fn metadata(&self) -> ModelMetadata;
}

#[async_trait]
pub trait QuestionAnswerer: Send + Sync {
    async fn answer(&self, question: &str, context: &str) -> anyhow::Result<QaAnswer>;

    fn metadata(&self) -> ModelMetadata;
}

#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Returns `num_sequences` continuations, each prefixed with the prompt.
    async fn generate(
        &self,
        prompt: &str,
        params: &SamplingParams,
        num_sequences: u32,
    ) -> anyhow::Result<Vec<String>>;

    fn metadata(&self) -> ModelMetadata;
}
