//! Lookup of admin-curated answers on the main backend.
//!
//! The backend exposes `POST /api/chatbot-training/query` taking
//! `{"question": ...}` and answering `{"matched": bool, "answer": ...}`.
//! The lookup is best-effort: every failure means "no trained answer".

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{info, warn};

use crate::utils::preview;

#[async_trait]
pub trait TrainedAnswers: Send + Sync {
    async fn lookup(&self, question: &str) -> Option<String>;
}

#[derive(Debug, Serialize)]
struct TrainingQuery<'a> {
    question: &'a str,
}

#[derive(Debug, Deserialize)]
struct TrainingMatch {
    #[serde(default)]
    matched: bool,
    answer: Option<String>,
}

pub struct TrainingClient {
    query_url: String,
    http_client: reqwest::Client,
}

impl TrainingClient {
    pub fn new(query_url: impl Into<String>, timeout: Duration) -> anyhow::Result<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| anyhow::anyhow!("Failed to build training HTTP client: {}", e))?;

        Ok(Self {
            query_url: query_url.into(),
            http_client,
        })
    }

    async fn query(&self, question: &str) -> anyhow::Result<Option<String>> {
        let response = self.http_client
            .post(&self.query_url)
            .json(&TrainingQuery { question })
            .send()
            .await?;

        if response.status() != reqwest::StatusCode::OK {
            return Ok(None);
        }

        let found: TrainingMatch = response.json().await?;
        if !found.matched {
            return Ok(None);
        }
        Ok(found.answer.filter(|a| !a.trim().is_empty()))
    }
}

#[async_trait]
impl TrainedAnswers for TrainingClient {
    async fn lookup(&self, question: &str) -> Option<String> {
        match self.query(question).await {
            Ok(Some(answer)) => {
                info!("Found trained response for: {}...", preview(question, 50));
                Some(answer)
            }
            Ok(None) => None,
            Err(e) => {
                warn!("Failed to query training data: {}", e);
                None
            }
        }
    }
}
