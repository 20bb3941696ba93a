//! Two-stage reply resolution: trained answer first, dialogue model second.

use serde::Serialize;
use std::sync::Arc;
use tracing::info;

use crate::chatbot::Chatbot;
use crate::metrics;
use crate::training::TrainedAnswers;
use crate::utils::preview;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ResponseSource {
    Training,
    Ai,
}

impl ResponseSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResponseSource::Training => "training",
            ResponseSource::Ai => "ai",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Resolution {
    pub response: String,
    pub source: ResponseSource,
}

pub struct ResponseResolver {
    training: Arc<dyn TrainedAnswers>,
    chatbot: Arc<Chatbot>,
}

impl ResponseResolver {
    pub fn new(training: Arc<dyn TrainedAnswers>, chatbot: Arc<Chatbot>) -> Self {
        Self { training, chatbot }
    }

    /// Trained answers bypass the model and leave the user's history as is.
    pub async fn resolve(
        &self,
        message: &str,
        user_id: &str,
        max_length: u32,
        temperature: f32,
    ) -> Resolution {
        let resolution = match self.training.lookup(message).await {
            Some(answer) => {
                info!("Using trained response");
                Resolution {
                    response: answer,
                    source: ResponseSource::Training,
                }
            }
            None => {
                info!("No trained response found, using AI model");
                let response = self.chatbot
                    .generate_response(message, user_id, max_length, temperature)
                    .await;
                info!("Generated response: {}...", preview(&response, 50));
                Resolution {
                    response,
                    source: ResponseSource::Ai,
                }
            }
        };

        metrics::inc_reply_source(resolution.source.as_str());
        resolution
    }
}
