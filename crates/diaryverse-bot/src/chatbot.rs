//! Conversational front of the service: per-user history plus the dialogue model.

use std::sync::Arc;
use std::time::Instant;
use tracing::{error, info};

use crate::memory::{ConversationStore, Message};
use crate::metrics;
use crate::model_runtime::{DialogueModel, ModelMetadata, SamplingParams};

pub const EMPTY_REPLY_PROMPT: &str = "I'm here to help! Could you please rephrase your question?";
pub const ERROR_REPLY: &str = "I apologize, but I encountered an error. Please try again.";

pub struct Chatbot {
    model: Arc<dyn DialogueModel>,
    store: Arc<dyn ConversationStore>,
    max_context_tokens: u32,
}

impl Chatbot {
    pub fn new(
        model: Arc<dyn DialogueModel>,
        store: Arc<dyn ConversationStore>,
        max_context_tokens: u32,
    ) -> Self {
        Self {
            model,
            store,
            max_context_tokens,
        }
    }

    /// Replies to `message` in the context of the user's recent history.
    ///
    /// Never fails: an empty model answer becomes a rephrase prompt and a
    /// model error becomes an apology. Only non-empty answers are remembered.
    pub async fn generate_response(
        &self,
        message: &str,
        user_id: &str,
        max_length: u32,
        temperature: f32,
    ) -> String {
        self.store.append(user_id, Message::user(message));
        metrics::set_tracked_conversations(self.store.user_count());

        let history = self.store.history(user_id);
        let params = SamplingParams::dialogue(max_length.min(self.max_context_tokens), temperature);

        let started = Instant::now();
        let result = self.model.reply(&history, &params).await;
        metrics::observe_inference("dialogue", started.elapsed().as_secs_f64());

        match result {
            Ok(reply) => {
                let reply = reply.trim();
                if reply.is_empty() {
                    EMPTY_REPLY_PROMPT.to_string()
                } else {
                    self.store.append(user_id, Message::assistant(reply));
                    reply.to_string()
                }
            }
            Err(e) => {
                error!("Error generating response: {}", e);
                ERROR_REPLY.to_string()
            }
        }
    }

    pub fn reset_conversation(&self, user_id: &str) {
        if self.store.reset(user_id) {
            info!("Reset conversation for user: {}", user_id);
        }
    }

    /// Message contents of the user's history, oldest first.
    pub fn conversation_history(&self, user_id: &str) -> Vec<String> {
        self.store
            .history(user_id)
            .into_iter()
            .map(|m| m.content)
            .collect()
    }

    pub fn clear_all_conversations(&self) {
        self.store.clear_all();
        metrics::set_tracked_conversations(0);
        info!("Cleared all conversations");
    }

    pub fn model_name(&self) -> String {
        self.model.model_name()
    }

    pub fn model_metadata(&self) -> ModelMetadata {
        self.model.metadata()
    }
}
