//! Shared application state handed to every axum handler.

use std::sync::Arc;
use std::time::Duration;
use tracing::info;

use crate::{
    chatbot::Chatbot,
    config::Config,
    memory::InMemoryConversationStore,
    model_runtime::{AdvancedRuntimes, DialogueRuntime, QaRuntime, RuntimeManager, TextGenRuntime},
    resolver::ResponseResolver,
    training::{TrainedAnswers, TrainingClient},
};

/// Cloned into each request; every field is reference counted.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub chatbot: Arc<Chatbot>,
    pub resolver: Arc<ResponseResolver>,
    pub advanced: Arc<RuntimeManager>,
}

impl AppState {
    pub fn new(
        config: Config,
        chatbot: Arc<Chatbot>,
        training: Arc<dyn TrainedAnswers>,
        advanced: Arc<RuntimeManager>,
    ) -> Self {
        let resolver = Arc::new(ResponseResolver::new(training, chatbot.clone()));
        Self {
            config: Arc::new(config),
            chatbot,
            resolver,
            advanced,
        }
    }

    /// Wires the HTTP-backed runtimes described by `config`.
    ///
    /// The dialogue model is loaded up front; a failure here is fatal. QA and
    /// text generation are only constructed when first requested.
    pub async fn initialize(config: Config) -> anyhow::Result<Self> {
        info!("Loading AI models... This may take a minute on first run.");
        info!("Initializing chatbot...");

        let generate_timeout = Duration::from_secs(config.generate_timeout_seconds);
        let dialogue = DialogueRuntime::new(
            config.model_backend_url.clone(),
            config.dialogue_model.clone(),
            config.dialogue_fallback_model.clone(),
            generate_timeout,
        )?;
        dialogue.load().await?;

        let store = Arc::new(InMemoryConversationStore::new(config.history_window));
        let chatbot = Arc::new(Chatbot::new(Arc::new(dialogue), store, config.max_context_tokens));
        info!("Chatbot ready!");

        let training = Arc::new(TrainingClient::new(
            config.training_query_url(),
            Duration::from_secs(config.training_query_timeout_seconds),
        )?);

        let qa_url = config.qa_backend_url.clone();
        let qa_model = config.qa_model.clone();
        let gen_url = config.model_backend_url.clone();
        let gen_model = config.text_gen_model.clone();
        let advanced = Arc::new(RuntimeManager::new(
            config.qa_model.clone(),
            config.text_gen_model.clone(),
            move || {
                Ok(AdvancedRuntimes {
                    qa: Arc::new(QaRuntime::new(qa_url.clone(), qa_model.clone(), generate_timeout)?),
                    text_gen: Arc::new(TextGenRuntime::new(gen_url.clone(), gen_model.clone(), generate_timeout)?),
                })
            },
        ));

        Ok(Self::new(config, chatbot, training, advanced))
    }
}
