// diaryverse-bot/src/config.rs

use anyhow::{Context, Result};
use std::env;
use std::net::SocketAddr;
use tracing::{info, warn};

#[derive(Debug, Clone)]
pub struct Config {
    pub api_host: String,
    pub api_port: u16,
    pub debug: bool,
    pub backend_api_url: String,
    pub training_query_timeout_seconds: u64,
    pub model_backend_url: String,
    pub dialogue_model: String,
    pub dialogue_fallback_model: String,
    pub qa_backend_url: String,
    pub qa_model: String,
    pub text_gen_model: String,
    pub history_window: usize,
    pub max_context_tokens: u32,
    pub generate_timeout_seconds: u64,
    pub request_timeout_seconds: u64,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        let history_window: usize = env::var("HISTORY_WINDOW")
            .unwrap_or_else(|_| "10".into())
            .parse()
            .context("HISTORY_WINDOW must be a positive integer")?;
        if history_window == 0 {
            return Err(anyhow::anyhow!("HISTORY_WINDOW must be at least 1"));
        }

        let backend_api_url = Self::trim_url(
            env::var("BACKEND_API_URL").unwrap_or_else(|_| "http://localhost:3000".into()),
        );
        let model_backend_url = Self::trim_url(
            env::var("MODEL_BACKEND_URL").unwrap_or_else(|_| "http://127.0.0.1:8081".into()),
        );
        let qa_backend_url = Self::trim_url(
            env::var("QA_BACKEND_URL").unwrap_or_else(|_| "http://127.0.0.1:8082".into()),
        );

        Ok(Self {
            api_host: env::var("API_HOST").unwrap_or_else(|_| "0.0.0.0".into()),
            api_port: env::var("PORT")
                .unwrap_or_else(|_| "5001".into())
                .parse()
                .context("PORT must be a valid port number")?,
            debug: Self::parse_flag(&env::var("DEBUG").unwrap_or_else(|_| "False".into())),
            backend_api_url,
            training_query_timeout_seconds: env::var("TRAINING_QUERY_TIMEOUT_SECONDS")
                .unwrap_or_else(|_| "5".into())
                .parse()
                .context("TRAINING_QUERY_TIMEOUT_SECONDS must be a whole number of seconds")?,
            model_backend_url,
            dialogue_model: env::var("DIALOGUE_MODEL")
                .unwrap_or_else(|_| "microsoft/DialoGPT-medium".into()),
            dialogue_fallback_model: env::var("DIALOGUE_FALLBACK_MODEL")
                .unwrap_or_else(|_| "microsoft/DialoGPT-small".into()),
            qa_backend_url,
            qa_model: env::var("QA_MODEL")
                .unwrap_or_else(|_| "distilbert-base-cased-distilled-squad".into()),
            text_gen_model: env::var("TEXT_GEN_MODEL").unwrap_or_else(|_| "gpt2".into()),
            history_window,
            max_context_tokens: env::var("MAX_CONTEXT_TOKENS")
                .unwrap_or_else(|_| "1024".into())
                .parse()
                .context("MAX_CONTEXT_TOKENS must be a positive integer")?,
            generate_timeout_seconds: env::var("GENERATE_TIMEOUT_SECONDS")
                .unwrap_or_else(|_| "120".into())
                .parse()
                .context("GENERATE_TIMEOUT_SECONDS must be a whole number of seconds")?,
            request_timeout_seconds: env::var("REQUEST_TIMEOUT_SECONDS")
                .unwrap_or_else(|_| "300".into())
                .parse()
                .context("REQUEST_TIMEOUT_SECONDS must be a whole number of seconds")?,
        })
    }

    fn parse_flag(value: &str) -> bool {
        value.trim().eq_ignore_ascii_case("true")
    }

    fn trim_url(url: String) -> String {
        url.trim_end_matches('/').to_string()
    }

    /// Endpoint on the main backend that serves admin-curated answers.
    pub fn training_query_url(&self) -> String {
        format!("{}/api/chatbot-training/query", self.backend_api_url)
    }

    pub fn print_config(&self) {
        info!("Current Configuration:");
        info!("- API: {}:{}", self.api_host, self.api_port);
        info!("- Debug mode: {}", self.debug);
        info!("- Training Query URL: {}", self.training_query_url());
        info!("- Training Query Timeout: {}s", self.training_query_timeout_seconds);
        info!("- Model Backend: {}", self.model_backend_url);
        info!("- Dialogue Model: {} (fallback: {})", self.dialogue_model, self.dialogue_fallback_model);
        info!("- QA Backend: {} ({})", self.qa_backend_url, self.qa_model);
        info!("- Text Generation Model: {}", self.text_gen_model);
        info!("- History Window: {} messages", self.history_window);
        info!("- Max Context Tokens: {}", self.max_context_tokens);
        if self.generate_timeout_seconds > self.request_timeout_seconds {
            warn!(
                "Generation timeout ({}s) exceeds request timeout ({}s); slow replies will be cut off",
                self.generate_timeout_seconds, self.request_timeout_seconds
            );
        }
    }

    pub fn api_addr(&self) -> Result<SocketAddr> {
        format!("{}:{}", self.api_host, self.api_port)
            .parse()
            .with_context(|| format!("Invalid bind address {}:{}", self.api_host, self.api_port))
    }
}
