//! HTTP server startup and routing
//!
//! The dialogue model is loaded before the listener is bound, so a running
//! server always has a chatbot. QA and text generation load on first use.

use anyhow::Context;
use axum::{
    routing::{get, post},
    Router,
};
use std::time::Duration;
use tower_http::{
    cors::{Any, CorsLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};
use tracing::{info, warn};

use crate::{api, config::Config, metrics, middleware::track_requests, shared_state::AppState};

/// Run the chatbot server until ctrl-c
pub async fn run_server(cfg: Config) -> anyhow::Result<()> {
    crate::telemetry::init_tracing(cfg.debug);
    metrics::init_metrics().context("Failed to register metrics")?;
    cfg.print_config();

    info!("Starting Diaryverse AI Chatbot Server on port {}", cfg.api_port);
    info!("Debug mode: {}", cfg.debug);

    let addr = cfg.api_addr()?;
    let state = AppState::initialize(cfg)
        .await
        .context("Failed to initialize chatbot")?;

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    info!("Listening on {}", addr);

    axum::serve(listener, build_router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}

pub fn build_router(state: AppState) -> Router {
    use axum::http::Method;

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers(Any);

    let timeout = Duration::from_secs(state.config.request_timeout_seconds);

    Router::new()
        .route("/health", get(api::health))
        .route("/chat", post(api::chat))
        .route("/chat/reset", post(api::reset_conversation))
        .route("/chat/history", post(api::get_history))
        .route("/qa", post(api::answer_question))
        .route("/generate", post(api::generate_text))
        .route("/models/info", get(api::models_info))
        .route("/metrics", get(metrics::get_metrics))
        .fallback(api::not_found)
        .layer(axum::middleware::from_fn(track_requests))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .layer(TimeoutLayer::new(timeout))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chatbot::{tests::ScriptedModel, Chatbot, ERROR_REPLY};
    use crate::config::tests::create_test_config;
    use crate::memory::InMemoryConversationStore;
    use crate::model_runtime::{runtime_manager::tests::manager_with, QaAnswer};
    use crate::resolver::tests::StaticTraining;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use serde_json::{json, Value};
    use std::sync::Arc;
    use tower::ServiceExt;

    struct Harness {
        state: AppState,
        model: Arc<ScriptedModel>,
    }

    fn harness_with(model: ScriptedModel, training: StaticTraining, qa: Option<QaAnswer>) -> Harness {
        let model = Arc::new(model);
        let chatbot = Arc::new(Chatbot::new(
            model.clone(),
            Arc::new(InMemoryConversationStore::new(10)),
            1024,
        ));
        let state = AppState::new(
            create_test_config(),
            chatbot,
            Arc::new(training),
            Arc::new(manager_with(qa, false)),
        );
        Harness { state, model }
    }

    fn harness() -> Harness {
        harness_with(ScriptedModel::always("Hi, I'm the bot."), StaticTraining::default(), None)
    }

    async fn send(state: &AppState, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let builder = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(json) => builder
                .header("content-type", "application/json")
                .body(Body::from(json.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = build_router(state.clone()).oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::String(String::from_utf8_lossy(&bytes).into()))
        };
        (status, value)
    }

    #[tokio::test]
    async fn test_health() {
        let h = harness();
        let (status, body) = send(&h.state, "GET", "/health", None).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "healthy");
        assert_eq!(body["service"], "Diaryverse AI Chatbot");
        assert_eq!(body["model_loaded"], true);
        assert!(body["timestamp"].as_str().is_some());
    }

    #[tokio::test]
    async fn test_chat_uses_model_when_untrained() {
        let h = harness();
        let (status, body) = send(&h.state, "POST", "/chat", Some(json!({
            "message": "  Hello! What's your name?  ",
            "userId": "test_user_123",
            "temperature": 0.5,
            "maxLength": 80
        }))).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["response"], "Hi, I'm the bot.");
        assert_eq!(body["userId"], "test_user_123");
        assert_eq!(body["source"], "ai");
        assert_eq!(body["success"], true);

        let seen = h.model.seen.lock().unwrap();
        assert_eq!(seen[0].0[0].content, "Hello! What's your name?");
        assert_eq!(seen[0].1.max_tokens, 80);
        assert_eq!(seen[0].1.temperature, 0.5);
    }

    #[tokio::test]
    async fn test_chat_prefers_trained_answer() {
        let h = harness_with(
            ScriptedModel::always("unused"),
            StaticTraining::with("What is Diaryverse?", "Your digital journal."),
            None,
        );
        let (status, body) = send(&h.state, "POST", "/chat", Some(json!({"message": "What is Diaryverse?"}))).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["response"], "Your digital journal.");
        assert_eq!(body["source"], "training");
        assert_eq!(body["userId"], "default");
        assert!(h.model.seen.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_chat_model_failure_still_answers() {
        let h = harness_with(ScriptedModel::new(vec![]), StaticTraining::default(), None);
        let (status, body) = send(&h.state, "POST", "/chat", Some(json!({"message": "hi"}))).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["response"], ERROR_REPLY);
    }

    #[tokio::test]
    async fn test_chat_validation_errors() {
        let h = harness();

        let (status, body) = send(&h.state, "POST", "/chat", Some(json!({"userId": "u"}))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Missing 'message' in request body");

        let (status, body) = send(&h.state, "POST", "/chat", None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Missing 'message' in request body");

        let (status, body) = send(&h.state, "POST", "/chat", Some(json!({"message": "   "}))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Message cannot be empty");

        let (status, body) = send(&h.state, "POST", "/chat", Some(json!({"message": "hi", "temperature": 5.0}))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].as_str().unwrap().starts_with("Invalid request"));

        assert!(h.model.seen.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_history_and_reset() {
        let h = harness();
        send(&h.state, "POST", "/chat", Some(json!({"message": "first", "userId": "u1"}))).await;

        let (status, body) = send(&h.state, "POST", "/chat/history", Some(json!({"userId": "u1"}))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["history"], json!(["first", "Hi, I'm the bot."]));
        assert_eq!(body["messageCount"], 2);
        assert_eq!(body["userId"], "u1");

        let (status, body) = send(&h.state, "POST", "/chat/reset", Some(json!({"userId": "u1"}))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["message"], "Conversation reset successfully");
        assert_eq!(body["success"], true);

        let (_, body) = send(&h.state, "POST", "/chat/history", Some(json!({"userId": "u1"}))).await;
        assert_eq!(body["messageCount"], 0);
    }

    #[tokio::test]
    async fn test_history_without_body_uses_default_user() {
        let h = harness();
        send(&h.state, "POST", "/chat", Some(json!({"message": "hey"}))).await;

        let (status, body) = send(&h.state, "POST", "/chat/history", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["userId"], "default");
        assert_eq!(body["messageCount"], 2);
    }

    #[tokio::test]
    async fn test_qa() {
        let answer = QaAnswer {
            answer: "a digital journaling platform".into(),
            confidence: 0.87,
            start: Some(14),
            end: Some(43),
        };
        let h = harness_with(ScriptedModel::always("x"), StaticTraining::default(), Some(answer));
        assert!(!h.state.advanced.is_loaded());

        let (status, body) = send(&h.state, "POST", "/qa", Some(json!({
            "question": "What is Diaryverse?",
            "context": "Diaryverse is a digital journaling platform."
        }))).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["answer"], "a digital journaling platform");
        assert_eq!(body["confidence"], 0.87);
        assert_eq!(body["start"], 14);
        assert_eq!(body["end"], 43);
        assert_eq!(body["success"], true);
        assert!(h.state.advanced.is_loaded());
    }

    #[tokio::test]
    async fn test_qa_failure_degrades() {
        let h = harness();
        let (status, body) = send(&h.state, "POST", "/qa", Some(json!({"question": "q", "context": "c"}))).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["answer"], "I couldn't find an answer in the provided context.");
        assert_eq!(body["confidence"], 0.0);
        assert!(body.get("start").is_none());
    }

    #[tokio::test]
    async fn test_qa_missing_fields() {
        let h = harness();
        let (status, body) = send(&h.state, "POST", "/qa", Some(json!({"question": "q"}))).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Missing 'question' or 'context' in request body");
    }

    #[tokio::test]
    async fn test_generate() {
        let h = harness();
        let (status, body) = send(&h.state, "POST", "/generate", Some(json!({
            "prompt": "Today was an amazing day because",
            "maxLength": 80,
            "numSequences": 2
        }))).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["prompt"], "Today was an amazing day because");
        assert_eq!(body["results"].as_array().unwrap().len(), 2);
        assert_eq!(body["success"], true);
    }

    #[tokio::test]
    async fn test_generate_validation() {
        let h = harness();

        let (status, body) = send(&h.state, "POST", "/generate", Some(json!({"maxLength": 10}))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Missing 'prompt' in request body");

        let (status, _) = send(&h.state, "POST", "/generate", Some(json!({"prompt": "p", "numSequences": 0}))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_models_info() {
        let h = harness();
        let (status, body) = send(&h.state, "GET", "/models/info", None).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["chatbot"]["model"], "scripted");
        assert_eq!(body["chatbot"]["loaded"], true);
        assert_eq!(body["advanced_ai"]["loaded"], false);
        assert_eq!(body["advanced_ai"]["qa_model"], "qa-model");
        assert_eq!(body["advanced_ai"]["text_gen_model"], "gen-model");
        assert_eq!(body["success"], true);
    }

    #[tokio::test]
    async fn test_unknown_route() {
        let h = harness();
        let (status, body) = send(&h.state, "GET", "/nope", None).await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "Endpoint not found");
        assert_eq!(body["success"], false);
    }

    #[tokio::test]
    async fn test_metrics_endpoint() {
        metrics::init_metrics().unwrap();
        let h = harness();
        send(&h.state, "GET", "/health", None).await;

        let response = build_router(h.state.clone())
            .oneshot(Request::builder().uri("/metrics").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let text = String::from_utf8_lossy(&bytes);
        assert!(text.contains("requests_total"));
    }
}
