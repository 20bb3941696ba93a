//! Service status endpoints: health, loaded models, unknown routes.

use axum::{
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::Serialize;
use serde_json::json;

use crate::shared_state::AppState;

pub const SERVICE_NAME: &str = "Diaryverse AI Chatbot";

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub service: String,
    pub version: String,
    pub timestamp: String,
    pub model_loaded: bool,
}

#[derive(Debug, Serialize)]
pub struct ChatbotInfo {
    pub model: String,
    pub device: String,
    pub endpoint: String,
    pub loaded: bool,
}

#[derive(Debug, Serialize)]
pub struct AdvancedInfo {
    pub loaded: bool,
    pub qa_model: String,
    pub text_gen_model: String,
}

#[derive(Debug, Serialize)]
pub struct ModelsInfoResponse {
    pub chatbot: ChatbotInfo,
    pub advanced_ai: AdvancedInfo,
    pub success: bool,
}

/// GET /health
pub async fn health() -> Json<HealthResponse> {
    // The router only exists once the dialogue model has loaded
    Json(HealthResponse {
        status: "healthy".to_string(),
        service: SERVICE_NAME.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: chrono::Utc::now().to_rfc3339(),
        model_loaded: true,
    })
}

/// GET /models/info
pub async fn models_info(State(state): State<AppState>) -> Json<ModelsInfoResponse> {
    let meta = state.chatbot.model_metadata();

    Json(ModelsInfoResponse {
        chatbot: ChatbotInfo {
            model: meta.model,
            // Placement is decided by the inference server
            device: "remote".to_string(),
            endpoint: meta.endpoint,
            loaded: true,
        },
        advanced_ai: AdvancedInfo {
            loaded: state.advanced.is_loaded(),
            qa_model: state.advanced.qa_model().to_string(),
            text_gen_model: state.advanced.text_gen_model().to_string(),
        },
        success: true,
    })
}

pub async fn not_found() -> impl IntoResponse {
    (
        StatusCode::NOT_FOUND,
        Json(json!({
            "error": "Endpoint not found",
            "success": false
        })),
    )
}
