//! API endpoints for chatting and per-user conversation management

use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::info;
use validator::Validate;

use super::error::ApiError;
use crate::resolver::ResponseSource;
use crate::shared_state::AppState;
use crate::utils::{preview, text_utils::non_blank};

pub const DEFAULT_USER: &str = "default";

fn default_temperature() -> f32 { 0.7 }
fn default_max_length() -> u32 { 150 }

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ChatRequest {
    pub message: Option<String>,
    pub user_id: Option<String>,
    #[validate(range(min = 0.0, max = 2.0))]
    pub temperature: Option<f32>,
    #[validate(range(min = 1, max = 4096))]
    pub max_length: Option<u32>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatResponse {
    pub response: String,
    pub timestamp: String,
    pub user_id: String,
    pub success: bool,
    pub source: ResponseSource,
}

/// Body of `/chat/reset` and `/chat/history`; the whole body is optional.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserRequest {
    pub user_id: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResetResponse {
    pub message: String,
    pub user_id: String,
    pub success: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryResponse {
    pub history: Vec<String>,
    pub user_id: String,
    pub message_count: usize,
    pub success: bool,
}

fn user_or_default(user_id: Option<String>) -> String {
    user_id.unwrap_or_else(|| DEFAULT_USER.to_string())
}

/// POST /chat: trained answer if one matches, otherwise the dialogue model
pub async fn chat(
    State(state): State<AppState>,
    payload: Result<Json<ChatRequest>, JsonRejection>,
) -> Result<Json<ChatResponse>, ApiError> {
    let Json(req) = payload.map_err(|_| ApiError::bad_request("Missing 'message' in request body"))?;
    req.validate()?;

    let raw_message = req.message
        .ok_or_else(|| ApiError::bad_request("Missing 'message' in request body"))?;
    let message = non_blank(&raw_message)
        .ok_or_else(|| ApiError::bad_request("Message cannot be empty"))?;

    let user_id = user_or_default(req.user_id);
    let temperature = req.temperature.unwrap_or_else(default_temperature);
    let max_length = req.max_length.unwrap_or_else(default_max_length);

    info!("Received message from user {}: {}...", user_id, preview(message, 50));

    let resolution = state.resolver
        .resolve(message, &user_id, max_length, temperature)
        .await;

    Ok(Json(ChatResponse {
        response: resolution.response,
        timestamp: chrono::Utc::now().to_rfc3339(),
        user_id,
        success: true,
        source: resolution.source,
    }))
}

/// POST /chat/reset: forget a user's conversation
pub async fn reset_conversation(
    State(state): State<AppState>,
    payload: Option<Json<UserRequest>>,
) -> Json<ResetResponse> {
    let req = payload.map(|Json(r)| r).unwrap_or_default();
    let user_id = user_or_default(req.user_id);

    state.chatbot.reset_conversation(&user_id);

    Json(ResetResponse {
        message: "Conversation reset successfully".to_string(),
        user_id,
        success: true,
    })
}

/// POST /chat/history: a user's remembered messages, oldest first
pub async fn get_history(
    State(state): State<AppState>,
    payload: Option<Json<UserRequest>>,
) -> Json<HistoryResponse> {
    let req = payload.map(|Json(r)| r).unwrap_or_default();
    let user_id = user_or_default(req.user_id);

    let history = state.chatbot.conversation_history(&user_id);

    Json(HistoryResponse {
        message_count: history.len(),
        history,
        user_id,
        success: true,
    })
}
