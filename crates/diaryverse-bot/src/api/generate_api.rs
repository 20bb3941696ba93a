//! Free-form text generation from a prompt.

use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::info;
use validator::Validate;

use super::error::ApiError;
use crate::shared_state::AppState;

const MISSING_PROMPT: &str = "Missing 'prompt' in request body";

fn default_max_length() -> u32 { 100 }
fn default_num_sequences() -> u32 { 1 }

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct GenerateRequest {
    pub prompt: Option<String>,
    #[validate(range(min = 1, max = 4096))]
    pub max_length: Option<u32>,
    #[validate(range(min = 1, max = 10))]
    pub num_sequences: Option<u32>,
}

#[derive(Debug, Serialize)]
pub struct GenerateResponse {
    pub results: Vec<String>,
    pub prompt: String,
    pub success: bool,
}

/// POST /generate
pub async fn generate_text(
    State(state): State<AppState>,
    payload: Result<Json<GenerateRequest>, JsonRejection>,
) -> Result<Json<GenerateResponse>, ApiError> {
    let Json(req) = payload.map_err(|_| ApiError::bad_request(MISSING_PROMPT))?;
    req.validate()?;

    let prompt = req.prompt.ok_or_else(|| ApiError::bad_request(MISSING_PROMPT))?;
    let max_length = req.max_length.unwrap_or_else(default_max_length);
    let num_sequences = req.num_sequences.unwrap_or_else(default_num_sequences);

    info!("Generating {} sequence(s) of up to {} tokens", num_sequences, max_length);
    let results = state.advanced
        .generate_text(&prompt, max_length, num_sequences)
        .await?;

    Ok(Json(GenerateResponse {
        results,
        prompt,
        success: true,
    }))
}
