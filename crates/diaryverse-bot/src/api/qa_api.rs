//! Question answering over a caller-supplied context.

use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::info;

use super::error::ApiError;
use crate::model_runtime::QaAnswer;
use crate::shared_state::AppState;

const MISSING_FIELDS: &str = "Missing 'question' or 'context' in request body";

#[derive(Debug, Deserialize)]
pub struct QaRequest {
    pub question: Option<String>,
    pub context: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct QaResponse {
    #[serde(flatten)]
    pub answer: QaAnswer,
    pub success: bool,
}

/// POST /qa
pub async fn answer_question(
    State(state): State<AppState>,
    payload: Result<Json<QaRequest>, JsonRejection>,
) -> Result<Json<QaResponse>, ApiError> {
    let Json(req) = payload.map_err(|_| ApiError::bad_request(MISSING_FIELDS))?;
    let (question, context) = match (req.question, req.context) {
        (Some(q), Some(c)) => (q, c),
        _ => return Err(ApiError::bad_request(MISSING_FIELDS)),
    };

    info!("QA request: {} chars of context", context.len());
    let answer = state.advanced.answer_question(&question, &context).await?;

    Ok(Json(QaResponse {
        answer,
        success: true,
    }))
}
