//! Question answering handler

use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};

use crate::{AppState, AppResult};
use crate::models::{AnswerResponse, AskRequest};

/// Answer a question grounded on matching threats
pub async fn ask(
    State(state): State<AppState>,
    payload: Result<Json<AskRequest>, JsonRejection>,
) -> AppResult<Json<AnswerResponse>> {
    let Json(req) = payload?;
    let query = req.query.unwrap_or_default();
    tracing::debug!("Received query: {}", query);

    let answer = state.answers.answer(&query).await?;
    Ok(Json(AnswerResponse { answer }))
}
