//! Tag search handler

use axum::{
    extract::{rejection::QueryRejection, Query, State},
    response::{IntoResponse, Response},
    Json,
};

use crate::{AppState, AppError, AppResult};
use crate::models::{AnswerResponse, SearchParams, ThreatMatch};
use crate::services::matcher::{matched_tag, MatchError};

pub const NO_DATA_FOUND: &str = "No data found for this query.";

/// Search stored threats by tag
pub async fn search(
    State(state): State<AppState>,
    params: Result<Query<SearchParams>, QueryRejection>,
) -> AppResult<Response> {
    let Query(params) = params?;
    let query = params.query
        .ok_or_else(|| AppError::ValidationError(MatchError::EmptyQuery.to_string()))?;

    let (terms, threats) = state.matcher.find(&query).await?;

    if threats.is_empty() {
        return Ok(Json(AnswerResponse { answer: NO_DATA_FOUND.to_string() }).into_response());
    }

    let matches: Vec<ThreatMatch> = threats
        .into_iter()
        .map(|threat| ThreatMatch {
            matched_tag: matched_tag(&threat, &terms).map(str::to_string),
            name: threat.name,
            description: threat.description,
        })
        .collect();

    Ok(Json(matches).into_response())
}
