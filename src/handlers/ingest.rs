//! Feed ingestion handler

use axum::{
    extract::{rejection::QueryRejection, Query, State},
    Json,
};

use crate::{AppState, AppResult};
use crate::models::{IngestParams, IngestResponse};
use crate::services::ingest;

/// Pull one page of subscribed pulses into the store
pub async fn pull(
    State(state): State<AppState>,
    params: Result<Query<IngestParams>, QueryRejection>,
) -> AppResult<Json<IngestResponse>> {
    let Query(params) = params?;
    let page = params.page.unwrap_or(1).max(1);
    let threats = ingest::ingest_page(&state.feed, state.store.as_ref(), page).await?;

    Ok(Json(IngestResponse {
        message: "Data saved successfully!",
        threats,
    }))
}
