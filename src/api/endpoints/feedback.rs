//! `POST /v1/feedback`: record how a generated procedure performed.

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::Json;

use crate::api::error::ApiError;
use crate::api::types::{ApiContext, FeedbackRequest, FeedbackResponse};

pub async fn submit(
    State(ctx): State<ApiContext>,
    payload: Result<Json<FeedbackRequest>, JsonRejection>,
) -> Result<Json<FeedbackResponse>, ApiError> {
    let Json(req) = payload?;
    tracing::info!(request_id = %req.request_id, "Received feedback");

    let store = ctx.feedback.clone();
    tokio::task::spawn_blocking(move || {
        store.append(&req.request_id, &req.edits, req.outcome, req.notes.as_deref())
    })
    .await
    .map_err(|e| ApiError::FeedbackWriteFailed(e.to_string()))??;

    Ok(Json(FeedbackResponse { stored: true }))
}
