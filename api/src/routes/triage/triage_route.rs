//! POST /triage: classifies a support ticket.

use std::sync::Arc;

use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
};
use triage_core::TriageResult;

use crate::{
    core::app_state::AppState,
    error_handler::{AppError, AppResult},
    routes::triage::triage_request::TriageRequest,
};

/// Handler: POST /triage
///
/// # Example
/// ```bash
/// curl -X POST http://127.0.0.1:8000/triage \
///   -H 'content-type: application/json' \
///   -d '{"description":"Checkout error 500 on mobile"}'
/// ```
pub async fn triage(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<TriageRequest>, JsonRejection>,
) -> AppResult<Json<TriageResult>> {
    let Json(body) = payload?;
    if body.description.trim().is_empty() {
        return Err(AppError::BadRequest("description is required".into()));
    }

    let outcome = state
        .triage
        .triage(&body.description)
        .await
        .map_err(|e| AppError::Internal(e.to_string()))?;

    tracing::debug!(source = ?outcome.source, steps = outcome.trace.len(), "triage finished");
    Ok(Json(outcome.result))
}
