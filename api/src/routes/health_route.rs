//! GET /health: liveness plus KB and model status.

use std::sync::Arc;

use axum::extract::State;
use serde::Serialize;

use crate::{
    core::{app_state::AppState, http::response_envelope::ApiResponse},
    error_handler::AppResult,
};

#[derive(Debug, Serialize)]
pub struct HealthData {
    pub status: &'static str,
    pub kb_records: usize,
    /// `live` or `degraded`.
    pub model_mode: &'static str,
}

pub async fn health(State(state): State<Arc<AppState>>) -> AppResult<ApiResponse<HealthData>> {
    Ok(ApiResponse::success(HealthData {
        status: "ok",
        kb_records: state.kb().len()?,
        model_mode: state.triage.gateway().mode_name(),
    }))
}
