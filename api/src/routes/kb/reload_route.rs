//! POST /kb/reload: re-reads the KB file into a fresh snapshot.

use std::sync::Arc;

use axum::extract::State;
use serde::Serialize;

use crate::{
    core::{app_state::AppState, http::response_envelope::ApiResponse},
    error_handler::AppResult,
};

#[derive(Debug, Serialize)]
pub struct ReloadData {
    /// `false` when the KB file was absent and the old snapshot was kept.
    pub reloaded: bool,
    pub records: usize,
}

/// Handler: POST /kb/reload
///
/// A malformed file leaves the current snapshot in place and yields 500.
pub async fn reload_kb(State(state): State<Arc<AppState>>) -> AppResult<ApiResponse<ReloadData>> {
    let data = match state.kb().load_from_path(&state.kb_path)? {
        Some(records) => ReloadData {
            reloaded: true,
            records,
        },
        None => ReloadData {
            reloaded: false,
            records: state.kb().len()?,
        },
    };
    Ok(ApiResponse::success(data))
}
