use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;

use crate::api::state::AppState;
use crate::api::ApiError;
use crate::scheduler::{RefreshState, TriggerOutcome};

/// Start an aggregation cycle in the background.
///
/// Returns 202 with the refresh state, or 409 while a cycle is already in
/// flight (from the timer or an earlier request) or after shutdown.
pub async fn start_refresh(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    match state.scheduler.try_trigger().await {
        TriggerOutcome::Started(_) => {
            let current = state.scheduler.state().await;
            Ok((StatusCode::ACCEPTED, Json(current)))
        }
        TriggerOutcome::Skipped => Err(ApiError::Conflict("Refresh already running".to_string())),
        TriggerOutcome::Closed => Err(ApiError::Conflict(
            "Refresh scheduler is shut down".to_string(),
        )),
    }
}

pub async fn status(State(state): State<AppState>) -> Json<RefreshState> {
    Json(state.scheduler.state().await)
}
