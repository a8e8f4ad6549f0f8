use axum::extract::{Query, State};
use axum::Json;
use serde::Deserialize;

use crate::api::state::AppState;
use crate::api::ApiError;
use crate::models::{PlayerStats, Snapshot};
use crate::view::{derive_view, SortDirection, SortKey};

/// The current snapshot, exactly as stored.
pub async fn get_stats(State(state): State<AppState>) -> Result<Json<Snapshot>, ApiError> {
    let snapshot = state.store.load().await?;
    Ok(Json(snapshot.as_ref().clone()))
}

#[derive(Debug, Default, Deserialize)]
pub struct ViewParams {
    pub filter: Option<String>,
    pub sort: Option<String>,
    pub order: Option<String>,
}

impl ViewParams {
    fn sort_key(&self) -> Result<SortKey, ApiError> {
        match self.sort.as_deref() {
            None | Some("") => Ok(SortKey::default()),
            Some(s) => s.parse().map_err(ApiError::BadRequest),
        }
    }

    fn direction(&self) -> Result<SortDirection, ApiError> {
        match self.order.as_deref() {
            None | Some("") => Ok(SortDirection::default()),
            Some(s) => s.parse().map_err(ApiError::BadRequest),
        }
    }
}

/// Filtered and sorted projection of the current snapshot.
pub async fn get_view(
    State(state): State<AppState>,
    Query(params): Query<ViewParams>,
) -> Result<Json<Vec<PlayerStats>>, ApiError> {
    let sort_key = params.sort_key()?;
    let direction = params.direction()?;
    let snapshot = state.store.load().await?;

    let rows = derive_view(
        &snapshot,
        params.filter.as_deref().unwrap_or(""),
        sort_key,
        direction,
    );
    Ok(Json(rows))
}
