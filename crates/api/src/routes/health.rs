//! Health check endpoint.

use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use serde::Serialize;

use crate::state::AppState;

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub trips: usize,
    pub open_inventories: usize,
}

/// GET /health: liveness plus catalog and inventory counts.
pub async fn check(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        trips: state.catalog.len(),
        open_inventories: state.orchestrator.inventories().trip_ids().len(),
    })
}
