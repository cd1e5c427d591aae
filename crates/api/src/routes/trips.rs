//! Trip availability, seat hold and trip completion endpoints.

use std::collections::BTreeMap;
use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, State};
use chrono::{DateTime, Utc};
use common::{SeatId, SessionId, TripId};
use serde::{Deserialize, Serialize};

use super::parse_id;
use crate::error::ApiError;
use crate::identity::Caller;
use crate::state::AppState;

// -- Request types --

#[derive(Deserialize)]
pub struct HoldRequest {
    pub seat_ids: Vec<SeatId>,
    pub session_id: SessionId,
    pub ttl_seconds: Option<i64>,
}

#[derive(Deserialize)]
pub struct ReleaseRequest {
    pub session_id: SessionId,
}

// -- Response types --

#[derive(Serialize)]
pub struct AvailabilityResponse {
    pub trip_id: String,
    pub capacity: usize,
    pub available: usize,
    pub seats: BTreeMap<SeatId, &'static str>,
}

#[derive(Serialize)]
pub struct HoldResponse {
    pub hold_token: String,
    pub seat_ids: Vec<SeatId>,
    pub expires_at: DateTime<Utc>,
}

#[derive(Serialize)]
pub struct ReleaseResponse {
    pub status: &'static str,
    pub released: usize,
}

#[derive(Serialize)]
pub struct CompleteTripResponse {
    pub trip_id: String,
    pub completed_bookings: usize,
}

/// Saturates client TTLs that overflow a `Duration`; the hold policy then
/// clamps or rejects them.
fn requested_ttl(seconds: i64) -> chrono::Duration {
    chrono::Duration::try_seconds(seconds).unwrap_or(if seconds < 0 {
        chrono::Duration::MIN
    } else {
        chrono::Duration::MAX
    })
}

// -- Handlers --

/// GET /trips/{trip_id}/availability: seat-by-seat state of a trip.
#[tracing::instrument(skip(state))]
pub async fn availability(
    State(state): State<Arc<AppState>>,
    Path(trip_id): Path<String>,
) -> Result<Json<AvailabilityResponse>, ApiError> {
    let trip_id: TripId = parse_id("trip", &trip_id)?;
    let view = state.orchestrator.availability(trip_id).await?;

    Ok(Json(AvailabilityResponse {
        trip_id: view.trip_id.to_string(),
        capacity: view.capacity,
        available: view.available,
        seats: view
            .seats
            .into_iter()
            .map(|(seat_id, seat)| (seat_id, seat.as_str()))
            .collect(),
    }))
}

/// POST /trips/{trip_id}/holds: hold seats for a browsing session.
#[tracing::instrument(skip(state, req), fields(session_id = %req.session_id))]
pub async fn hold(
    State(state): State<Arc<AppState>>,
    Path(trip_id): Path<String>,
    Json(req): Json<HoldRequest>,
) -> Result<Json<HoldResponse>, ApiError> {
    let trip_id: TripId = parse_id("trip", &trip_id)?;
    let ttl = req
        .ttl_seconds
        .map(requested_ttl)
        .unwrap_or(state.default_hold_ttl);

    let token = state
        .orchestrator
        .hold_seats(trip_id, &req.seat_ids, &req.session_id, ttl)
        .await?;

    Ok(Json(HoldResponse {
        hold_token: token.token.to_string(),
        seat_ids: token.seat_ids,
        expires_at: token.expires_at,
    }))
}

/// POST /trips/{trip_id}/holds/release: drop every hold of a session.
#[tracing::instrument(skip(state, req), fields(session_id = %req.session_id))]
pub async fn release(
    State(state): State<Arc<AppState>>,
    Path(trip_id): Path<String>,
    Json(req): Json<ReleaseRequest>,
) -> Result<Json<ReleaseResponse>, ApiError> {
    let trip_id: TripId = parse_id("trip", &trip_id)?;
    let released = state
        .orchestrator
        .release_holds(trip_id, &req.session_id)
        .await?;
    Ok(Json(ReleaseResponse {
        status: "ok",
        released,
    }))
}

/// POST /trips/{trip_id}/complete: close a trip and complete its bookings.
#[tracing::instrument(skip(state))]
pub async fn complete(
    State(state): State<Arc<AppState>>,
    Caller(actor): Caller,
    Path(trip_id): Path<String>,
) -> Result<Json<CompleteTripResponse>, ApiError> {
    let trip_id: TripId = parse_id("trip", &trip_id)?;
    let completed = state.orchestrator.complete_trip(actor, trip_id).await?;
    Ok(Json(CompleteTripResponse {
        trip_id: trip_id.to_string(),
        completed_bookings: completed.len(),
    }))
}
