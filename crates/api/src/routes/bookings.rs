//! Booking create, confirm, cancel and lookup endpoints.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use booking::{Booking, CreateBooking, Passenger, PaymentOutcome, PricingRequest};
use chrono::{DateTime, Utc};
use common::{BookingId, SeatId, SessionId, TripId};
use serde::{Deserialize, Serialize};

use super::parse_id;
use crate::error::ApiError;
use crate::identity::Caller;
use crate::state::AppState;

const DEFAULT_CANCEL_REASON: &str = "cancelled by request";

// -- Request types --

#[derive(Deserialize)]
pub struct CreateBookingRequest {
    pub trip_id: TripId,
    pub seat_ids: Vec<SeatId>,
    pub session_id: Option<SessionId>,
    #[serde(default)]
    pub passengers: Vec<Passenger>,
    pub voucher_code: Option<String>,
}

#[derive(Deserialize)]
pub struct ConfirmRequest {
    pub payment_outcome: PaymentOutcome,
}

#[derive(Deserialize, Default)]
pub struct CancelRequest {
    pub reason: Option<String>,
}

// -- Response types --

#[derive(Serialize)]
pub struct BookingCreatedResponse {
    pub booking_id: String,
    pub status: String,
    pub total_cents: i64,
}

#[derive(Serialize)]
pub struct ConfirmResponse {
    pub booking_id: String,
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub booking_code: Option<String>,
}

#[derive(Serialize)]
pub struct CancelResponse {
    pub booking_id: String,
    pub status: String,
    pub refund_cents: i64,
}

#[derive(Serialize)]
pub struct BookingResponse {
    pub booking_id: String,
    pub trip_id: String,
    pub status: String,
    pub seat_ids: Vec<SeatId>,
    pub passengers: Vec<Passenger>,
    pub total_cents: i64,
    pub booking_code: Option<String>,
    pub refund_cents: Option<i64>,
    pub cancellation_reason: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Booking> for BookingResponse {
    fn from(b: Booking) -> Self {
        Self {
            booking_id: b.id.to_string(),
            trip_id: b.trip_id.to_string(),
            status: b.status.to_string(),
            seat_ids: b.seat_ids,
            passengers: b.passengers,
            total_cents: b.total_amount.cents(),
            booking_code: b.booking_code,
            refund_cents: b.refund_amount.map(|m| m.cents()),
            cancellation_reason: b.cancellation_reason,
            created_at: b.created_at,
            updated_at: b.updated_at,
        }
    }
}

// -- Handlers --

/// POST /bookings: commit seats into a pending booking.
#[tracing::instrument(skip(state, req), fields(trip_id = %req.trip_id))]
pub async fn create(
    State(state): State<Arc<AppState>>,
    Caller(actor): Caller,
    Json(req): Json<CreateBookingRequest>,
) -> Result<(StatusCode, Json<BookingCreatedResponse>), ApiError> {
    let mut cmd = CreateBooking::new(req.trip_id, req.seat_ids).with_passengers(req.passengers);
    if let Some(session_id) = req.session_id {
        cmd = cmd.with_session(session_id);
    }
    if let Some(code) = req.voucher_code {
        cmd = cmd.with_pricing(PricingRequest::with_voucher(code));
    }

    let booking = state.orchestrator.create_booking(actor, cmd).await?;

    Ok((
        StatusCode::CREATED,
        Json(BookingCreatedResponse {
            booking_id: booking.id.to_string(),
            status: booking.status.to_string(),
            total_cents: booking.total_amount.cents(),
        }),
    ))
}

/// GET /bookings/{id}: load one booking.
#[tracing::instrument(skip(state))]
pub async fn get(
    State(state): State<Arc<AppState>>,
    Caller(actor): Caller,
    Path(id): Path<String>,
) -> Result<Json<BookingResponse>, ApiError> {
    let booking_id: BookingId = parse_id("booking", &id)?;
    let booking = state.orchestrator.get_booking(actor, booking_id).await?;
    Ok(Json(booking.into()))
}

/// POST /bookings/{id}/confirm: apply the payment outcome.
#[tracing::instrument(skip(state, req))]
pub async fn confirm(
    State(state): State<Arc<AppState>>,
    Caller(actor): Caller,
    Path(id): Path<String>,
    Json(req): Json<ConfirmRequest>,
) -> Result<Json<ConfirmResponse>, ApiError> {
    let booking_id: BookingId = parse_id("booking", &id)?;
    let booking = state
        .orchestrator
        .confirm_booking(actor, booking_id, req.payment_outcome)
        .await?;

    Ok(Json(ConfirmResponse {
        booking_id: booking.id.to_string(),
        status: booking.status.to_string(),
        booking_code: booking.booking_code,
    }))
}

/// POST /bookings/{id}/cancel: cancel and refund per policy.
#[tracing::instrument(skip(state, req))]
pub async fn cancel(
    State(state): State<Arc<AppState>>,
    Caller(actor): Caller,
    Path(id): Path<String>,
    Json(req): Json<CancelRequest>,
) -> Result<Json<CancelResponse>, ApiError> {
    let booking_id: BookingId = parse_id("booking", &id)?;
    let reason = req.reason.as_deref().unwrap_or(DEFAULT_CANCEL_REASON);
    let booking = state
        .orchestrator
        .cancel_booking(actor, booking_id, reason)
        .await?;

    Ok(Json(CancelResponse {
        booking_id: booking.id.to_string(),
        status: booking.status.to_string(),
        refund_cents: booking.refund_amount.map(|m| m.cents()).unwrap_or_default(),
    }))
}
