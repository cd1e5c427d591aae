//! API error types with HTTP response mapping.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use booking::BookingError;
use serde::Serialize;

/// API-level error type that maps to HTTP responses.
#[derive(Debug)]
pub enum ApiError {
    /// Malformed path, header or body value.
    BadRequest(String),
    /// Error raised by the booking core.
    Booking(BookingError),
}

/// JSON error body.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub code: &'static str,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seat_id: Option<String>,
}

impl ApiError {
    pub fn code(&self) -> &'static str {
        match self {
            ApiError::BadRequest(_) => "INVALID_REQUEST",
            ApiError::Booking(err) => err.code(),
        }
    }

    pub fn status(&self) -> StatusCode {
        status_for(self.code())
    }
}

/// HTTP status for a stable error code.
pub fn status_for(code: &str) -> StatusCode {
    match code {
        "SEAT_ALREADY_BOOKED"
        | "SEAT_LOCKED_BY_OTHER"
        | "CAPACITY_EXCEEDED"
        | "TRIP_NOT_BOOKABLE"
        | "CANCELLATION_WINDOW_PASSED"
        | "INVALID_STATE_TRANSITION"
        | "BOOKING_EXPIRED"
        | "CONCURRENCY_CONFLICT" => StatusCode::CONFLICT,
        "BOOKING_NOT_FOUND" | "TRIP_NOT_FOUND" => StatusCode::NOT_FOUND,
        "UNKNOWN_SEAT" | "INVALID_REQUEST" => StatusCode::BAD_REQUEST,
        "NOT_AUTHORIZED" => StatusCode::FORBIDDEN,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let code = self.code();
        let status = status_for(code);
        let (message, seat_id) = match &self {
            ApiError::BadRequest(msg) => (msg.clone(), None),
            ApiError::Booking(err) => (err.to_string(), err.seat_id().map(|s| s.to_string())),
        };

        if status.is_server_error() {
            tracing::error!(code, error = %message, "internal server error");
        }

        let body = ErrorBody {
            code,
            message,
            seat_id,
        };
        (status, axum::Json(body)).into_response()
    }
}

impl From<BookingError> for ApiError {
    fn from(err: BookingError) -> Self {
        ApiError::Booking(err)
    }
}
