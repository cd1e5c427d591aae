//! HTTP route handlers.

pub mod bookings;
pub mod health;
pub mod metrics;
pub mod trips;

use std::str::FromStr;

use crate::error::ApiError;

/// Parses a path segment into a typed id.
pub(crate) fn parse_id<T>(kind: &str, raw: &str) -> Result<T, ApiError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    raw.parse()
        .map_err(|e| ApiError::BadRequest(format!("Invalid {kind} id: {e}")))
}
