//! Caller identity taken from request headers.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use booking::Actor;
use common::CustomerId;

use crate::error::ApiError;

pub const ROLE_HEADER: &str = "x-actor-role";
pub const CUSTOMER_HEADER: &str = "x-customer-id";

/// The calling [`Actor`], built once per request.
///
/// A request without a role header is an anonymous customer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Caller(pub Actor);

impl<S: Send + Sync> FromRequestParts<S> for Caller {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let actor = match header(parts, ROLE_HEADER)?.map(str::trim) {
            None | Some("customer") => {
                let customer_id = header(parts, CUSTOMER_HEADER)?
                    .map(|raw| {
                        CustomerId::parse(raw.trim()).map_err(|e| {
                            ApiError::BadRequest(format!("invalid {CUSTOMER_HEADER}: {e}"))
                        })
                    })
                    .transpose()?;
                Actor::Customer { customer_id }
            }
            Some("staff") => Actor::OperatorStaff,
            Some("admin") => Actor::Admin,
            Some(other) => {
                return Err(ApiError::BadRequest(format!("unknown actor role: {other}")));
            }
        };
        Ok(Caller(actor))
    }
}

fn header<'a>(parts: &'a Parts, name: &str) -> Result<Option<&'a str>, ApiError> {
    parts
        .headers
        .get(name)
        .map(|v| {
            v.to_str()
                .map_err(|_| ApiError::BadRequest(format!("invalid {name} header")))
        })
        .transpose()
}
