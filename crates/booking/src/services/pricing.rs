//! Pricing service trait and flat-fare implementation.

use std::collections::HashMap;

use async_trait::async_trait;
use common::Money;
use serde::{Deserialize, Serialize};

use crate::error::{BookingError, Result};
use crate::trip::Trip;

/// Caller-supplied pricing inputs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PricingRequest {
    #[serde(default)]
    pub voucher_code: Option<String>,
}

impl PricingRequest {
    pub fn with_voucher(code: impl Into<String>) -> Self {
        Self {
            voucher_code: Some(code.into()),
        }
    }
}

/// Trait for quoting the total of a booking.
#[async_trait]
pub trait PricingService: Send + Sync {
    /// Quotes `seat_count` seats on `trip`.
    async fn quote(&self, trip: &Trip, seat_count: usize, request: &PricingRequest)
    -> Result<Money>;
}

/// Charges the trip's base fare per seat, minus an optional voucher.
#[derive(Debug, Clone, Default)]
pub struct FlatFarePricing {
    /// Voucher code to percentage off.
    vouchers: HashMap<String, u8>,
}

impl FlatFarePricing {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a voucher worth `percent_off` percent. Values above 100 are capped.
    pub fn with_voucher(mut self, code: impl Into<String>, percent_off: u8) -> Self {
        self.vouchers.insert(code.into(), percent_off.min(100));
        self
    }
}

#[async_trait]
impl PricingService for FlatFarePricing {
    async fn quote(
        &self,
        trip: &Trip,
        seat_count: usize,
        request: &PricingRequest,
    ) -> Result<Money> {
        let gross = trip.base_price.times(seat_count);
        let Some(code) = request.voucher_code.as_deref() else {
            return Ok(gross);
        };
        let percent_off = self
            .vouchers
            .get(code)
            .copied()
            .ok_or_else(|| BookingError::InvalidRequest(format!("unknown voucher code: {code}")))?;
        Ok(gross.saturating_sub(gross.percent(percent_off)))
    }
}
