//! Request DTOs for pricing API endpoints.
//!
//! Quotes take a [`StayRequest`](super::StayRequest) body directly.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Deserialize;

use crate::modification::BookingSnapshot;

use super::models::{PeakPeriod, PricingTiers, ServiceDefinition};

/// Request carrying a booking snapshot, for eligibility and refunds
#[derive(Debug, Deserialize)]
pub struct BookingRequest {
    pub booking: BookingSnapshot,
    #[serde(default)]
    pub as_of: Option<DateTime<Utc>>,
}

/// Request to re-price a booking for new dates
#[derive(Debug, Deserialize)]
pub struct RepriceRequest {
    pub booking: BookingSnapshot,
    pub new_check_in: DateTime<Utc>,
    pub new_check_out: DateTime<Utc>,
    #[serde(default)]
    pub as_of: Option<DateTime<Utc>>,
}

/// Request to validate proposed dates
#[derive(Debug, Deserialize)]
pub struct ValidateDatesRequest {
    pub new_check_in: DateTime<Utc>,
    pub new_check_out: DateTime<Utc>,
    #[serde(default)]
    pub as_of: Option<DateTime<Utc>>,
}

/// Request to split a total into deposit and balance
#[derive(Debug, Deserialize)]
pub struct ScheduleRequest {
    #[serde(with = "rust_decimal::serde::str")]
    pub total: Decimal,
    pub check_in: DateTime<Utc>,
    #[serde(default)]
    pub as_of: Option<DateTime<Utc>>,
}

/// Request to replace the active reference data
#[derive(Debug, Deserialize)]
pub struct ReplaceReferenceRequest {
    pub version: u64,
    pub peak_periods: Vec<PeakPeriod>,
    #[serde(default)]
    pub tiers: PricingTiers,
    pub services: Vec<ServiceDefinition>,
    #[serde(with = "rust_decimal::serde::str")]
    pub entire_dog_daily_rate: Decimal,
}
