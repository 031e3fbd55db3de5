//! Response DTOs for pricing API endpoints.
//!
//! Amounts are rounded to cents here and serialized as strings.

use rust_decimal::Decimal;
use serde::Serialize;

use crate::modification::{
    DateValidation, ModificationEligibility, ModificationTimeline, PriceComparison,
    RefundBreakdown,
};
use crate::schedule::PaymentSchedule;

use super::calculators::{display_cents as cents, ConstraintLevel, PriceQuote, ServiceLine};

/// A warning as shown to the customer
#[derive(Debug, Serialize)]
pub struct WarningResponse {
    pub level: ConstraintLevel,
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct ServiceLineResponse {
    pub code: String,
    pub name: String,
    #[serde(with = "rust_decimal::serde::str")]
    pub unit_price: Decimal,
    pub quantity: i64,
    #[serde(with = "rust_decimal::serde::str")]
    pub line_total: Decimal,
}

impl From<&ServiceLine> for ServiceLineResponse {
    fn from(line: &ServiceLine) -> Self {
        Self {
            code: line.code.clone(),
            name: line.name.clone(),
            unit_price: cents(line.unit_price),
            quantity: line.quantity,
            line_total: cents(line.line_total),
        }
    }
}

/// Response for a price quote
#[derive(Debug, Serialize)]
pub struct QuoteResponse {
    pub total_days: i64,
    pub tier_name: String,
    #[serde(with = "rust_decimal::serde::str")]
    pub base_daily_rate: Decimal,
    #[serde(with = "rust_decimal::serde::str")]
    pub base_subtotal: Decimal,
    #[serde(with = "rust_decimal::serde::str")]
    pub peak_surcharge: Decimal,
    #[serde(with = "rust_decimal::serde::str")]
    pub dog_surcharge: Decimal,
    #[serde(with = "rust_decimal::serde::str")]
    pub service_charges: Decimal,
    #[serde(with = "rust_decimal::serde::str")]
    pub total: Decimal,
    pub is_peak_period: bool,
    pub peak_period_name: Option<String>,
    pub services: Vec<ServiceLineResponse>,
    pub warnings: Vec<WarningResponse>,
}

impl From<&PriceQuote> for QuoteResponse {
    fn from(quote: &PriceQuote) -> Self {
        let rounded = quote.rounded();
        Self {
            total_days: rounded.total_days,
            tier_name: rounded.tier_name,
            base_daily_rate: rounded.base_daily_rate,
            base_subtotal: rounded.base_subtotal,
            peak_surcharge: rounded.peak_surcharge,
            dog_surcharge: rounded.dog_surcharge,
            service_charges: rounded.service_charges,
            total: rounded.total,
            is_peak_period: rounded.is_peak_period,
            peak_period_name: rounded.peak_period_name,
            services: rounded.services.iter().map(ServiceLineResponse::from).collect(),
            warnings: quote
                .warnings
                .iter()
                .map(|w| WarningResponse {
                    level: w.level(),
                    message: w.to_string(),
                })
                .collect(),
        }
    }
}

/// One eligibility gate
#[derive(Debug, Serialize)]
pub struct GateResponse {
    pub allowed: bool,
    pub reason: Option<String>,
    pub days_until_check_in: i64,
}

impl From<&ModificationEligibility> for GateResponse {
    fn from(result: &ModificationEligibility) -> Self {
        Self {
            allowed: result.allowed,
            reason: result.message(),
            days_until_check_in: result.days_until_check_in,
        }
    }
}

/// Response for booking eligibility
#[derive(Debug, Serialize)]
pub struct EligibilityResponse {
    pub date_change: GateResponse,
    pub cancellation: GateResponse,
    pub service_change: GateResponse,
    pub timeline: ModificationTimeline,
}

/// Response for a cancellation refund
#[derive(Debug, Serialize)]
pub struct RefundResponse {
    #[serde(with = "rust_decimal::serde::str")]
    pub total_paid: Decimal,
    #[serde(with = "rust_decimal::serde::str")]
    pub non_refundable_deposit: Decimal,
    #[serde(with = "rust_decimal::serde::str")]
    pub refund_eligible: Decimal,
    #[serde(with = "rust_decimal::serde::str")]
    pub refund_amount: Decimal,
    pub days_until_check_in: i64,
    pub timeline: String,
}

impl From<&RefundBreakdown> for RefundResponse {
    fn from(refund: &RefundBreakdown) -> Self {
        Self {
            total_paid: cents(refund.total_paid),
            non_refundable_deposit: cents(refund.non_refundable_deposit),
            refund_eligible: cents(refund.refund_eligible),
            refund_amount: cents(refund.refund_amount),
            days_until_check_in: refund.days_until_check_in,
            timeline: refund.timeline.clone(),
        }
    }
}

/// Response for re-pricing a booking
#[derive(Debug, Serialize)]
pub struct ComparisonResponse {
    pub old_total_days: i64,
    #[serde(with = "rust_decimal::serde::str")]
    pub old_total_price: Decimal,
    pub old_is_peak_period: bool,
    pub new: QuoteResponse,
    #[serde(with = "rust_decimal::serde::str")]
    pub price_difference: Decimal,
}

impl From<&PriceComparison> for ComparisonResponse {
    fn from(comparison: &PriceComparison) -> Self {
        Self {
            old_total_days: comparison.old.total_days,
            old_total_price: cents(comparison.old.total_price),
            old_is_peak_period: comparison.old.is_peak_period,
            new: QuoteResponse::from(&comparison.new),
            price_difference: cents(comparison.price_difference),
        }
    }
}

/// Response for date validation
#[derive(Debug, Serialize)]
pub struct DateValidationResponse {
    pub valid: bool,
    pub error: Option<String>,
    pub total_days: Option<i64>,
}

impl From<&DateValidation> for DateValidationResponse {
    fn from(validation: &DateValidation) -> Self {
        Self {
            valid: validation.valid,
            error: validation.error.as_ref().map(ToString::to_string),
            total_days: validation.total_days,
        }
    }
}

/// Response for a payment schedule
#[derive(Debug, Serialize)]
pub struct ScheduleResponse {
    #[serde(with = "rust_decimal::serde::str")]
    pub deposit_amount: Decimal,
    #[serde(with = "rust_decimal::serde::str")]
    pub balance_amount: Decimal,
    pub balance_due_date: Option<chrono::DateTime<chrono::Utc>>,
}

impl From<&PaymentSchedule> for ScheduleResponse {
    fn from(schedule: &PaymentSchedule) -> Self {
        Self {
            deposit_amount: cents(schedule.deposit_amount),
            balance_amount: cents(schedule.balance_amount),
            balance_due_date: schedule.balance_due_date,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub reference_version: u64,
    pub peak_periods: usize,
}

/// Generic pricing error response
#[derive(Debug, Serialize)]
pub struct PricingErrorResponse {
    pub error_type: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}
