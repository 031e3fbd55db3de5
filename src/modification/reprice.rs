//! Price re-derivation when a booking's dates change.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::pricing::models::ReferenceData;
use crate::pricing::{compute_price, PriceQuote};

use super::booking::BookingSnapshot;

/// Pricing as stored on the booking
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredPricing {
    /// Inclusive day count recorded at booking time
    pub total_days: i64,
    pub total_price: Decimal,
    pub is_peak_period: bool,
}

/// Old versus re-derived pricing for proposed dates
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceComparison {
    pub old: StoredPricing,
    pub new: PriceQuote,
    /// New total minus old total
    pub price_difference: Decimal,
}

/// Re-price the booking's persisted selections for new dates.
///
/// The old side reports the booking's stored `total_days`, which used the
/// inclusive convention, while the new quote counts nights. The two day
/// counts are reported as-is and are not comparable one-to-one.
pub fn recalculate_booking_price(
    booking: &BookingSnapshot,
    new_check_in: DateTime<Utc>,
    new_check_out: DateTime<Utc>,
    reference: &ReferenceData,
) -> PriceComparison {
    let request = booking.to_stay_request(new_check_in, new_check_out, &reference.services);
    let quote = compute_price(&request, reference);
    let price_difference = quote.total - booking.total_price;

    debug!(
        booking_id = ?booking.id,
        old_total = %booking.total_price,
        new_total = %quote.total,
        "Re-derived booking price for new dates"
    );

    PriceComparison {
        old: StoredPricing {
            total_days: booking.total_days,
            total_price: booking.total_price,
            is_peak_period: booking.is_peak_period,
        },
        new: quote,
        price_difference,
    }
}
