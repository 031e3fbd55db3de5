//! Booking modification policy.
//!
//! Decides whether a booking's dates or services may change, whether it may
//! be cancelled and for what refund, and re-derives pricing for new dates.
//! Every function takes "now" explicitly and returns a structured result.

pub mod booking;
pub mod policy;
pub mod refund;
pub mod reprice;

pub use booking::{parse_selected_services, BookingSnapshot, SelectedService};
pub use policy::{
    can_cancel_booking, can_modify_dates, can_modify_services, get_modification_timeline,
    validate_new_dates, DateValidation, DateValidationError, DenialReason,
    ModificationEligibility, ModificationTimeline, TimelineSeverity,
};
pub use refund::{calculate_refund, RefundBreakdown};
pub use reprice::{recalculate_booking_price, PriceComparison, StoredPricing};

#[cfg(test)]
pub(crate) mod fixtures {
    use chrono::{TimeZone, Utc};
    use rust_decimal_macros::dec;
    use uuid::Uuid;

    use super::BookingSnapshot;

    /// Five-day short stay, deposit paid, balance outstanding
    pub(crate) fn booking() -> BookingSnapshot {
        BookingSnapshot {
            id: Some(Uuid::new_v4()),
            check_in: Utc.with_ymd_and_hms(2025, 3, 10, 10, 0, 0).unwrap(),
            check_out: Utc.with_ymd_and_hms(2025, 3, 14, 10, 0, 0).unwrap(),
            total_days: 5,
            total_price: dec!(425),
            deposit_amount: dec!(85),
            deposit_paid: true,
            balance_amount: dec!(340),
            balance_paid: false,
            balance_due_date: None,
            cancelled: false,
            is_peak_period: false,
            selected_services: None,
            dog_surcharge: dec!(0),
        }
    }
}
