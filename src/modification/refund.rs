//! Cancellation refunds.
//!
//! Two tiers, no pro-rating. The deposit is never refunded. With at least
//! seven days' notice the balance is refunded if it was paid; inside seven
//! days nothing is refunded.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::pricing::days::days_until;

use super::booking::BookingSnapshot;

/// Notice required for the balance to be refunded
pub const FULL_REFUND_NOTICE_DAYS: i64 = 7;

/// Refund owed on cancelling a booking
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RefundBreakdown {
    pub total_paid: Decimal,
    pub non_refundable_deposit: Decimal,
    /// Paid amounts other than the deposit
    pub refund_eligible: Decimal,
    pub refund_amount: Decimal,
    pub days_until_check_in: i64,
    pub timeline: String,
}

pub fn calculate_refund(booking: &BookingSnapshot, now: DateTime<Utc>) -> RefundBreakdown {
    let days = days_until(booking.check_in, now);

    let paid = |amount: Decimal, is_paid: bool| if is_paid { amount } else { Decimal::ZERO };
    let total_paid = paid(booking.deposit_amount, booking.deposit_paid)
        + paid(booking.balance_amount, booking.balance_paid);
    let refund_eligible = paid(booking.balance_amount, booking.balance_paid);

    let (refund_amount, timeline) = if days >= FULL_REFUND_NOTICE_DAYS {
        (refund_eligible, "Cancelled 7+ days before check-in")
    } else {
        (Decimal::ZERO, "Cancelled less than 7 days before check-in")
    };

    RefundBreakdown {
        total_paid,
        non_refundable_deposit: booking.deposit_amount,
        refund_eligible,
        refund_amount,
        days_until_check_in: days,
        timeline: timeline.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modification::fixtures::booking;
    use chrono::{Duration, TimeZone};
    use rust_decimal_macros::dec;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 1, 10, 0, 0).unwrap()
    }

    fn booking_in(days: i64, balance_paid: bool) -> BookingSnapshot {
        let mut snapshot = booking();
        snapshot.check_in = now() + Duration::days(days);
        snapshot.balance_paid = balance_paid;
        snapshot
    }

    #[test]
    fn test_paid_balance_refunded_with_notice() {
        let refund = calculate_refund(&booking_in(10, true), now());

        assert_eq!(refund.total_paid, dec!(425));
        assert_eq!(refund.non_refundable_deposit, dec!(85));
        assert_eq!(refund.refund_eligible, dec!(340));
        assert_eq!(refund.refund_amount, dec!(340));
        assert_eq!(refund.timeline, "Cancelled 7+ days before check-in");
    }

    #[test]
    fn test_unpaid_balance_refunds_nothing() {
        for days in [7, 8, 30, 365] {
            let refund = calculate_refund(&booking_in(days, false), now());
            assert_eq!(refund.refund_amount, dec!(0), "days = {}", days);
            assert_eq!(refund.total_paid, dec!(85));
        }
    }

    #[test]
    fn test_late_cancellation_refunds_nothing() {
        let refund = calculate_refund(&booking_in(6, true), now());

        assert_eq!(refund.total_paid, dec!(425));
        assert_eq!(refund.refund_amount, dec!(0));
        assert_eq!(refund.days_until_check_in, 6);
        assert_eq!(refund.timeline, "Cancelled less than 7 days before check-in");
    }

    #[test]
    fn test_deposit_never_refunded() {
        for days in [-2, 0, 6, 7, 45] {
            for balance_paid in [true, false] {
                let snapshot = booking_in(days, balance_paid);
                let refund = calculate_refund(&snapshot, now());
                assert!(refund.refund_amount <= refund.total_paid - snapshot.deposit_amount);
            }
        }
    }
}
