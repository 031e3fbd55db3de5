//! Eligibility gates for changing or cancelling a booking.
//!
//! Three independent gates, each evaluated per request against an injected
//! "now". A denial is a normal outcome carried in the result, not an error.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::pricing::days::{days_until, inclusive_days_between};
use crate::pricing::ConstraintLevel;

use super::booking::BookingSnapshot;

/// Date changes close this many days before check-in
pub const DATE_CHANGE_MIN_DAYS: i64 = 7;

/// Service changes close this many days before check-in
pub const SERVICE_CHANGE_MIN_DAYS: i64 = 3;

/// Longest stay accepted when moving dates, inclusive day convention
pub const MAX_STAY_DAYS: i64 = 365;

/// Timeline advisories move from warning to info at this many days out
const TIMELINE_INFO_DAYS: i64 = 14;

/// Why a request was refused
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "code", rename_all = "snake_case")]
pub enum DenialReason {
    Cancelled,
    CheckInPassed,
    DateChangeWindowClosed { min_days: i64 },
    ServiceChangeWindowClosed { min_days: i64 },
    BalanceOverdue,
}

impl std::fmt::Display for DenialReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DenialReason::Cancelled => write!(f, "Booking has been cancelled"),
            DenialReason::CheckInPassed => write!(f, "Check-in date has already passed"),
            DenialReason::DateChangeWindowClosed { min_days } => write!(
                f,
                "Modifications not allowed within {} days of check-in. Please contact us directly.",
                min_days
            ),
            DenialReason::ServiceChangeWindowClosed { min_days } => write!(
                f,
                "Service changes not allowed within {} days of check-in. Please contact us directly.",
                min_days
            ),
            DenialReason::BalanceOverdue => write!(
                f,
                "Balance payment is overdue. Please pay the outstanding balance before making changes."
            ),
        }
    }
}

/// Outcome of an eligibility gate
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModificationEligibility {
    pub allowed: bool,
    pub reason: Option<DenialReason>,
    pub days_until_check_in: i64,
}

impl ModificationEligibility {
    fn allow(days_until_check_in: i64) -> Self {
        Self {
            allowed: true,
            reason: None,
            days_until_check_in,
        }
    }

    fn deny(reason: DenialReason, days_until_check_in: i64) -> Self {
        Self {
            allowed: false,
            reason: Some(reason),
            days_until_check_in,
        }
    }

    /// Human-readable reason, if denied
    pub fn message(&self) -> Option<String> {
        self.reason.as_ref().map(ToString::to_string)
    }
}

/// Shared cancelled / already-started checks
fn basic_denial(booking: &BookingSnapshot, days: i64) -> Option<DenialReason> {
    if booking.cancelled {
        Some(DenialReason::Cancelled)
    } else if days < 0 {
        Some(DenialReason::CheckInPassed)
    } else {
        None
    }
}

/// Whether the stay dates may still be changed.
pub fn can_modify_dates(booking: &BookingSnapshot, now: DateTime<Utc>) -> ModificationEligibility {
    let days = days_until(booking.check_in, now);

    if let Some(reason) = basic_denial(booking, days) {
        return ModificationEligibility::deny(reason, days);
    }
    if days < DATE_CHANGE_MIN_DAYS {
        return ModificationEligibility::deny(
            DenialReason::DateChangeWindowClosed {
                min_days: DATE_CHANGE_MIN_DAYS,
            },
            days,
        );
    }
    let overdue = booking
        .balance_due_date
        .is_some_and(|due| !booking.balance_paid && due < now);
    if overdue {
        return ModificationEligibility::deny(DenialReason::BalanceOverdue, days);
    }

    ModificationEligibility::allow(days)
}

/// Whether the booking may be cancelled. No minimum notice applies.
pub fn can_cancel_booking(booking: &BookingSnapshot, now: DateTime<Utc>) -> ModificationEligibility {
    let days = days_until(booking.check_in, now);

    match basic_denial(booking, days) {
        Some(reason) => ModificationEligibility::deny(reason, days),
        None => ModificationEligibility::allow(days),
    }
}

/// Whether add-on services may still be changed.
pub fn can_modify_services(
    booking: &BookingSnapshot,
    now: DateTime<Utc>,
) -> ModificationEligibility {
    let days = days_until(booking.check_in, now);

    if let Some(reason) = basic_denial(booking, days) {
        return ModificationEligibility::deny(reason, days);
    }
    if days < SERVICE_CHANGE_MIN_DAYS {
        return ModificationEligibility::deny(
            DenialReason::ServiceChangeWindowClosed {
                min_days: SERVICE_CHANGE_MIN_DAYS,
            },
            days,
        );
    }

    ModificationEligibility::allow(days)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimelineSeverity {
    Error,
    Warning,
    Info,
}

/// Advisory shown alongside a booking. Presentation only, not a gate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModificationTimeline {
    pub severity: TimelineSeverity,
    pub message: String,
}

pub fn get_modification_timeline(days_until_check_in: i64) -> ModificationTimeline {
    let (severity, message) = if days_until_check_in < 0 {
        (
            TimelineSeverity::Error,
            "Check-in date has passed. This booking can no longer be modified.".to_string(),
        )
    } else if days_until_check_in < DATE_CHANGE_MIN_DAYS {
        (
            TimelineSeverity::Error,
            format!(
                "Check-in is in {} days. Date changes close {} days before check-in; please contact us directly.",
                days_until_check_in, DATE_CHANGE_MIN_DAYS
            ),
        )
    } else if days_until_check_in < TIMELINE_INFO_DAYS {
        (
            TimelineSeverity::Warning,
            format!(
                "Only {} days until check-in. Changes must be made at least {} days before check-in.",
                days_until_check_in, DATE_CHANGE_MIN_DAYS
            ),
        )
    } else {
        (
            TimelineSeverity::Info,
            format!(
                "{} days until check-in. You can change your booking up to {} days before check-in.",
                days_until_check_in, DATE_CHANGE_MIN_DAYS
            ),
        )
    };

    ModificationTimeline { severity, message }
}

/// Why proposed dates were refused
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, thiserror::Error)]
#[serde(tag = "code", rename_all = "snake_case")]
pub enum DateValidationError {
    #[error("Check-in date cannot be in the past")]
    CheckInInPast,

    #[error("Check-out date must be after check-in date")]
    CheckOutNotAfterCheckIn,

    #[error("Stay cannot be longer than {max_days} days")]
    StayTooLong { max_days: i64 },

    #[error("Stay must be at least 1 day")]
    StayTooShort,
}

impl DateValidationError {
    pub fn level(&self) -> ConstraintLevel {
        ConstraintLevel::Rejection
    }
}

/// Result of checking proposed new dates
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateValidation {
    pub valid: bool,
    pub error: Option<DateValidationError>,
    /// Inclusive day count, when the dates are ordered
    pub total_days: Option<i64>,
}

impl DateValidation {
    fn reject(error: DateValidationError, total_days: Option<i64>) -> Self {
        Self {
            valid: false,
            error: Some(error),
            total_days,
        }
    }
}

/// Validate proposed dates for a booking.
///
/// Check-in is compared to today by calendar date (UTC), ignoring time of day.
/// The day count uses the inclusive convention.
pub fn validate_new_dates(
    new_check_in: DateTime<Utc>,
    new_check_out: DateTime<Utc>,
    now: DateTime<Utc>,
) -> DateValidation {
    if new_check_in.date_naive() < now.date_naive() {
        return DateValidation::reject(DateValidationError::CheckInInPast, None);
    }
    if new_check_out <= new_check_in {
        return DateValidation::reject(DateValidationError::CheckOutNotAfterCheckIn, None);
    }

    let total_days = inclusive_days_between(new_check_in, new_check_out);
    if total_days > MAX_STAY_DAYS {
        return DateValidation::reject(
            DateValidationError::StayTooLong {
                max_days: MAX_STAY_DAYS,
            },
            Some(total_days),
        );
    }
    if total_days < 1 {
        return DateValidation::reject(DateValidationError::StayTooShort, Some(total_days));
    }

    DateValidation {
        valid: true,
        error: None,
        total_days: Some(total_days),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modification::fixtures::booking;
    use chrono::{Duration, TimeZone};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 1, 10, 0, 0).unwrap()
    }

    fn booking_in(days: i64) -> BookingSnapshot {
        let mut snapshot = booking();
        snapshot.check_in = now() + Duration::days(days);
        snapshot.check_out = snapshot.check_in + Duration::days(4);
        snapshot
    }

    // ==================== can_modify_dates tests ====================

    #[test]
    fn test_dates_allowed_with_notice() {
        let result = can_modify_dates(&booking_in(10), now());
        assert!(result.allowed);
        assert!(result.reason.is_none());
        assert_eq!(result.days_until_check_in, 10);
    }

    #[test]
    fn test_dates_allowed_at_exactly_seven_days() {
        assert!(can_modify_dates(&booking_in(7), now()).allowed);
    }

    #[test]
    fn test_dates_denied_within_seven_days() {
        let result = can_modify_dates(&booking_in(6), now());
        assert!(!result.allowed);
        assert_eq!(
            result.reason,
            Some(DenialReason::DateChangeWindowClosed { min_days: 7 })
        );
        assert!(result.message().unwrap().contains("within 7 days"));
        assert_eq!(result.days_until_check_in, 6);
    }

    #[test]
    fn test_dates_denied_when_cancelled() {
        let mut snapshot = booking_in(30);
        snapshot.cancelled = true;
        let result = can_modify_dates(&snapshot, now());
        assert_eq!(result.reason, Some(DenialReason::Cancelled));
        assert_eq!(result.message().unwrap(), "Booking has been cancelled");
    }

    #[test]
    fn test_dates_denied_after_check_in() {
        let mut snapshot = booking();
        snapshot.check_in = now() - Duration::hours(1);
        let result = can_modify_dates(&snapshot, now());
        assert_eq!(result.reason, Some(DenialReason::CheckInPassed));
        assert_eq!(result.days_until_check_in, -1);
    }

    #[test]
    fn test_dates_denied_when_balance_overdue() {
        let mut snapshot = booking_in(20);
        snapshot.balance_due_date = Some(now() - Duration::days(1));
        snapshot.balance_paid = false;
        let result = can_modify_dates(&snapshot, now());
        assert_eq!(result.reason, Some(DenialReason::BalanceOverdue));

        snapshot.balance_paid = true;
        assert!(can_modify_dates(&snapshot, now()).allowed);

        snapshot.balance_paid = false;
        snapshot.balance_due_date = Some(now() + Duration::days(1));
        assert!(can_modify_dates(&snapshot, now()).allowed);
    }

    #[test]
    fn test_dates_eligibility_is_monotonic() {
        let mut allowed_seen = false;
        for days in -3..60 {
            let allowed = can_modify_dates(&booking_in(days), now()).allowed;
            if allowed_seen {
                assert!(allowed, "allowed window closed again at {} days", days);
            }
            allowed_seen |= allowed;
        }
        assert!(allowed_seen);
    }

    // ==================== can_cancel_booking tests ====================

    #[test]
    fn test_cancel_allowed_inside_modification_window() {
        let result = can_cancel_booking(&booking_in(1), now());
        assert!(result.allowed);
        assert_eq!(result.days_until_check_in, 1);
    }

    #[test]
    fn test_cancel_denied_when_cancelled_or_started() {
        let mut snapshot = booking_in(10);
        snapshot.cancelled = true;
        assert_eq!(
            can_cancel_booking(&snapshot, now()).reason,
            Some(DenialReason::Cancelled)
        );

        let mut snapshot = booking();
        snapshot.check_in = now() - Duration::days(2);
        assert_eq!(
            can_cancel_booking(&snapshot, now()).reason,
            Some(DenialReason::CheckInPassed)
        );
    }

    // ==================== can_modify_services tests ====================

    #[test]
    fn test_services_floor_is_three_days() {
        assert!(can_modify_services(&booking_in(3), now()).allowed);
        assert!(can_modify_services(&booking_in(5), now()).allowed);

        let result = can_modify_services(&booking_in(2), now());
        assert!(!result.allowed);
        assert_eq!(
            result.reason,
            Some(DenialReason::ServiceChangeWindowClosed { min_days: 3 })
        );
    }

    #[test]
    fn test_services_ignore_overdue_balance() {
        let mut snapshot = booking_in(10);
        snapshot.balance_due_date = Some(now() - Duration::days(1));
        assert!(can_modify_services(&snapshot, now()).allowed);
    }

    // ==================== timeline tests ====================

    #[test]
    fn test_timeline_severity_tiers() {
        assert_eq!(get_modification_timeline(-1).severity, TimelineSeverity::Error);
        assert_eq!(get_modification_timeline(0).severity, TimelineSeverity::Error);
        assert_eq!(get_modification_timeline(6).severity, TimelineSeverity::Error);
        assert_eq!(get_modification_timeline(7).severity, TimelineSeverity::Warning);
        assert_eq!(get_modification_timeline(13).severity, TimelineSeverity::Warning);
        assert_eq!(get_modification_timeline(14).severity, TimelineSeverity::Info);
        assert!(get_modification_timeline(20).message.starts_with("20 days"));
    }

    // ==================== validate_new_dates tests ====================

    #[test]
    fn test_validate_accepts_today_regardless_of_time() {
        let check_in = Utc.with_ymd_and_hms(2025, 3, 1, 0, 0, 0).unwrap();
        let check_out = Utc.with_ymd_and_hms(2025, 3, 5, 0, 0, 0).unwrap();
        let result = validate_new_dates(check_in, check_out, now());
        assert!(result.valid);
        assert_eq!(result.total_days, Some(5));
    }

    #[test]
    fn test_validate_rejects_past_check_in() {
        let check_in = Utc.with_ymd_and_hms(2025, 2, 28, 23, 0, 0).unwrap();
        let result = validate_new_dates(check_in, check_in + Duration::days(3), now());
        assert!(!result.valid);
        assert_eq!(result.error, Some(DateValidationError::CheckInInPast));
        assert_eq!(result.error.unwrap().level(), ConstraintLevel::Rejection);
    }

    #[test]
    fn test_validate_rejects_unordered_dates() {
        let check_in = now() + Duration::days(10);
        let result = validate_new_dates(check_in, check_in, now());
        assert_eq!(result.error, Some(DateValidationError::CheckOutNotAfterCheckIn));

        let result = validate_new_dates(check_in, check_in - Duration::days(1), now());
        assert_eq!(result.error, Some(DateValidationError::CheckOutNotAfterCheckIn));
    }

    #[test]
    fn test_validate_max_stay_inclusive() {
        let check_in = now() + Duration::days(10);
        // 364 nights = 365 inclusive days
        let result = validate_new_dates(check_in, check_in + Duration::days(364), now());
        assert!(result.valid);
        assert_eq!(result.total_days, Some(365));

        let result = validate_new_dates(check_in, check_in + Duration::days(365), now());
        assert_eq!(
            result.error,
            Some(DateValidationError::StayTooLong { max_days: 365 })
        );
        assert_eq!(result.total_days, Some(366));
        assert!(result.error.unwrap().to_string().contains("365"));
    }
}
