//! Day-count conventions.
//!
//! Two conventions coexist and every call site names the one it uses:
//!
//! * [`nights_between`] - `ceil(diff / 1 day)`. Used by the pricing calculator.
//! * [`inclusive_days_between`] - `ceil(diff / 1 day) + 1`. Used when validating
//!   new dates and by the day counts stored on historical bookings.
//!
//! Quotes produced with one convention are not comparable day-for-day with
//! the other. Unifying them would change historical pricing, so both stay.

use chrono::{DateTime, Duration, Utc};

/// One day in milliseconds.
pub const DAY_MS: i64 = 24 * 60 * 60 * 1000;

/// Whole days between two instants, rounded up. A one-night stay is 1.
pub fn nights_between(check_in: DateTime<Utc>, check_out: DateTime<Utc>) -> i64 {
    ceil_days(check_out - check_in)
}

/// Nights plus one, counting both the arrival and departure day.
pub fn inclusive_days_between(check_in: DateTime<Utc>, check_out: DateTime<Utc>) -> i64 {
    ceil_days(check_out - check_in) + 1
}

/// Whole days from `now` until `check_in`, rounded down.
///
/// Negative once the check-in instant has passed.
pub fn days_until(check_in: DateTime<Utc>, now: DateTime<Utc>) -> i64 {
    (check_in - now).num_milliseconds().div_euclid(DAY_MS)
}

fn ceil_days(diff: Duration) -> i64 {
    let ms = diff.num_milliseconds();
    let whole = ms.div_euclid(DAY_MS);
    if ms.rem_euclid(DAY_MS) == 0 {
        whole
    } else {
        whole + 1
    }
}
