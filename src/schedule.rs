//! Deposit and balance split for a quoted stay.

use chrono::{DateTime, Duration, Utc};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::pricing::round_money;

/// How a booking total is split into deposit and balance
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DepositPolicy {
    pub deposit_percent: Decimal,
    pub balance_due_days_before: i64,
}

impl Default for DepositPolicy {
    fn default() -> Self {
        Self {
            deposit_percent: dec!(20),
            balance_due_days_before: 14,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentSchedule {
    pub deposit_amount: Decimal,
    pub balance_amount: Decimal,
    /// `None` when everything is due at booking
    pub balance_due_date: Option<DateTime<Utc>>,
}

/// Split `total` into a deposit due now and a balance due before check-in.
///
/// When the balance due date has already passed at `now`, the whole total is
/// taken as the deposit. The deposit is rounded to cents so that the two parts
/// always add back up to `total`.
pub fn payment_schedule(
    total: Decimal,
    check_in: DateTime<Utc>,
    now: DateTime<Utc>,
    policy: &DepositPolicy,
) -> PaymentSchedule {
    let due = Duration::try_days(policy.balance_due_days_before)
        .and_then(|notice| check_in.checked_sub_signed(notice));
    let due = match due {
        Some(due) if due > now => due,
        _ => {
            return PaymentSchedule {
                deposit_amount: total,
                balance_amount: Decimal::ZERO,
                balance_due_date: None,
            }
        }
    };

    // Deposit never exceeds the total
    let share = (policy.deposit_percent / dec!(100)).clamp(Decimal::ZERO, Decimal::ONE);
    let deposit_amount = round_money(total * share, 2);
    PaymentSchedule {
        deposit_amount,
        balance_amount: total - deposit_amount,
        balance_due_date: Some(due),
    }
}
