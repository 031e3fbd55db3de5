//! Core pricing calculation functions.
//!
//! Pure functions for pricing math - no database access, no clock.

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use rust_decimal::prelude::*;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::days::nights_between;
use super::models::{BillingUnit, ReferenceData};

/// Round to specified decimal places using banker's rounding (ROUND_HALF_EVEN).
///
/// Banker's rounding rounds to the nearest even number when the value is exactly
/// halfway between two possibilities. This reduces cumulative rounding bias.
/// Only used when presenting amounts; calculations keep full precision.
///
/// # Examples
/// ```
/// use rust_decimal_macros::dec;
/// use kennel_pricing::pricing::round_money;
///
/// assert_eq!(round_money(dec!(2.5), 0), dec!(2));   // rounds to even
/// assert_eq!(round_money(dec!(3.5), 0), dec!(4));   // rounds to even
/// assert_eq!(round_money(dec!(1.234), 2), dec!(1.23));
/// ```
pub fn round_money(amount: Decimal, places: u32) -> Decimal {
    amount.round_dp_with_strategy(places, RoundingStrategy::MidpointNearestEven)
}

/// Round to cents and fix the scale at two places for display.
pub fn display_cents(amount: Decimal) -> Decimal {
    let mut rounded = round_money(amount, 2);
    rounded.rescale(2);
    rounded
}

/// Whether a rule blocks the request or only flags it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConstraintLevel {
    Warning,
    Rejection,
}

/// A stay to be priced
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StayRequest {
    pub check_in: DateTime<Utc>,
    pub check_out: DateTime<Utc>,
    /// Dog is not desexed
    #[serde(default)]
    pub is_entire: bool,
    /// Selected service codes, in selection order
    #[serde(default)]
    pub services: Vec<String>,
    #[serde(default)]
    pub meal_count: u32,
    #[serde(default)]
    pub walk_count: u32,
}

/// Advisory raised while quoting. Never blocks the quote.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PricingWarning {
    MinimumStay {
        period: String,
        required_days: i64,
        total_days: i64,
    },
    MissingPrerequisite {
        service: String,
        prerequisite: String,
        prerequisite_name: String,
    },
}

impl PricingWarning {
    pub fn level(&self) -> ConstraintLevel {
        ConstraintLevel::Warning
    }
}

impl std::fmt::Display for PricingWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PricingWarning::MinimumStay {
                period,
                required_days,
                total_days,
            } => write!(
                f,
                "{} requires a minimum stay of {} days (this stay is {} days)",
                period, required_days, total_days
            ),
            PricingWarning::MissingPrerequisite {
                service,
                prerequisite,
                prerequisite_name,
            } => write!(
                f,
                "{} requires {} ({}) to also be selected",
                service, prerequisite_name, prerequisite
            ),
        }
    }
}

/// One itemised service charge
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceLine {
    pub code: String,
    pub name: String,
    pub unit_price: Decimal,
    pub quantity: i64,
    pub line_total: Decimal,
}

/// Full price breakdown for a stay
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceQuote {
    /// Nights, see [`nights_between`]
    pub total_days: i64,
    pub tier_name: String,
    pub base_daily_rate: Decimal,
    pub base_subtotal: Decimal,
    pub peak_surcharge: Decimal,
    pub dog_surcharge: Decimal,
    pub service_charges: Decimal,
    pub total: Decimal,
    pub is_peak_period: bool,
    pub peak_period_name: Option<String>,
    pub services: Vec<ServiceLine>,
    pub warnings: Vec<PricingWarning>,
}

impl PriceQuote {
    /// Copy with every amount rounded to cents for display
    pub fn rounded(&self) -> PriceQuote {
        let cents = display_cents;
        PriceQuote {
            base_daily_rate: cents(self.base_daily_rate),
            base_subtotal: cents(self.base_subtotal),
            peak_surcharge: cents(self.peak_surcharge),
            dog_surcharge: cents(self.dog_surcharge),
            service_charges: cents(self.service_charges),
            total: cents(self.total),
            services: self
                .services
                .iter()
                .map(|line| ServiceLine {
                    unit_price: cents(line.unit_price),
                    line_total: cents(line.line_total),
                    ..line.clone()
                })
                .collect(),
            ..self.clone()
        }
    }
}

/// Price a stay against the given reference data.
///
/// Total for any `check_out > check_in`; date order is not validated here.
/// Warnings (minimum stay, missing prerequisite) are reported on the quote
/// and never prevent it.
pub fn compute_price(stay: &StayRequest, reference: &ReferenceData) -> PriceQuote {
    let total_days = nights_between(stay.check_in, stay.check_out);
    let days = Decimal::from(total_days);
    let mut warnings = Vec::new();

    let tier = reference.tiers.for_days(total_days);
    let base_subtotal = days * tier.daily_rate;
    debug!(total_days, tier = %tier.name, rate = %tier.daily_rate, "Resolved pricing tier");

    // Only the first overlapping period in listed order applies
    let peak = reference.peak_period_for(stay.check_in, stay.check_out);
    let peak_surcharge = match peak {
        Some(period) => {
            debug!(period = %period.name, percent = %period.surcharge_percent, "Stay overlaps peak period");
            if let Some(required_days) = period.min_stay_days {
                if total_days < required_days {
                    warnings.push(PricingWarning::MinimumStay {
                        period: period.name.clone(),
                        required_days,
                        total_days,
                    });
                }
            }
            base_subtotal * period.surcharge_percent / dec!(100)
        }
        None => Decimal::ZERO,
    };

    let dog_surcharge = if stay.is_entire {
        days * reference.entire_dog_daily_rate
    } else {
        Decimal::ZERO
    };

    let selected: HashSet<&str> = stay.services.iter().map(String::as_str).collect();
    let mut seen = HashSet::new();
    let mut service_charges = Decimal::ZERO;
    let mut lines = Vec::new();

    for code in &stay.services {
        if !seen.insert(code.as_str()) {
            continue;
        }
        let Some(service) = reference.services.get(code) else {
            debug!(code = %code, "Skipping unknown service code");
            continue;
        };

        let quantity = match service.billing_unit {
            BillingUnit::PerMeal => i64::from(stay.meal_count),
            BillingUnit::PerWalk => i64::from(stay.walk_count),
            BillingUnit::PerDay => total_days,
            BillingUnit::PerService => 1,
        };
        let line_total = service.unit_price * Decimal::from(quantity);
        service_charges += line_total;
        lines.push(ServiceLine {
            code: service.code.clone(),
            name: service.name.clone(),
            unit_price: service.unit_price,
            quantity,
            line_total,
        });

        if let Some(prerequisite) = &service.requires {
            if !selected.contains(prerequisite.as_str()) {
                let prerequisite_name = reference
                    .services
                    .get(prerequisite)
                    .map(|p| p.name.clone())
                    .unwrap_or_else(|| prerequisite.clone());
                warnings.push(PricingWarning::MissingPrerequisite {
                    service: service.name.clone(),
                    prerequisite: prerequisite.clone(),
                    prerequisite_name,
                });
            }
        }
    }

    let total = base_subtotal + peak_surcharge + dog_surcharge + service_charges;

    PriceQuote {
        total_days,
        tier_name: tier.name.clone(),
        base_daily_rate: tier.daily_rate,
        base_subtotal,
        peak_surcharge,
        dog_surcharge,
        service_charges,
        total,
        is_peak_period: peak.is_some(),
        peak_period_name: peak.map(|period| period.name.clone()),
        services: lines,
        warnings,
    }
}
