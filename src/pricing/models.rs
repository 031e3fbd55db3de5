//! Reference data for pricing: peak periods, stay-length tiers and the service catalog.
//!
//! Everything here is immutable once built. A pricing call receives a
//! [`ReferenceData`] explicitly; nothing is read from globals.

use std::collections::BTreeMap;

use chrono::{DateTime, Datelike, NaiveDate, Utc};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

/// Errors raised while assembling reference data
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ReferenceDataError {
    #[error("At least one pricing tier is required")]
    NoTiers,

    #[error("First pricing tier must start at 1 day, found {0}")]
    FirstTierStart(i64),

    #[error("Pricing tier '{tier}' has min_days {min} greater than max_days {max}")]
    InvertedTier { tier: String, min: i64, max: i64 },

    #[error("Pricing tier '{tier}' must start at {expected} days, found {found}")]
    TierGap {
        tier: String,
        expected: i64,
        found: i64,
    },

    #[error("Only the last pricing tier may be unbounded ('{0}' is not last)")]
    UnboundedTierNotLast(String),

    #[error("Last pricing tier '{0}' must be unbounded")]
    BoundedLastTier(String),

    #[error("{field} must be between 0 and {max}, found {value}")]
    OutOfRange {
        field: String,
        value: Decimal,
        max: Decimal,
    },

    #[error("Reference data version {proposed} is not newer than active version {active}")]
    StaleVersion { active: u64, proposed: u64 },

    #[error("Service {service} requires unknown service {prerequisite}")]
    UnknownPrerequisite {
        service: String,
        prerequisite: String,
    },
}

/// Largest daily rate or unit price reference data may carry
pub const MAX_AMOUNT: Decimal = dec!(1000000);

/// Largest peak surcharge percentage
pub const MAX_SURCHARGE_PERCENT: Decimal = dec!(1000);

/// `value` must lie in `0..=max`. At these maxima no quote overflows `Decimal`.
pub(crate) fn check_range(
    field: impl FnOnce() -> String,
    value: Decimal,
    max: Decimal,
) -> Result<(), ReferenceDataError> {
    if value < Decimal::ZERO || value > max {
        return Err(ReferenceDataError::OutOfRange {
            field: field(),
            value,
            max,
        });
    }
    Ok(())
}

/// A calendar range with a percentage surcharge on the base stay price
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PeakPeriod {
    pub name: String,
    /// Inclusive
    pub start_date: NaiveDate,
    /// Inclusive
    pub end_date: NaiveDate,
    #[serde(with = "rust_decimal::serde::str")]
    pub surcharge_percent: Decimal,
    #[serde(default)]
    pub min_stay_days: Option<i64>,
}

impl PeakPeriod {
    /// Interval overlap on calendar dates, not containment.
    pub fn overlaps(&self, check_in: DateTime<Utc>, check_out: DateTime<Utc>) -> bool {
        check_in.date_naive() <= self.end_date && check_out.date_naive() >= self.start_date
    }
}

/// Seed table: name, start (month, day), end (month, day), end falls next year,
/// surcharge percent, minimum stay.
const PEAK_SEED: &[(&str, (u32, u32), (u32, u32), bool, Decimal, Option<i64>)] = &[
    ("Summer School Holidays", (1, 5), (1, 27), false, dec!(15), None),
    ("Winter School Holidays", (7, 5), (7, 20), false, dec!(10), None),
    ("Spring School Holidays", (9, 27), (10, 12), false, dec!(10), None),
    ("Christmas/Boxing Day", (12, 20), (12, 28), false, dec!(20), Some(7)),
    ("New Year", (12, 29), (1, 4), true, dec!(20), None),
];

/// Default peak calendar for one year, in chronological order.
pub fn seed_peak_periods(year: i32) -> Vec<PeakPeriod> {
    PEAK_SEED
        .iter()
        .filter_map(|(name, (sm, sd), (em, ed), wraps, percent, min_stay)| {
            let end_year = if *wraps { year + 1 } else { year };
            Some(PeakPeriod {
                name: (*name).to_string(),
                start_date: NaiveDate::from_ymd_opt(year, *sm, *sd)?,
                end_date: NaiveDate::from_ymd_opt(end_year, *em, *ed)?,
                surcharge_percent: *percent,
                min_stay_days: *min_stay,
            })
        })
        .collect()
}

/// Default peak calendar for every year in `from..=through`.
pub fn seed_peak_periods_for(from: i32, through: i32) -> Vec<PeakPeriod> {
    (from..=through).flat_map(seed_peak_periods).collect()
}

/// A stay-length bracket and its daily rate
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PricingTier {
    pub name: String,
    pub min_days: i64,
    /// `None` means unbounded
    pub max_days: Option<i64>,
    #[serde(with = "rust_decimal::serde::str")]
    pub daily_rate: Decimal,
}

impl PricingTier {
    pub fn contains(&self, days: i64) -> bool {
        days >= self.min_days && self.max_days.map_or(true, |max| days <= max)
    }
}

/// Ordered, gap-free partition of day counts starting at 1 and ending unbounded.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct PricingTiers(Vec<PricingTier>);

impl PricingTiers {
    pub fn new(tiers: Vec<PricingTier>) -> Result<Self, ReferenceDataError> {
        let first = tiers.first().ok_or(ReferenceDataError::NoTiers)?;
        if first.min_days != 1 {
            return Err(ReferenceDataError::FirstTierStart(first.min_days));
        }

        let mut expected = 1;
        for (i, tier) in tiers.iter().enumerate() {
            check_range(
                || format!("Daily rate of tier '{}'", tier.name),
                tier.daily_rate,
                MAX_AMOUNT,
            )?;
            if tier.min_days != expected {
                return Err(ReferenceDataError::TierGap {
                    tier: tier.name.clone(),
                    expected,
                    found: tier.min_days,
                });
            }
            let is_last = i + 1 == tiers.len();
            match tier.max_days {
                Some(max) if max < tier.min_days => {
                    return Err(ReferenceDataError::InvertedTier {
                        tier: tier.name.clone(),
                        min: tier.min_days,
                        max,
                    });
                }
                Some(_) if is_last => {
                    return Err(ReferenceDataError::BoundedLastTier(tier.name.clone()));
                }
                Some(max) => expected = max + 1,
                None if !is_last => {
                    return Err(ReferenceDataError::UnboundedTierNotLast(tier.name.clone()));
                }
                None => {}
            }
        }

        Ok(Self(tiers))
    }

    /// The tier containing `days`. Day counts below 1 resolve to the first tier.
    pub fn for_days(&self, days: i64) -> &PricingTier {
        self.0
            .iter()
            .find(|tier| tier.contains(days))
            .unwrap_or(&self.0[0])
    }

    pub fn iter(&self) -> impl Iterator<Item = &PricingTier> {
        self.0.iter()
    }
}

impl Default for PricingTiers {
    /// Short (1-4), standard (5-30) and long (31+) stays at 85/80/75 per day.
    fn default() -> Self {
        Self(vec![
            PricingTier {
                name: "Short Stay".to_string(),
                min_days: 1,
                max_days: Some(4),
                daily_rate: dec!(85),
            },
            PricingTier {
                name: "Standard Stay".to_string(),
                min_days: 5,
                max_days: Some(30),
                daily_rate: dec!(80),
            },
            PricingTier {
                name: "Long Stay".to_string(),
                min_days: 31,
                max_days: None,
                daily_rate: dec!(75),
            },
        ])
    }
}

impl<'de> Deserialize<'de> for PricingTiers {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let tiers = Vec::<PricingTier>::deserialize(deserializer)?;
        PricingTiers::new(tiers).map_err(serde::de::Error::custom)
    }
}

/// How the quantity of a service line is derived
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BillingUnit {
    PerMeal,
    PerWalk,
    PerDay,
    /// Also the fallback for unrecognised units: quantity 1
    #[serde(other)]
    PerService,
}

/// An addable charge
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceDefinition {
    pub code: String,
    pub name: String,
    #[serde(with = "rust_decimal::serde::str")]
    pub unit_price: Decimal,
    pub billing_unit: BillingUnit,
    pub category: String,
    /// Code of a service that should be selected alongside this one
    #[serde(default)]
    pub requires: Option<String>,
}

impl ServiceDefinition {
    fn new(code: &str, name: &str, unit_price: Decimal, unit: BillingUnit, category: &str) -> Self {
        Self {
            code: code.to_string(),
            name: name.to_string(),
            unit_price,
            billing_unit: unit,
            category: category.to_string(),
            requires: None,
        }
    }

    fn requiring(mut self, prerequisite: &str) -> Self {
        self.requires = Some(prerequisite.to_string());
        self
    }
}

/// Service code -> definition
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ServiceCatalog(BTreeMap<String, ServiceDefinition>);

impl ServiceCatalog {
    pub fn new(services: impl IntoIterator<Item = ServiceDefinition>) -> Self {
        Self(
            services
                .into_iter()
                .map(|service| (service.code.clone(), service))
                .collect(),
        )
    }

    pub fn get(&self, code: &str) -> Option<&ServiceDefinition> {
        self.0.get(code)
    }

    pub fn iter(&self) -> impl Iterator<Item = &ServiceDefinition> {
        self.0.values()
    }

    /// The catalog shipped with a fresh install
    pub fn standard() -> Self {
        use BillingUnit::*;
        Self::new([
            ServiceDefinition::new("WALK_ASSESSMENT", "Walk Assessment", dec!(35), PerService, "exercise"),
            ServiceDefinition::new("PACK_WALK", "Pack Walk", dec!(30), PerWalk, "exercise")
                .requiring("WALK_ASSESSMENT"),
            ServiceDefinition::new("PREMIUM_MEAL", "Premium Meal", dec!(8), PerMeal, "food"),
            ServiceDefinition::new("MEDICATION", "Medication Administration", dec!(5), PerDay, "care"),
            ServiceDefinition::new("BATH", "Departure Bath", dec!(45), PerService, "grooming"),
            ServiceDefinition::new("NAIL_TRIM", "Nail Trim", dec!(20), PerService, "grooming"),
        ])
    }
}

/// Default daily surcharge for an entire (not desexed) dog
pub const DEFAULT_ENTIRE_DOG_DAILY_RATE: Decimal = dec!(5);

/// Everything a pricing call reads, versioned as a unit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReferenceData {
    pub version: u64,
    /// Iteration order decides which overlapping period applies
    pub peak_periods: Vec<PeakPeriod>,
    pub tiers: PricingTiers,
    pub services: ServiceCatalog,
    #[serde(with = "rust_decimal::serde::str")]
    pub entire_dog_daily_rate: Decimal,
}

impl ReferenceData {
    pub fn new(
        version: u64,
        peak_periods: Vec<PeakPeriod>,
        tiers: PricingTiers,
        services: ServiceCatalog,
        entire_dog_daily_rate: Decimal,
    ) -> Result<Self, ReferenceDataError> {
        check_range(
            || "Entire dog daily rate".to_string(),
            entire_dog_daily_rate,
            MAX_AMOUNT,
        )?;
        for period in &peak_periods {
            check_range(
                || format!("Surcharge of peak period '{}'", period.name),
                period.surcharge_percent,
                MAX_SURCHARGE_PERCENT,
            )?;
        }
        for service in services.iter() {
            check_range(
                || format!("Unit price of service {}", service.code),
                service.unit_price,
                MAX_AMOUNT,
            )?;
            if let Some(prerequisite) = &service.requires {
                if services.get(prerequisite).is_none() {
                    return Err(ReferenceDataError::UnknownPrerequisite {
                        service: service.code.clone(),
                        prerequisite: prerequisite.clone(),
                    });
                }
            }
        }

        Ok(Self {
            version,
            peak_periods,
            tiers,
            services,
            entire_dog_daily_rate,
        })
    }

    /// Default tiers and catalog with peak periods seeded from `today`'s year
    /// through `years_ahead` further years.
    pub fn seeded(
        version: u64,
        today: NaiveDate,
        years_ahead: i32,
        entire_dog_daily_rate: Decimal,
    ) -> Self {
        let year = today.year();
        Self {
            version,
            peak_periods: seed_peak_periods_for(year, year + years_ahead.max(0)),
            tiers: PricingTiers::default(),
            services: ServiceCatalog::standard(),
            entire_dog_daily_rate,
        }
    }

    /// First period in listed order that overlaps the stay.
    pub fn peak_period_for(
        &self,
        check_in: DateTime<Utc>,
        check_out: DateTime<Utc>,
    ) -> Option<&PeakPeriod> {
        self.peak_periods
            .iter()
            .find(|period| period.overlaps(check_in, check_out))
    }
}
