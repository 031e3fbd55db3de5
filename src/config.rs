//! Configuration loaded from the environment (and `.env` if present)

use std::net::SocketAddr;
use std::ops::RangeInclusive;
use std::str::FromStr;
use std::time::Duration;

use rust_decimal::Decimal;

use crate::modification::policy::MAX_STAY_DAYS;
use crate::pricing::models::{DEFAULT_ENTIRE_DOG_DAILY_RATE, MAX_AMOUNT};
use crate::schedule::DepositPolicy;

const MAX_YEARS_AHEAD: i32 = 10;
const MAX_REFRESH_SECS: u64 = 7 * 24 * 60 * 60;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {key}: {value:?}")]
    Invalid { key: &'static str, value: String },
}

/// Inputs for seeding reference data
#[derive(Debug, Clone)]
pub struct ReferenceSettings {
    pub entire_dog_daily_rate: Decimal,
    /// Seed peak periods this many years past the current one
    pub years_ahead: i32,
}

impl Default for ReferenceSettings {
    fn default() -> Self {
        Self {
            entire_dog_daily_rate: DEFAULT_ENTIRE_DOG_DAILY_RATE,
            years_ahead: 1,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub bind_addr: SocketAddr,
    pub reference: ReferenceSettings,
    pub refresh_every: Duration,
    pub deposit: DepositPolicy,
}

impl Config {
    /// Load `.env`, then read settings from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary key lookup; unset keys take defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = ReferenceSettings::default();
        let deposit = DepositPolicy::default();

        Ok(Self {
            bind_addr: parse(&lookup, "BIND_ADDR")?
                .unwrap_or_else(|| SocketAddr::from(([0, 0, 0, 0], 8080))),
            reference: ReferenceSettings {
                entire_dog_daily_rate: parse_in(
                    &lookup,
                    "ENTIRE_DOG_DAILY_RATE",
                    Decimal::ZERO..=MAX_AMOUNT,
                )?
                .unwrap_or(defaults.entire_dog_daily_rate),
                years_ahead: parse_in(&lookup, "PEAK_SEED_YEARS_AHEAD", 0..=MAX_YEARS_AHEAD)?
                    .unwrap_or(defaults.years_ahead),
            },
            refresh_every: Duration::from_secs(
                parse_in(&lookup, "REFERENCE_REFRESH_SECS", 1..=MAX_REFRESH_SECS)?
                    .unwrap_or(6 * 60 * 60),
            ),
            deposit: DepositPolicy {
                deposit_percent: parse_in(
                    &lookup,
                    "DEPOSIT_PERCENT",
                    Decimal::ZERO..=Decimal::ONE_HUNDRED,
                )?
                .unwrap_or(deposit.deposit_percent),
                balance_due_days_before: parse_in(
                    &lookup,
                    "BALANCE_DUE_DAYS_BEFORE",
                    0..=MAX_STAY_DAYS,
                )?
                .unwrap_or(deposit.balance_due_days_before),
            },
        })
    }
}

fn parse<T, F>(lookup: &F, key: &'static str) -> Result<Option<T>, ConfigError>
where
    T: FromStr,
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        None => Ok(None),
        Some(value) => {
            let parsed = value.trim().parse();
            parsed
                .map(Some)
                .map_err(|_| ConfigError::Invalid { key, value })
        }
    }
}

/// Like [`parse`], but values outside `range` are invalid too.
fn parse_in<T, F>(
    lookup: &F,
    key: &'static str,
    range: RangeInclusive<T>,
) -> Result<Option<T>, ConfigError>
where
    T: FromStr + PartialOrd,
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        None => Ok(None),
        Some(value) => match value.trim().parse::<T>() {
            Ok(parsed) if range.contains(&parsed) => Ok(Some(parsed)),
            _ => Err(ConfigError::Invalid { key, value }),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = Config::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config.bind_addr.port(), 8080);
        assert_eq!(config.reference.entire_dog_daily_rate, dec!(5));
        assert_eq!(config.reference.years_ahead, 1);
        assert_eq!(config.refresh_every, Duration::from_secs(21600));
        assert_eq!(config.deposit.deposit_percent, dec!(20));
    }

    #[test]
    fn test_overrides() {
        let config = Config::from_lookup(lookup(&[
            ("BIND_ADDR", "127.0.0.1:9000"),
            ("ENTIRE_DOG_DAILY_RATE", "7.50"),
            ("PEAK_SEED_YEARS_AHEAD", "3"),
            ("BALANCE_DUE_DAYS_BEFORE", " 21 "),
        ]))
        .unwrap();
        assert_eq!(config.bind_addr.port(), 9000);
        assert_eq!(config.reference.entire_dog_daily_rate, dec!(7.50));
        assert_eq!(config.reference.years_ahead, 3);
        assert_eq!(config.deposit.balance_due_days_before, 21);
    }

    #[test]
    fn test_invalid_value() {
        let err = Config::from_lookup(lookup(&[("ENTIRE_DOG_DAILY_RATE", "five")])).unwrap_err();
        assert!(err.to_string().contains("ENTIRE_DOG_DAILY_RATE"));
    }

    #[test]
    fn test_out_of_range_values() {
        for (key, value) in [
            ("BALANCE_DUE_DAYS_BEFORE", "9223372036854775"),
            ("BALANCE_DUE_DAYS_BEFORE", "-1"),
            ("DEPOSIT_PERCENT", "-5"),
            ("DEPOSIT_PERCENT", "100.01"),
            ("ENTIRE_DOG_DAILY_RATE", "70000000000000000000000000000"),
            ("PEAK_SEED_YEARS_AHEAD", "100000"),
            ("REFERENCE_REFRESH_SECS", "0"),
        ] {
            let err = Config::from_lookup(lookup(&[(key, value)])).unwrap_err();
            assert!(
                matches!(err, ConfigError::Invalid { key: k, .. } if k == key),
                "{} = {}",
                key,
                value
            );
        }

        let config = Config::from_lookup(lookup(&[
            ("DEPOSIT_PERCENT", "100"),
            ("BALANCE_DUE_DAYS_BEFORE", "0"),
        ]))
        .unwrap();
        assert_eq!(config.deposit.deposit_percent, dec!(100));
        assert_eq!(config.deposit.balance_due_days_before, 0);
    }
}
