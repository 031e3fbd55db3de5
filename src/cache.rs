//! In-memory reference data cache using moka
//!
//! Holds the current peak periods, tiers and service catalog as a single
//! `Arc<ReferenceData>`. Updates replace the whole value, so a pricing call
//! sees either the old set or the new one, never a mix.

use chrono::{NaiveDate, Utc};
use moka::future::Cache;
use serde::Serialize;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::interval;
use tracing::{debug, info};

use crate::config::ReferenceSettings;
use crate::pricing::{ReferenceData, ReferenceDataError};

const REFERENCE_KEY: &str = "reference";

/// Application cache holding the active reference data
#[derive(Clone)]
pub struct ReferenceCache {
    reference: Cache<String, Arc<ReferenceData>>,
    settings: ReferenceSettings,
    /// Set once data arrives through [`ReferenceCache::replace`]; the
    /// refresher never overwrites installed data.
    installed: Arc<AtomicBool>,
    writes: Arc<Mutex<()>>,
}

impl ReferenceCache {
    /// Create a cache seeded for `today`, starting at version 1
    pub async fn new(settings: ReferenceSettings, today: NaiveDate) -> Self {
        let cache = Self {
            reference: Cache::builder().max_capacity(1).build(),
            settings,
            installed: Arc::new(AtomicBool::new(false)),
            writes: Arc::new(Mutex::new(())),
        };
        cache.store(cache.seed(1, today)).await;
        cache
    }

    /// The active reference data. Rebuilt from the seed if missing.
    pub async fn current(&self) -> Arc<ReferenceData> {
        self.reference
            .get_with(REFERENCE_KEY.to_string(), async {
                Arc::new(self.seed(1, Utc::now().date_naive()))
            })
            .await
    }

    /// Swap in a whole new reference data set.
    ///
    /// The version must be newer than the active one. Installed data is kept
    /// until the next `replace` or an explicit [`ReferenceCache::reseed`].
    pub async fn replace(
        &self,
        data: ReferenceData,
    ) -> Result<Arc<ReferenceData>, ReferenceDataError> {
        let _guard = self.writes.lock().await;
        let active = self.current().await;
        if data.version <= active.version {
            return Err(ReferenceDataError::StaleVersion {
                active: active.version,
                proposed: data.version,
            });
        }
        self.installed.store(true, Ordering::SeqCst);
        Ok(self.store(data).await)
    }

    /// Go back to the default seed for `today`, under the next version
    pub async fn reseed(&self, today: NaiveDate) -> Arc<ReferenceData> {
        let _guard = self.writes.lock().await;
        let active = self.current().await;
        self.installed.store(false, Ordering::SeqCst);
        self.store(self.seed(active.version + 1, today)).await
    }

    /// Roll the seeded calendar forward to `today`'s year.
    ///
    /// Returns the new data when it changed. Installed data is left alone.
    pub async fn refresh(&self, today: NaiveDate) -> Option<Arc<ReferenceData>> {
        let _guard = self.writes.lock().await;
        if self.installed.load(Ordering::SeqCst) {
            debug!("Reference data was installed externally, skipping refresh");
            return None;
        }

        let active = self.current().await;
        let seeded = self.seed(active.version + 1, today);
        if seeded.peak_periods == active.peak_periods
            && seeded.entire_dog_daily_rate == active.entire_dog_daily_rate
        {
            return None;
        }
        Some(self.store(seeded).await)
    }

    /// Get cache statistics for monitoring
    pub async fn stats(&self) -> CacheStats {
        let current = self.current().await;
        CacheStats {
            reference_version: current.version,
            peak_periods: current.peak_periods.len(),
            services: current.services.iter().count(),
        }
    }

    async fn store(&self, data: ReferenceData) -> Arc<ReferenceData> {
        let data = Arc::new(data);
        self.reference
            .insert(REFERENCE_KEY.to_string(), data.clone())
            .await;
        info!("Reference data version {} active", data.version);
        data
    }

    fn seed(&self, version: u64, today: NaiveDate) -> ReferenceData {
        ReferenceData::seeded(
            version,
            today,
            self.settings.years_ahead,
            self.settings.entire_dog_daily_rate,
        )
    }
}

/// Cache statistics for the health endpoint
#[derive(Debug, Clone, Serialize)]
pub struct CacheStats {
    pub reference_version: u64,
    pub peak_periods: usize,
    pub services: usize,
}

/// Start background reference refresher
///
/// Rolls the seeded peak calendar forward once the year changes so periods
/// exist for the current year and the configured years ahead.
pub async fn start_reference_refresher(cache: ReferenceCache, every: Duration) {
    let mut interval = interval(every.max(Duration::from_secs(1)));
    // First tick completes immediately; the cache was seeded on creation
    interval.tick().await;
    loop {
        interval.tick().await;
        cache.refresh(Utc::now().date_naive()).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pricing::models::{PricingTiers, ServiceCatalog};
    use rust_decimal_macros::dec;

    fn settings() -> ReferenceSettings {
        ReferenceSettings {
            entire_dog_daily_rate: dec!(7),
            years_ahead: 2,
        }
    }

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn custom(version: u64) -> ReferenceData {
        ReferenceData::new(
            version,
            vec![],
            PricingTiers::default(),
            ServiceCatalog::default(),
            dec!(9),
        )
        .unwrap()
    }

    #[tokio::test]
    async fn test_seeded_on_creation() {
        let cache = ReferenceCache::new(settings(), day(2025, 6, 1)).await;
        let current = cache.current().await;

        assert_eq!(current.version, 1);
        assert_eq!(current.entire_dog_daily_rate, dec!(7));
        // 2025, 2026, 2027
        assert_eq!(current.peak_periods.len(), 15);
        assert_eq!(current.peak_periods[0].start_date, day(2025, 1, 5));
    }

    #[tokio::test]
    async fn test_refresh_rolls_calendar_forward() {
        let cache = ReferenceCache::new(settings(), day(2025, 6, 1)).await;
        let before = cache.current().await;

        // Same year: nothing to do
        assert!(cache.refresh(day(2025, 12, 31)).await.is_none());
        assert_eq!(cache.current().await.version, 1);

        cache.refresh(day(2026, 1, 2)).await.unwrap();
        let after = cache.current().await;

        assert_eq!(after.version, 2);
        assert_eq!(after.peak_periods[0].start_date, day(2026, 1, 5));
        // Readers holding the old Arc keep a consistent view
        assert_eq!(before.version, 1);
        assert_eq!(before.peak_periods[0].start_date, day(2025, 1, 5));
    }

    #[tokio::test]
    async fn test_replace_with_custom_data() {
        let cache = ReferenceCache::new(settings(), day(2025, 6, 1)).await;

        cache.replace(custom(42)).await.unwrap();
        let stats = cache.stats().await;

        assert_eq!(stats.reference_version, 42);
        assert_eq!(stats.peak_periods, 0);
        assert_eq!(stats.services, 0);
    }

    #[tokio::test]
    async fn test_refresh_keeps_installed_data() {
        let cache = ReferenceCache::new(settings(), day(2025, 6, 1)).await;
        cache.replace(custom(42)).await.unwrap();

        assert!(cache.refresh(day(2026, 1, 2)).await.is_none());

        let current = cache.current().await;
        assert_eq!(current.version, 42);
        assert_eq!(current.entire_dog_daily_rate, dec!(9));
        assert!(current.peak_periods.is_empty());
    }

    #[tokio::test]
    async fn test_versions_never_go_backwards() {
        let cache = ReferenceCache::new(settings(), day(2025, 6, 1)).await;
        cache.replace(custom(42)).await.unwrap();

        let err = cache.replace(custom(42)).await.unwrap_err();
        assert_eq!(
            err,
            ReferenceDataError::StaleVersion {
                active: 42,
                proposed: 42
            }
        );
        assert!(cache.replace(custom(7)).await.is_err());

        let reseeded = cache.reseed(day(2025, 6, 1)).await;
        assert_eq!(reseeded.version, 43);
        assert_eq!(reseeded.entire_dog_daily_rate, dec!(7));

        // Back on the seed, the refresher takes over again
        let refreshed = cache.refresh(day(2026, 1, 2)).await.unwrap();
        assert_eq!(refreshed.version, 44);
    }
}
