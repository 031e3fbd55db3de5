//! Read-only booking snapshot consumed by the modification evaluator.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::warn;
use uuid::Uuid;

use crate::pricing::models::{BillingUnit, ServiceCatalog};
use crate::pricing::StayRequest;

/// The booking fields the evaluator reads. Never mutated here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BookingSnapshot {
    #[serde(default)]
    pub id: Option<Uuid>,
    pub check_in: DateTime<Utc>,
    pub check_out: DateTime<Utc>,
    /// As stored at booking time (inclusive day convention)
    pub total_days: i64,
    pub total_price: Decimal,
    #[serde(default)]
    pub deposit_amount: Decimal,
    #[serde(default)]
    pub deposit_paid: bool,
    #[serde(default)]
    pub balance_amount: Decimal,
    #[serde(default)]
    pub balance_paid: bool,
    #[serde(default)]
    pub balance_due_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub cancelled: bool,
    #[serde(default)]
    pub is_peak_period: bool,
    /// JSON as persisted: `[{"name": .., "quantity": ..}]` or `{"CODE": quantity}`
    #[serde(default)]
    pub selected_services: Option<String>,
    #[serde(default)]
    pub dog_surcharge: Decimal,
}

/// One service entry recovered from the persisted payload
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectedService {
    pub code: String,
    pub quantity: u32,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum SelectedServicesPayload {
    List(Vec<ListEntry>),
    Map(BTreeMap<String, u32>),
}

#[derive(Deserialize)]
struct ListEntry {
    name: String,
    #[serde(default = "default_quantity")]
    quantity: u32,
}

fn default_quantity() -> u32 {
    1
}

/// Parse the persisted selected-services payload.
///
/// Malformed JSON degrades to an empty selection instead of failing; the
/// caller's price re-derivation continues without services.
pub fn parse_selected_services(payload: Option<&str>) -> Vec<SelectedService> {
    let raw = match payload.map(str::trim) {
        Some(raw) if !raw.is_empty() && raw != "null" => raw,
        _ => return Vec::new(),
    };

    match serde_json::from_str::<SelectedServicesPayload>(raw) {
        Ok(SelectedServicesPayload::List(entries)) => entries
            .into_iter()
            .map(|entry| SelectedService {
                code: entry.name,
                quantity: entry.quantity,
            })
            .collect(),
        Ok(SelectedServicesPayload::Map(entries)) => entries
            .into_iter()
            .map(|(code, quantity)| SelectedService { code, quantity })
            .collect(),
        Err(e) => {
            warn!("Unparseable selected services payload, treating as none: {}", e);
            Vec::new()
        }
    }
}

impl BookingSnapshot {
    /// Surcharge was charged, so the dog is entire
    pub fn is_entire_dog(&self) -> bool {
        !self.dog_surcharge.is_zero()
    }

    pub fn selected_services(&self) -> Vec<SelectedService> {
        parse_selected_services(self.selected_services.as_deref())
    }

    /// Rebuild a stay request for new dates from the persisted selections.
    ///
    /// Meal and walk counts come from the quantities of per-meal and per-walk
    /// services in the payload.
    pub fn to_stay_request(
        &self,
        check_in: DateTime<Utc>,
        check_out: DateTime<Utc>,
        catalog: &ServiceCatalog,
    ) -> StayRequest {
        let selected = self.selected_services();
        let mut meal_count = 0u32;
        let mut walk_count = 0u32;

        for service in &selected {
            match catalog.get(&service.code).map(|s| s.billing_unit) {
                Some(BillingUnit::PerMeal) => meal_count = meal_count.saturating_add(service.quantity),
                Some(BillingUnit::PerWalk) => walk_count = walk_count.saturating_add(service.quantity),
                _ => {}
            }
        }

        StayRequest {
            check_in,
            check_out,
            is_entire: self.is_entire_dog(),
            services: selected.into_iter().map(|s| s.code).collect(),
            meal_count,
            walk_count,
        }
    }
}
