//! HTTP routes exposing the pricing engine and modification policy as JSON.
//!
//! "now" comes from the request's `as_of` when given, the wall clock otherwise.

use axum::{
    extract::State,
    routing::{get, post, put},
    Json, Router,
};
use chrono::Utc;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::cache::ReferenceCache;
use crate::error::{AppError, Result};
use crate::modification::{
    calculate_refund, can_cancel_booking, can_modify_dates, can_modify_services,
    get_modification_timeline, recalculate_booking_price, validate_new_dates,
};
use crate::schedule::{payment_schedule, DepositPolicy};

use super::calculators::{compute_price, StayRequest};
use super::models::{ReferenceData, ServiceCatalog};
use super::requests::{
    BookingRequest, ReplaceReferenceRequest, RepriceRequest, ScheduleRequest,
    ValidateDatesRequest,
};
use super::responses::{
    ComparisonResponse, DateValidationResponse, EligibilityResponse, GateResponse,
    HealthResponse, QuoteResponse, RefundResponse, ScheduleResponse,
};

/// Shared state for the pricing routes
#[derive(Clone)]
pub struct AppState {
    pub cache: ReferenceCache,
    pub deposit: DepositPolicy,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/pricing/quote", post(quote))
        .route("/pricing/reference", put(replace_reference))
        .route("/bookings/eligibility", post(eligibility))
        .route("/bookings/refund", post(refund))
        .route("/bookings/reprice", post(reprice))
        .route("/bookings/validate-dates", post(validate_dates))
        .route("/bookings/schedule", post(schedule))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    let stats = state.cache.stats().await;
    Json(HealthResponse {
        status: "ok",
        reference_version: stats.reference_version,
        peak_periods: stats.peak_periods,
    })
}

async fn quote(
    State(state): State<AppState>,
    Json(stay): Json<StayRequest>,
) -> Result<Json<QuoteResponse>> {
    if stay.check_out <= stay.check_in {
        return Err(AppError::BadRequest(
            "Check-out date must be after check-in date".to_string(),
        ));
    }
    let reference = state.cache.current().await;
    let quote = compute_price(&stay, &reference);
    Ok(Json(QuoteResponse::from(&quote)))
}

async fn replace_reference(
    State(state): State<AppState>,
    Json(req): Json<ReplaceReferenceRequest>,
) -> Result<Json<HealthResponse>> {
    let data = ReferenceData::new(
        req.version,
        req.peak_periods,
        req.tiers,
        ServiceCatalog::new(req.services),
        req.entire_dog_daily_rate,
    )?;
    let data = state.cache.replace(data).await?;
    info!(
        "Reference data v{} installed with {} peak periods",
        data.version,
        data.peak_periods.len()
    );
    Ok(Json(HealthResponse {
        status: "ok",
        reference_version: data.version,
        peak_periods: data.peak_periods.len(),
    }))
}

async fn eligibility(Json(req): Json<BookingRequest>) -> Json<EligibilityResponse> {
    let now = req.as_of.unwrap_or_else(Utc::now);
    let date_change = can_modify_dates(&req.booking, now);
    let timeline = get_modification_timeline(date_change.days_until_check_in);

    Json(EligibilityResponse {
        date_change: GateResponse::from(&date_change),
        cancellation: GateResponse::from(&can_cancel_booking(&req.booking, now)),
        service_change: GateResponse::from(&can_modify_services(&req.booking, now)),
        timeline,
    })
}

async fn refund(Json(req): Json<BookingRequest>) -> Result<Json<RefundResponse>> {
    let now = req.as_of.unwrap_or_else(Utc::now);
    let eligibility = can_cancel_booking(&req.booking, now);
    if let Some(message) = eligibility.message() {
        return Err(AppError::BadRequest(message));
    }
    Ok(Json(RefundResponse::from(&calculate_refund(&req.booking, now))))
}

async fn reprice(
    State(state): State<AppState>,
    Json(req): Json<RepriceRequest>,
) -> Result<Json<ComparisonResponse>> {
    let now = req.as_of.unwrap_or_else(Utc::now);
    let validation = validate_new_dates(req.new_check_in, req.new_check_out, now);
    if let Some(error) = validation.error {
        return Err(AppError::BadRequest(error.to_string()));
    }

    let reference = state.cache.current().await;
    let comparison =
        recalculate_booking_price(&req.booking, req.new_check_in, req.new_check_out, &reference);
    Ok(Json(ComparisonResponse::from(&comparison)))
}

async fn validate_dates(Json(req): Json<ValidateDatesRequest>) -> Json<DateValidationResponse> {
    let now = req.as_of.unwrap_or_else(Utc::now);
    let validation = validate_new_dates(req.new_check_in, req.new_check_out, now);
    Json(DateValidationResponse::from(&validation))
}

async fn schedule(
    State(state): State<AppState>,
    Json(req): Json<ScheduleRequest>,
) -> Json<ScheduleResponse> {
    let now = req.as_of.unwrap_or_else(Utc::now);
    let schedule = payment_schedule(req.total, req.check_in, now, &state.deposit);
    Json(ScheduleResponse::from(&schedule))
}
