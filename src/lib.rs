//! Pricing and booking-modification rules for dog boarding reservations.
//!
//! [`pricing`] quotes a stay; [`modification`] decides whether an existing
//! booking may change and re-prices it. Both are pure: reference data and
//! "now" are passed in. The binary wraps them in a small JSON service.

pub mod cache;
pub mod config;
pub mod error;
pub mod modification;
pub mod pricing;
pub mod schedule;

pub use error::{AppError, Result};
