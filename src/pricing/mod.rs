//! Pricing engine module.
//!
//! Computes the price of a boarding stay from its dates, stay-length tier,
//! peak-period surcharge, dog-condition surcharge and add-on services.

pub mod calculators;
pub mod days;
pub mod models;
pub mod requests;
pub mod responses;
pub mod routes;

// Re-export commonly used items
pub use calculators::{
    compute_price, round_money, ConstraintLevel, PriceQuote, PricingWarning, ServiceLine,
    StayRequest,
};
pub use models::{ReferenceData, ReferenceDataError};
pub use routes::router;
