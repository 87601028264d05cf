//! Pricing domain module.
//!
//! Services carry a base price plus postcode-area adjustments. Pure domain
//! logic (no IO, no storage).

pub mod postcode_pricing;
pub mod service;

pub use postcode_pricing::{MAX_MULTIPLIER, PostcodePricing};
pub use service::{PostcodePricingSet, Service, ServiceCommand, ServiceEvent, ServiceId, SetPostcodePricing};
