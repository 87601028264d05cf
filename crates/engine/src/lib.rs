//! `bookwise-engine` — wires scheduling, pricing, promotions and invoicing
//! together behind one configured entry point.

pub mod checkout;
pub mod config;
pub mod engine;

pub use checkout::{CheckoutItem, checkout};
pub use config::EngineConfig;
pub use engine::Engine;
