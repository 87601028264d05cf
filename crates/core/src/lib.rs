//! `bookwise-core` — domain foundation building blocks.
//!
//! Pure value objects (`Money`, `Postcode`), the shared error model and the
//! aggregate/event traits the scheduling, pricing, promotion and invoicing
//! crates are built on. No IO lives here.

pub mod aggregate;
pub mod error;
pub mod event;
pub mod id;
pub mod money;
pub mod postcode;
pub mod value_object;

pub use aggregate::{Aggregate, AggregateRoot, ExpectedVersion};
pub use error::{DomainError, DomainResult};
pub use event::Event;
pub use id::AggregateId;
pub use money::{Currency, Money};
pub use postcode::Postcode;
pub use value_object::ValueObject;
