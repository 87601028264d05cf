//! Domain error model.

use chrono::{NaiveDateTime, NaiveTime};
use rust_decimal::Decimal;
use thiserror::Error;

/// Result type used across the domain layer.
pub type DomainResult<T> = Result<T, DomainError>;

/// Domain-level error.
///
/// Every variant is a deterministic business failure raised at the point of
/// construction or mutation. Translating these into user-facing messages is
/// left to the calling layer.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    // --- money ---
    #[error("invalid amount: {0} (amounts cannot be negative)")]
    InvalidAmount(Decimal),

    #[error("invalid currency: {0:?}")]
    InvalidCurrency(String),

    #[error("currency mismatch: {left} vs {right}")]
    CurrencyMismatch { left: String, right: String },

    #[error("invalid factor: {0} (must not be negative)")]
    InvalidFactor(Decimal),

    #[error("invalid divisor: {0} (must be positive)")]
    InvalidDivisor(Decimal),

    // --- postcode ---
    #[error("postcode cannot be empty")]
    EmptyPostcode,

    #[error("invalid postcode format: {0:?}")]
    InvalidFormat(String),

    // --- scheduling ---
    #[error("invalid interval: start {start} must be before end {end}")]
    InvalidInterval {
        start: NaiveDateTime,
        end: NaiveDateTime,
    },

    #[error("invalid working window: start {start} must be before end {end}")]
    InvalidWorkingWindow { start: NaiveTime, end: NaiveTime },

    #[error("invalid weekday number: {0} (expected 1-7)")]
    InvalidWeekday(u8),

    #[error("no providers specified")]
    NoProvidersSpecified,

    #[error("provider not found: {0}")]
    ProviderNotFound(String),

    // --- pricing ---
    #[error("invalid multiplier: {0} (expected 0 to 3.0)")]
    InvalidMultiplier(Decimal),

    // --- promotions ---
    #[error("promotion is inactive")]
    PromotionInactive,

    #[error("promotion is not yet valid")]
    PromotionNotYetValid,

    #[error("promotion has expired")]
    PromotionExpired,

    #[error("promotion usage limit reached")]
    UsageLimitReached,

    #[error("order total is below the promotion minimum of {minimum}")]
    BelowMinimumOrder { minimum: Decimal },

    // --- invoicing ---
    #[error("invalid quantity: {0} (must be positive)")]
    InvalidQuantity(u32),

    // --- generic ---
    /// A value failed validation (e.g. malformed input).
    #[error("validation failed: {0}")]
    Validation(String),

    /// A domain invariant was violated.
    #[error("invariant violated: {0}")]
    InvariantViolation(String),

    /// A requested resource was not found (domain-level).
    #[error("not found")]
    NotFound,

    /// A conflict occurred (e.g. stale version / optimistic concurrency).
    #[error("conflict: {0}")]
    Conflict(String),
}

impl DomainError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn invariant(msg: impl Into<String>) -> Self {
        Self::InvariantViolation(msg.into())
    }

    pub fn conflict(msg: impl Into<String>) -> Self {
        Self::Conflict(msg.into())
    }

    pub fn not_found() -> Self {
        Self::NotFound
    }

    pub fn currency_mismatch(left: impl Into<String>, right: impl Into<String>) -> Self {
        Self::CurrencyMismatch {
            left: left.into(),
            right: right.into(),
        }
    }
}
