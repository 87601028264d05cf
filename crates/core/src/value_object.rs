//! Value object trait: equality by value, not identity.

/// Marker trait for value objects.
///
/// Value objects are **immutable** and **compared by value**: `Money`,
/// `Postcode`, `TimeSlot` and `WorkingHours` are all value objects, while a
/// `Provider` or `Invoice` is an aggregate with identity.
///
/// To "modify" a value object, build a new one through its validating
/// constructor. No operation on a value object hands back a half-valid value.
pub trait ValueObject: Clone + PartialEq + core::fmt::Debug {}
