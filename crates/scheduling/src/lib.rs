//! Scheduling domain module.
//!
//! Time slots, weekly working hours, the provider availability predicate and
//! the day-grid slot enumerator. Pure domain logic (no IO, no storage).

pub mod availability;
pub mod config;
pub mod provider;
pub mod slot_scan;
pub mod time_slot;
pub mod working_hours;

pub use availability::{Unavailability, check_availability, is_available};
pub use config::ScanConfig;
pub use provider::{
    ClearUnavailability, MarkUnavailable, Provider, ProviderCommand, ProviderEvent, ProviderId,
    SetWorkingHours, WorkingHoursSet,
};
pub use slot_scan::{ProviderDirectory, SlotAvailability, candidate_slots, scan_day};
pub use time_slot::TimeSlot;
pub use working_hours::{DayOfWeek, WEEKDAY_NUMBERING, WorkingHours};
