//! Availability predicate: working hours + unavailability exceptions.
//!
//! Pure functions over a snapshot of provider data. Nothing here reserves a
//! slot; a caller that books a slot must re-check availability inside the same
//! versioned write that records the new exception.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::time_slot::TimeSlot;
use crate::working_hours::{DayOfWeek, WorkingHours};

/// Why a candidate slot was rejected.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum Unavailability {
    /// The provider is deactivated.
    Inactive,
    /// The slot overlaps this unavailability exception.
    Blocked { exception: TimeSlot },
    /// No working hours are recorded for the slot's weekday.
    NoWorkingHours { day: DayOfWeek },
    /// The weekday is recorded as a day off.
    DayOff { day: DayOfWeek },
    /// The slot is not fully inside the working window.
    OutsideWorkingHours,
}

/// Decide availability of `slot`, evaluating the rules in order:
/// inactive, exceptions, weekday record, day off, containment.
pub fn check_availability(
    is_active: bool,
    working_hours: &BTreeMap<DayOfWeek, WorkingHours>,
    exceptions: &[TimeSlot],
    slot: &TimeSlot,
) -> Result<(), Unavailability> {
    if !is_active {
        return Err(Unavailability::Inactive);
    }

    if let Some(exception) = exceptions.iter().find(|e| e.overlaps_with(slot)) {
        return Err(Unavailability::Blocked {
            exception: *exception,
        });
    }

    let day = DayOfWeek::of(slot.start());
    let hours = working_hours
        .get(&day)
        .ok_or(Unavailability::NoWorkingHours { day })?;

    if !hours.is_working_day() {
        return Err(Unavailability::DayOff { day });
    }

    // Working windows are per calendar day.
    if slot.end().date() != slot.start().date() {
        return Err(Unavailability::OutsideWorkingHours);
    }

    if hours.covers(slot.start().time(), slot.end().time()) {
        Ok(())
    } else {
        Err(Unavailability::OutsideWorkingHours)
    }
}

/// Boolean projection of [`check_availability`].
pub fn is_available(
    is_active: bool,
    working_hours: &BTreeMap<DayOfWeek, WorkingHours>,
    exceptions: &[TimeSlot],
    slot: &TimeSlot,
) -> bool {
    check_availability(is_active, working_hours, exceptions, slot).is_ok()
}
