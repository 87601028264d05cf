use chrono::{Duration, NaiveDateTime};
use serde::{Deserialize, Serialize};

use bookwise_core::{DomainError, DomainResult, ValueObject};

/// Half-open interval `[start, end)` of local wall-clock time.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "TimeSlotRepr", into = "TimeSlotRepr")]
pub struct TimeSlot {
    start: NaiveDateTime,
    end: NaiveDateTime,
}

#[derive(Serialize, Deserialize)]
struct TimeSlotRepr {
    start: NaiveDateTime,
    end: NaiveDateTime,
}

impl TryFrom<TimeSlotRepr> for TimeSlot {
    type Error = DomainError;

    fn try_from(repr: TimeSlotRepr) -> Result<Self, Self::Error> {
        TimeSlot::create(repr.start, repr.end)
    }
}

impl From<TimeSlot> for TimeSlotRepr {
    fn from(slot: TimeSlot) -> Self {
        Self {
            start: slot.start,
            end: slot.end,
        }
    }
}

impl ValueObject for TimeSlot {}

impl TimeSlot {
    /// Fails with `InvalidInterval` unless `start < end`.
    pub fn create(start: NaiveDateTime, end: NaiveDateTime) -> DomainResult<Self> {
        if start >= end {
            return Err(DomainError::InvalidInterval { start, end });
        }
        Ok(Self { start, end })
    }

    /// Slot of `duration` beginning at `start`.
    pub fn starting_at(start: NaiveDateTime, duration: Duration) -> DomainResult<Self> {
        let end = start
            .checked_add_signed(duration)
            .ok_or_else(|| DomainError::invariant("time slot end out of range"))?;
        Self::create(start, end)
    }

    pub fn start(&self) -> NaiveDateTime {
        self.start
    }

    pub fn end(&self) -> NaiveDateTime {
        self.end
    }

    pub fn duration(&self) -> Duration {
        self.end - self.start
    }

    /// Open-interval test: slots that only share an endpoint do not overlap.
    pub fn overlaps_with(&self, other: &TimeSlot) -> bool {
        self.start < other.end && self.end > other.start
    }

    /// True when `other` lies entirely inside this slot.
    pub fn contains(&self, other: &TimeSlot) -> bool {
        self.start <= other.start && other.end <= self.end
    }

    pub fn shift(&self, delta: Duration) -> DomainResult<TimeSlot> {
        let start = self
            .start
            .checked_add_signed(delta)
            .ok_or_else(|| DomainError::invariant("time slot start out of range"))?;
        Self::starting_at(start, self.duration())
    }
}
