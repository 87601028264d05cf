use chrono::{Datelike, NaiveDateTime, NaiveTime, Weekday};
use serde::{Deserialize, Serialize};

use bookwise_core::{DomainError, DomainResult, ValueObject};

/// Day numbering used throughout scheduling: Monday = 1 … Sunday = 7.
///
/// Kept as an explicit table so stored `DayOfWeek` values never depend on
/// any platform weekday enumeration.
pub const WEEKDAY_NUMBERING: [(Weekday, u8); 7] = [
    (Weekday::Mon, 1),
    (Weekday::Tue, 2),
    (Weekday::Wed, 3),
    (Weekday::Thu, 4),
    (Weekday::Fri, 5),
    (Weekday::Sat, 6),
    (Weekday::Sun, 7),
];

/// Weekday in the 1–7 numbering of [`WEEKDAY_NUMBERING`].
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct DayOfWeek(u8);

impl DayOfWeek {
    pub const MONDAY: DayOfWeek = DayOfWeek(1);
    pub const TUESDAY: DayOfWeek = DayOfWeek(2);
    pub const WEDNESDAY: DayOfWeek = DayOfWeek(3);
    pub const THURSDAY: DayOfWeek = DayOfWeek(4);
    pub const FRIDAY: DayOfWeek = DayOfWeek(5);
    pub const SATURDAY: DayOfWeek = DayOfWeek(6);
    pub const SUNDAY: DayOfWeek = DayOfWeek(7);

    pub fn from_number(number: u8) -> DomainResult<Self> {
        if (1..=7).contains(&number) {
            Ok(Self(number))
        } else {
            Err(DomainError::InvalidWeekday(number))
        }
    }

    pub fn from_weekday(weekday: Weekday) -> Self {
        let (_, number) = match weekday {
            Weekday::Mon => WEEKDAY_NUMBERING[0],
            Weekday::Tue => WEEKDAY_NUMBERING[1],
            Weekday::Wed => WEEKDAY_NUMBERING[2],
            Weekday::Thu => WEEKDAY_NUMBERING[3],
            Weekday::Fri => WEEKDAY_NUMBERING[4],
            Weekday::Sat => WEEKDAY_NUMBERING[5],
            Weekday::Sun => WEEKDAY_NUMBERING[6],
        };
        Self(number)
    }

    /// Weekday of a calendar timestamp.
    pub fn of(at: NaiveDateTime) -> Self {
        Self::from_weekday(at.weekday())
    }

    pub fn number(self) -> u8 {
        self.0
    }

    pub fn weekday(self) -> Weekday {
        // Every constructor keeps the number in 1..=7, so the table lookup is total.
        let (weekday, _) = WEEKDAY_NUMBERING[usize::from(self.0 - 1)];
        weekday
    }
}

impl TryFrom<u8> for DayOfWeek {
    type Error = DomainError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        DayOfWeek::from_number(value)
    }
}

impl From<DayOfWeek> for u8 {
    fn from(day: DayOfWeek) -> Self {
        day.0
    }
}

/// A provider's working window for one weekday, or a day off.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "WorkingHoursRepr", into = "WorkingHoursRepr")]
pub struct WorkingHours {
    day: DayOfWeek,
    is_working_day: bool,
    start: NaiveTime,
    end: NaiveTime,
}

#[derive(Serialize, Deserialize)]
struct WorkingHoursRepr {
    day: DayOfWeek,
    is_working_day: bool,
    start: NaiveTime,
    end: NaiveTime,
}

impl TryFrom<WorkingHoursRepr> for WorkingHours {
    type Error = DomainError;

    fn try_from(repr: WorkingHoursRepr) -> Result<Self, Self::Error> {
        if repr.is_working_day {
            WorkingHours::working(repr.day, repr.start, repr.end)
        } else {
            Ok(WorkingHours::day_off(repr.day))
        }
    }
}

impl From<WorkingHours> for WorkingHoursRepr {
    fn from(hours: WorkingHours) -> Self {
        Self {
            day: hours.day,
            is_working_day: hours.is_working_day,
            start: hours.start,
            end: hours.end,
        }
    }
}

impl ValueObject for WorkingHours {}

impl WorkingHours {
    /// A working day from `start` to `end`; fails with `InvalidWorkingWindow`
    /// unless `start < end`.
    pub fn working(day: DayOfWeek, start: NaiveTime, end: NaiveTime) -> DomainResult<Self> {
        if start >= end {
            return Err(DomainError::InvalidWorkingWindow { start, end });
        }
        Ok(Self {
            day,
            is_working_day: true,
            start,
            end,
        })
    }

    /// A non-working day. The stored times are unused.
    pub fn day_off(day: DayOfWeek) -> Self {
        Self {
            day,
            is_working_day: false,
            start: NaiveTime::MIN,
            end: NaiveTime::MIN,
        }
    }

    pub fn day(&self) -> DayOfWeek {
        self.day
    }

    pub fn is_working_day(&self) -> bool {
        self.is_working_day
    }

    pub fn start(&self) -> NaiveTime {
        self.start
    }

    pub fn end(&self) -> NaiveTime {
        self.end
    }

    /// True when the time-of-day range `[from, to]` lies within the window.
    pub fn covers(&self, from: NaiveTime, to: NaiveTime) -> bool {
        self.is_working_day && from >= self.start && to <= self.end
    }
}
