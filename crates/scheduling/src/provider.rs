use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use bookwise_core::{Aggregate, AggregateRoot, DomainError, DomainResult, Event};

use crate::availability::{self, Unavailability};
use crate::time_slot::TimeSlot;
use crate::working_hours::{DayOfWeek, WorkingHours};

bookwise_core::aggregate_id_newtype!(
    /// Service provider identifier.
    ProviderId
);

/// Aggregate root: a bookable service provider.
///
/// Holds at most one [`WorkingHours`] record per weekday and an unordered set
/// of unavailability exceptions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Provider {
    id: ProviderId,
    name: String,
    is_active: bool,
    working_hours: BTreeMap<DayOfWeek, WorkingHours>,
    unavailable: Vec<TimeSlot>,
    version: u64,
}

impl Provider {
    /// A new, active provider with no working hours.
    pub fn new(id: ProviderId, name: impl Into<String>) -> DomainResult<Self> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(DomainError::validation("provider name cannot be empty"));
        }
        Ok(Self {
            id,
            name,
            is_active: true,
            working_hours: BTreeMap::new(),
            unavailable: Vec::new(),
            version: 0,
        })
    }

    pub fn id_typed(&self) -> ProviderId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_active(&self) -> bool {
        self.is_active
    }

    pub fn working_hours(&self) -> impl Iterator<Item = &WorkingHours> {
        self.working_hours.values()
    }

    pub fn working_hours_for(&self, day: DayOfWeek) -> Option<&WorkingHours> {
        self.working_hours.get(&day)
    }

    pub fn unavailable_slots(&self) -> &[TimeSlot] {
        &self.unavailable
    }

    /// Add (or replace) the record for `hours.day()`.
    pub fn add_working_hours(&mut self, hours: WorkingHours) -> DomainResult<()> {
        self.execute(&ProviderCommand::SetWorkingHours(SetWorkingHours { hours }))
            .map(drop)
    }

    /// Fails with `Conflict` if the exact slot is already recorded.
    pub fn mark_as_unavailable(&mut self, slot: TimeSlot) -> DomainResult<()> {
        self.execute(&ProviderCommand::MarkUnavailable(MarkUnavailable { slot }))
            .map(drop)
    }

    /// Fails with `NotFound` if the slot was never recorded.
    pub fn remove_unavailability(&mut self, slot: TimeSlot) -> DomainResult<()> {
        self.execute(&ProviderCommand::ClearUnavailability(ClearUnavailability { slot }))
            .map(drop)
    }

    pub fn activate(&mut self) -> DomainResult<()> {
        self.execute(&ProviderCommand::Activate).map(drop)
    }

    pub fn deactivate(&mut self) -> DomainResult<()> {
        self.execute(&ProviderCommand::Deactivate).map(drop)
    }

    pub fn check_availability(&self, slot: &TimeSlot) -> Result<(), Unavailability> {
        availability::check_availability(
            self.is_active,
            &self.working_hours,
            &self.unavailable,
            slot,
        )
    }

    pub fn is_available_at(&self, slot: &TimeSlot) -> bool {
        match self.check_availability(slot) {
            Ok(()) => true,
            Err(reason) => {
                tracing::debug!(provider_id = %self.id, ?slot, ?reason, "slot unavailable");
                false
            }
        }
    }
}

impl AggregateRoot for Provider {
    type Id = ProviderId;

    fn id(&self) -> &Self::Id {
        &self.id
    }

    fn version(&self) -> u64 {
        self.version
    }
}

/// Command: SetWorkingHours.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SetWorkingHours {
    pub hours: WorkingHours,
}

/// Command: MarkUnavailable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarkUnavailable {
    pub slot: TimeSlot,
}

/// Command: ClearUnavailability.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClearUnavailability {
    pub slot: TimeSlot,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProviderCommand {
    SetWorkingHours(SetWorkingHours),
    MarkUnavailable(MarkUnavailable),
    ClearUnavailability(ClearUnavailability),
    Activate,
    Deactivate,
}

/// Event: WorkingHoursSet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkingHoursSet {
    pub provider_id: ProviderId,
    pub hours: WorkingHours,
    /// The record this one replaced, if any.
    pub replaced: Option<WorkingHours>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProviderEvent {
    WorkingHoursSet(WorkingHoursSet),
    MarkedUnavailable {
        provider_id: ProviderId,
        slot: TimeSlot,
    },
    UnavailabilityCleared {
        provider_id: ProviderId,
        slot: TimeSlot,
    },
    Activated {
        provider_id: ProviderId,
    },
    Deactivated {
        provider_id: ProviderId,
    },
}

impl Event for ProviderEvent {
    fn event_type(&self) -> &'static str {
        match self {
            ProviderEvent::WorkingHoursSet(_) => "scheduling.provider.working_hours_set",
            ProviderEvent::MarkedUnavailable { .. } => "scheduling.provider.marked_unavailable",
            ProviderEvent::UnavailabilityCleared { .. } => {
                "scheduling.provider.unavailability_cleared"
            }
            ProviderEvent::Activated { .. } => "scheduling.provider.activated",
            ProviderEvent::Deactivated { .. } => "scheduling.provider.deactivated",
        }
    }
}

impl Aggregate for Provider {
    type Command = ProviderCommand;
    type Event = ProviderEvent;
    type Error = DomainError;

    fn apply(&mut self, event: &Self::Event) {
        match event {
            ProviderEvent::WorkingHoursSet(e) => {
                self.working_hours.insert(e.hours.day(), e.hours);
            }
            ProviderEvent::MarkedUnavailable { slot, .. } => {
                self.unavailable.push(*slot);
            }
            ProviderEvent::UnavailabilityCleared { slot, .. } => {
                self.unavailable.retain(|s| s != slot);
            }
            ProviderEvent::Activated { .. } => self.is_active = true,
            ProviderEvent::Deactivated { .. } => self.is_active = false,
        }

        self.version += 1;
    }

    fn handle(&self, command: &Self::Command) -> Result<Vec<Self::Event>, Self::Error> {
        let provider_id = self.id;
        match command {
            ProviderCommand::SetWorkingHours(cmd) => {
                Ok(vec![ProviderEvent::WorkingHoursSet(WorkingHoursSet {
                    provider_id,
                    hours: cmd.hours,
                    replaced: self.working_hours.get(&cmd.hours.day()).copied(),
                })])
            }
            ProviderCommand::MarkUnavailable(cmd) => {
                if self.unavailable.contains(&cmd.slot) {
                    return Err(DomainError::conflict("slot is already marked unavailable"));
                }
                Ok(vec![ProviderEvent::MarkedUnavailable {
                    provider_id,
                    slot: cmd.slot,
                }])
            }
            ProviderCommand::ClearUnavailability(cmd) => {
                if !self.unavailable.contains(&cmd.slot) {
                    return Err(DomainError::not_found());
                }
                Ok(vec![ProviderEvent::UnavailabilityCleared {
                    provider_id,
                    slot: cmd.slot,
                }])
            }
            ProviderCommand::Activate => {
                if self.is_active {
                    return Err(DomainError::conflict("provider is already active"));
                }
                Ok(vec![ProviderEvent::Activated { provider_id }])
            }
            ProviderCommand::Deactivate => {
                if !self.is_active {
                    return Err(DomainError::conflict("provider is already inactive"));
                }
                Ok(vec![ProviderEvent::Deactivated { provider_id }])
            }
        }
    }
}
