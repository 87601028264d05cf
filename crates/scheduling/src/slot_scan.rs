//! Day-grid slot enumeration across several providers.

use std::collections::HashMap;
use std::hash::BuildHasher;

use chrono::{Duration, NaiveDate, NaiveDateTime};
use serde::Serialize;

use bookwise_core::{DomainError, DomainResult};

use crate::config::ScanConfig;
use crate::provider::{Provider, ProviderId};
use crate::time_slot::TimeSlot;

/// Resolves provider identifiers for a scan.
pub trait ProviderDirectory {
    fn find_provider(&self, id: ProviderId) -> Option<&Provider>;
}

impl<S: BuildHasher> ProviderDirectory for HashMap<ProviderId, Provider, S> {
    fn find_provider(&self, id: ProviderId) -> Option<&Provider> {
        self.get(&id)
    }
}

impl ProviderDirectory for [Provider] {
    fn find_provider(&self, id: ProviderId) -> Option<&Provider> {
        self.iter().find(|p| p.id_typed() == id)
    }
}

/// One row of a day scan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SlotAvailability {
    pub provider_id: ProviderId,
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
    pub available: bool,
}

/// Candidate slots of `duration` on `date`, stepping through the scan window.
///
/// A candidate whose end would pass the window end is not produced.
pub fn candidate_slots(
    date: NaiveDate,
    duration: Duration,
    config: &ScanConfig,
) -> DomainResult<Vec<TimeSlot>> {
    let window_start = date.and_time(config.window_start());
    let window_end = date.and_time(config.window_end());

    let invalid = || DomainError::InvalidInterval {
        start: window_start,
        end: window_start.checked_add_signed(duration).unwrap_or(window_start),
    };
    if duration <= Duration::zero() {
        return Err(invalid());
    }

    let mut slots = Vec::new();
    let mut start = window_start;
    loop {
        let end = start.checked_add_signed(duration).ok_or_else(invalid)?;
        if end > window_end {
            break;
        }
        slots.push(TimeSlot::create(start, end)?);
        start = start
            .checked_add_signed(config.step())
            .ok_or_else(|| DomainError::invariant("scan step overflow"))?;
    }
    Ok(slots)
}

/// Availability of every candidate slot for every requested provider.
///
/// Rows are ordered by slot start, then by the order of `provider_ids`.
/// All identifiers are resolved before any slot is evaluated.
pub fn scan_day<D>(
    directory: &D,
    provider_ids: &[ProviderId],
    date: NaiveDate,
    duration: Duration,
    config: &ScanConfig,
) -> DomainResult<Vec<SlotAvailability>>
where
    D: ProviderDirectory + ?Sized,
{
    if provider_ids.is_empty() {
        return Err(DomainError::NoProvidersSpecified);
    }

    let providers = provider_ids
        .iter()
        .map(|id| {
            directory
                .find_provider(*id)
                .ok_or_else(|| DomainError::ProviderNotFound(id.to_string()))
        })
        .collect::<DomainResult<Vec<_>>>()?;

    let slots = candidate_slots(date, duration, config)?;

    let rows: Vec<SlotAvailability> = slots
        .iter()
        .flat_map(|slot| {
            providers.iter().map(move |provider| SlotAvailability {
                provider_id: provider.id_typed(),
                start: slot.start(),
                end: slot.end(),
                available: provider.is_available_at(slot),
            })
        })
        .collect();

    tracing::debug!(
        %date,
        providers = providers.len(),
        candidates = slots.len(),
        available = rows.iter().filter(|r| r.available).count(),
        "scanned day"
    );

    Ok(rows)
}
