//! Scan window configuration for the slot enumerator.

use chrono::{Duration, NaiveTime};
use serde::{Deserialize, Serialize};

use bookwise_core::{DomainError, DomainResult};

pub const WINDOW_START_VAR: &str = "BOOKWISE_SCAN_WINDOW_START";
pub const WINDOW_END_VAR: &str = "BOOKWISE_SCAN_WINDOW_END";
pub const STEP_MINUTES_VAR: &str = "BOOKWISE_SCAN_STEP_MINUTES";

const TIME_FORMAT: &str = "%H:%M";

/// Time-of-day range and grid step walked by [`scan_day`](crate::scan_day).
///
/// This is a scan window, not a business rule: every candidate still goes
/// through the provider's availability predicate.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "ScanConfigRepr", into = "ScanConfigRepr")]
pub struct ScanConfig {
    window_start: NaiveTime,
    window_end: NaiveTime,
    step_minutes: u32,
}

#[derive(Serialize, Deserialize)]
struct ScanConfigRepr {
    window_start: NaiveTime,
    window_end: NaiveTime,
    step_minutes: u32,
}

impl TryFrom<ScanConfigRepr> for ScanConfig {
    type Error = DomainError;

    fn try_from(repr: ScanConfigRepr) -> Result<Self, Self::Error> {
        ScanConfig::new(repr.window_start, repr.window_end, repr.step_minutes)
    }
}

impl From<ScanConfig> for ScanConfigRepr {
    fn from(config: ScanConfig) -> Self {
        Self {
            window_start: config.window_start,
            window_end: config.window_end,
            step_minutes: config.step_minutes,
        }
    }
}

impl Default for ScanConfig {
    /// 08:30–18:30 in 30-minute steps.
    fn default() -> Self {
        Self {
            window_start: NaiveTime::from_hms_opt(8, 30, 0).unwrap_or_default(),
            window_end: NaiveTime::from_hms_opt(18, 30, 0).unwrap_or_default(),
            step_minutes: 30,
        }
    }
}

impl ScanConfig {
    pub fn new(window_start: NaiveTime, window_end: NaiveTime, step_minutes: u32) -> DomainResult<Self> {
        if window_start >= window_end {
            return Err(DomainError::InvalidWorkingWindow {
                start: window_start,
                end: window_end,
            });
        }
        if step_minutes == 0 {
            return Err(DomainError::validation("scan step must be at least one minute"));
        }
        Ok(Self {
            window_start,
            window_end,
            step_minutes,
        })
    }

    /// Reads overrides from `BOOKWISE_SCAN_*` environment variables.
    ///
    /// Unparseable or inconsistent values fall back to the defaults.
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Like [`from_env`](Self::from_env) with an arbitrary variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();

        let window_start = read_time(&lookup, WINDOW_START_VAR).unwrap_or(defaults.window_start);
        let window_end = read_time(&lookup, WINDOW_END_VAR).unwrap_or(defaults.window_end);
        let step_minutes = lookup(STEP_MINUTES_VAR)
            .and_then(|raw| match raw.trim().parse::<u32>() {
                Ok(step) => Some(step),
                Err(err) => {
                    tracing::warn!(var = STEP_MINUTES_VAR, %raw, %err, "ignoring invalid scan step");
                    None
                }
            })
            .unwrap_or(defaults.step_minutes);

        match Self::new(window_start, window_end, step_minutes) {
            Ok(config) => config,
            Err(err) => {
                tracing::warn!(%err, "invalid scan configuration; using defaults");
                defaults
            }
        }
    }

    pub fn window_start(&self) -> NaiveTime {
        self.window_start
    }

    pub fn window_end(&self) -> NaiveTime {
        self.window_end
    }

    pub fn step(&self) -> Duration {
        Duration::minutes(i64::from(self.step_minutes))
    }
}

fn read_time(lookup: &impl Fn(&str) -> Option<String>, name: &str) -> Option<NaiveTime> {
    let raw = lookup(name)?;
    match NaiveTime::parse_from_str(raw.trim(), TIME_FORMAT) {
        Ok(time) => Some(time),
        Err(err) => {
            tracing::warn!(var = name, %raw, %err, "ignoring invalid scan window time");
            None
        }
    }
}
