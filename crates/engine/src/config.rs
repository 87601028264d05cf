//! Engine-wide configuration.

use serde::{Deserialize, Serialize};

use bookwise_core::Currency;
use bookwise_scheduling::ScanConfig;

pub const DEFAULT_CURRENCY_VAR: &str = "BOOKWISE_DEFAULT_CURRENCY";

#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineConfig {
    pub scan: ScanConfig,
    /// Currency for invoices opened without any priced service.
    pub default_currency: Currency,
}

impl EngineConfig {
    /// Reads `BOOKWISE_*` environment variables, falling back to defaults.
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let scan = ScanConfig::from_lookup(&lookup);
        let default_currency = match lookup(DEFAULT_CURRENCY_VAR) {
            Some(raw) => raw.parse::<Currency>().unwrap_or_else(|err| {
                tracing::warn!(var = DEFAULT_CURRENCY_VAR, %raw, %err, "ignoring invalid default currency");
                Currency::default()
            }),
            None => Currency::default(),
        };

        Self {
            scan,
            default_currency,
        }
    }
}
