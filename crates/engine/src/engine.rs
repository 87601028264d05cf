use chrono::{DateTime, Duration, NaiveDate, Utc};

use bookwise_core::{DomainResult, Postcode};
use bookwise_invoicing::{Invoice, InvoiceId};
use bookwise_promotions::Promotion;
use bookwise_scheduling::{ProviderDirectory, ProviderId, SlotAvailability};

use crate::checkout::{self, CheckoutItem};
use crate::config::EngineConfig;

/// Entry point bundling the configured scheduling and checkout operations.
#[derive(Debug, Clone, Default)]
pub struct Engine {
    config: EngineConfig,
}

impl Engine {
    pub fn new(config: EngineConfig) -> Self {
        Self { config }
    }

    pub fn from_env() -> Self {
        Self::new(EngineConfig::from_env())
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Day scan over the configured window.
    pub fn scan_day<D>(
        &self,
        directory: &D,
        provider_ids: &[ProviderId],
        date: NaiveDate,
        duration: Duration,
    ) -> DomainResult<Vec<SlotAvailability>>
    where
        D: ProviderDirectory + ?Sized,
    {
        bookwise_scheduling::scan_day(directory, provider_ids, date, duration, &self.config.scan)
    }

    /// Available rows only, in scan order.
    pub fn available_slots<D>(
        &self,
        directory: &D,
        provider_ids: &[ProviderId],
        date: NaiveDate,
        duration: Duration,
    ) -> DomainResult<Vec<SlotAvailability>>
    where
        D: ProviderDirectory + ?Sized,
    {
        let mut rows = self.scan_day(directory, provider_ids, date, duration)?;
        rows.retain(|row| row.available);
        Ok(rows)
    }

    /// Empty invoice in the configured default currency.
    pub fn open_invoice(&self, invoice_id: InvoiceId) -> Invoice {
        Invoice::new(invoice_id, self.config.default_currency)
    }

    pub fn checkout(
        &self,
        invoice_id: InvoiceId,
        postcode: &Postcode,
        items: &[CheckoutItem<'_>],
        promotion: Option<&mut Promotion>,
        now: DateTime<Utc>,
    ) -> DomainResult<Invoice> {
        checkout::checkout(invoice_id, postcode, items, promotion, now)
    }
}
