//! Folds priced services and an optional promotion into an invoice.

use chrono::{DateTime, Utc};

use bookwise_core::{DomainError, DomainResult, Postcode};
use bookwise_invoicing::{Invoice, InvoiceId, NewLineItem};
use bookwise_pricing::Service;
use bookwise_promotions::Promotion;

/// One service being bought, with how many units.
#[derive(Debug, Copy, Clone)]
pub struct CheckoutItem<'a> {
    pub service: &'a Service,
    pub quantity: u32,
}

impl<'a> CheckoutItem<'a> {
    pub fn new(service: &'a Service, quantity: u32) -> Self {
        Self { service, quantity }
    }
}

/// Builds an invoice for `items` priced at `postcode`.
///
/// The invoice takes the first service's currency. All lines go in through
/// one bulk insert, and `promotion` is only redeemed once that insert has
/// succeeded, so a failure never leaves a half-built invoice or a consumed
/// promotion behind.
pub fn checkout(
    invoice_id: InvoiceId,
    postcode: &Postcode,
    items: &[CheckoutItem<'_>],
    promotion: Option<&mut Promotion>,
    now: DateTime<Utc>,
) -> DomainResult<Invoice> {
    let first = items
        .first()
        .ok_or_else(|| DomainError::validation("checkout requires at least one service"))?;
    let currency = first.service.base_price().currency();

    let lines = items
        .iter()
        .map(|item| {
            let unit_price = item.service.adjusted_price_for_postcode(postcode)?;
            Ok(NewLineItem::new(item.service.name(), unit_price, item.quantity))
        })
        .collect::<DomainResult<Vec<_>>>()?;

    let mut invoice = Invoice::new(invoice_id, currency);
    invoice.add_line_items(lines)?;

    if let Some(promotion) = promotion {
        invoice.apply_promotion(promotion, now)?;
    }

    tracing::info!(
        %invoice_id,
        %postcode,
        lines = invoice.lines().len(),
        subtotal = %invoice.subtotal(),
        total = %invoice.total_amount(),
        "checkout completed"
    );

    Ok(invoice)
}
