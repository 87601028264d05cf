use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use bookwise_core::{
    Aggregate, AggregateRoot, Currency, DomainError, DomainResult, Event, ExpectedVersion, Money,
};
use bookwise_promotions::{Promotion, PromotionId};

bookwise_core::aggregate_id_newtype!(
    /// Invoice identifier.
    InvoiceId
);

/// A line item as requested by the caller, before it is numbered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewLineItem {
    pub description: String,
    pub unit_price: Money,
    pub quantity: u32,
}

impl NewLineItem {
    pub fn new(description: impl Into<String>, unit_price: Money, quantity: u32) -> Self {
        Self {
            description: description.into(),
            unit_price,
            quantity,
        }
    }
}

/// Invoice line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvoiceLine {
    pub line_no: u32,
    pub description: String,
    pub unit_price: Money,
    pub quantity: u32,
}

impl InvoiceLine {
    /// `unit_price × quantity`.
    pub fn line_total(&self) -> DomainResult<Money> {
        self.unit_price.multiply(Decimal::from(self.quantity))
    }
}

/// Aggregate root: Invoice.
///
/// `subtotal` is always the sum of every line total and
/// `total_amount = subtotal - discount_amount`. Both are recomputed from the
/// full line list on every change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invoice {
    id: InvoiceId,
    currency: Currency,
    lines: Vec<InvoiceLine>,
    subtotal: Money,
    discount_amount: Money,
    total_amount: Money,
    promotion_id: Option<PromotionId>,
    version: u64,
}

impl Invoice {
    /// Empty invoice; all amounts are zero in `currency`.
    pub fn new(id: InvoiceId, currency: Currency) -> Self {
        Self {
            id,
            currency,
            lines: Vec::new(),
            subtotal: Money::zero(currency),
            discount_amount: Money::zero(currency),
            total_amount: Money::zero(currency),
            promotion_id: None,
            version: 0,
        }
    }

    pub fn id_typed(&self) -> InvoiceId {
        self.id
    }

    pub fn currency(&self) -> Currency {
        self.currency
    }

    pub fn lines(&self) -> &[InvoiceLine] {
        &self.lines
    }

    pub fn subtotal(&self) -> Money {
        self.subtotal
    }

    pub fn discount_amount(&self) -> Money {
        self.discount_amount
    }

    pub fn total_amount(&self) -> Money {
        self.total_amount
    }

    /// Promotion whose discount is currently recorded, if any.
    pub fn promotion_id(&self) -> Option<PromotionId> {
        self.promotion_id
    }

    pub fn add_line_item(
        &mut self,
        description: impl Into<String>,
        unit_price: Money,
        quantity: u32,
    ) -> DomainResult<()> {
        self.add_line_items(vec![NewLineItem::new(description, unit_price, quantity)])
    }

    /// Appends every item or none of them.
    pub fn add_line_items(&mut self, items: Vec<NewLineItem>) -> DomainResult<()> {
        self.execute(&InvoiceCommand::AddLineItems(AddLineItems { items }))
            .map(drop)
    }

    /// Records a flat discount; it must not exceed the current subtotal.
    ///
    /// Fails with `Conflict` once a promotion has been applied.
    pub fn apply_discount(&mut self, amount: Money) -> DomainResult<()> {
        self.execute(&InvoiceCommand::ApplyDiscount(ApplyDiscount {
            amount,
            promotion_id: None,
        }))
        .map(drop)
    }

    /// Redeems `promotion` against the current subtotal and records the
    /// discount. Either both sides change or neither does. At most one
    /// promotion per invoice.
    pub fn apply_promotion(&mut self, promotion: &mut Promotion, now: DateTime<Utc>) -> DomainResult<Money> {
        let quote = promotion.quote(&self.subtotal, now)?;
        let events = self.handle(&InvoiceCommand::ApplyDiscount(ApplyDiscount {
            amount: quote.discount,
            promotion_id: Some(promotion.id_typed()),
        }))?;

        let expected = ExpectedVersion::Exact(promotion.version());
        promotion.redeem(&self.subtotal, now, expected)?;

        for event in &events {
            self.apply(event);
        }
        Ok(self.total_amount)
    }

    /// Recomputes subtotal and total from the lines and the recorded discount.
    ///
    /// Idempotent: running it again without other changes is a no-op.
    pub fn recalculate_totals(&mut self) -> DomainResult<()> {
        let (subtotal, total_amount) = self.totals(&self.lines, &self.discount_amount)?;
        self.subtotal = subtotal;
        self.total_amount = total_amount;
        Ok(())
    }

    fn totals(&self, lines: &[InvoiceLine], discount: &Money) -> DomainResult<(Money, Money)> {
        let line_totals = lines
            .iter()
            .map(InvoiceLine::line_total)
            .collect::<DomainResult<Vec<_>>>()?;
        let subtotal = Money::sum(line_totals, self.currency)?;
        if discount.is_greater_than(&subtotal)? {
            return Err(DomainError::validation("discount cannot exceed invoice subtotal"));
        }
        let total_amount = subtotal.subtract(discount)?;
        Ok((subtotal, total_amount))
    }

    fn handle_add_line_items(&self, cmd: &AddLineItems) -> DomainResult<Vec<InvoiceEvent>> {
        if cmd.items.is_empty() {
            return Err(DomainError::validation("no line items to add"));
        }

        let mut next_line_no = u32::try_from(self.lines.len())
            .map_err(|_| DomainError::invariant("invoice line count overflow"))?;
        let mut added = Vec::with_capacity(cmd.items.len());
        for item in &cmd.items {
            if item.description.trim().is_empty() {
                return Err(DomainError::validation(
                    "invoice line description cannot be empty",
                ));
            }
            if item.quantity == 0 {
                return Err(DomainError::InvalidQuantity(item.quantity));
            }
            if item.unit_price.currency() != self.currency {
                return Err(DomainError::currency_mismatch(
                    self.currency.code(),
                    item.unit_price.currency().code(),
                ));
            }
            next_line_no = next_line_no
                .checked_add(1)
                .ok_or_else(|| DomainError::invariant("invoice line count overflow"))?;
            added.push(InvoiceLine {
                line_no: next_line_no,
                description: item.description.clone(),
                unit_price: item.unit_price,
                quantity: item.quantity,
            });
        }

        let all_lines: Vec<InvoiceLine> = self.lines.iter().chain(&added).cloned().collect();
        let (subtotal, total_amount) = self.totals(&all_lines, &self.discount_amount)?;

        Ok(vec![InvoiceEvent::LineItemsAdded(LineItemsAdded {
            invoice_id: self.id,
            lines: added,
            subtotal,
            total_amount,
        })])
    }

    fn handle_apply_discount(&self, cmd: &ApplyDiscount) -> DomainResult<Vec<InvoiceEvent>> {
        // A redeemed promotion stays on the invoice; replacing it would lose that use.
        if let Some(promotion_id) = self.promotion_id {
            return Err(DomainError::conflict(format!(
                "invoice already carries promotion {promotion_id}"
            )));
        }
        if cmd.amount.currency() != self.currency {
            return Err(DomainError::currency_mismatch(
                self.currency.code(),
                cmd.amount.currency().code(),
            ));
        }
        let (_, total_amount) = self.totals(&self.lines, &cmd.amount)?;

        Ok(vec![InvoiceEvent::DiscountApplied(DiscountApplied {
            invoice_id: self.id,
            amount: cmd.amount,
            promotion_id: cmd.promotion_id,
            total_amount,
        })])
    }
}

impl AggregateRoot for Invoice {
    type Id = InvoiceId;

    fn id(&self) -> &Self::Id {
        &self.id
    }

    fn version(&self) -> u64 {
        self.version
    }
}

/// Command: AddLineItems.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddLineItems {
    pub items: Vec<NewLineItem>,
}

/// Command: ApplyDiscount.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApplyDiscount {
    pub amount: Money,
    pub promotion_id: Option<PromotionId>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum InvoiceCommand {
    AddLineItems(AddLineItems),
    ApplyDiscount(ApplyDiscount),
}

/// Event: LineItemsAdded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineItemsAdded {
    pub invoice_id: InvoiceId,
    pub lines: Vec<InvoiceLine>,
    pub subtotal: Money,
    pub total_amount: Money,
}

/// Event: DiscountApplied.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiscountApplied {
    pub invoice_id: InvoiceId,
    pub amount: Money,
    pub promotion_id: Option<PromotionId>,
    pub total_amount: Money,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum InvoiceEvent {
    LineItemsAdded(LineItemsAdded),
    DiscountApplied(DiscountApplied),
}

impl Event for InvoiceEvent {
    fn event_type(&self) -> &'static str {
        match self {
            InvoiceEvent::LineItemsAdded(_) => "invoicing.invoice.line_items_added",
            InvoiceEvent::DiscountApplied(_) => "invoicing.invoice.discount_applied",
        }
    }
}

impl Aggregate for Invoice {
    type Command = InvoiceCommand;
    type Event = InvoiceEvent;
    type Error = DomainError;

    fn apply(&mut self, event: &Self::Event) {
        match event {
            InvoiceEvent::LineItemsAdded(e) => {
                self.lines.extend(e.lines.iter().cloned());
                self.subtotal = e.subtotal;
                self.total_amount = e.total_amount;
            }
            InvoiceEvent::DiscountApplied(e) => {
                self.discount_amount = e.amount;
                self.promotion_id = e.promotion_id;
                self.total_amount = e.total_amount;
                tracing::info!(
                    invoice_id = %self.id,
                    discount = %e.amount,
                    total = %e.total_amount,
                    promotion_id = ?e.promotion_id,
                    "invoice discount applied"
                );
            }
        }

        self.version += 1;
    }

    fn handle(&self, command: &Self::Command) -> Result<Vec<Self::Event>, Self::Error> {
        match command {
            InvoiceCommand::AddLineItems(cmd) => self.handle_add_line_items(cmd),
            InvoiceCommand::ApplyDiscount(cmd) => self.handle_apply_discount(cmd),
        }
    }
}
