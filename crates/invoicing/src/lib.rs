//! Invoicing domain module.
//!
//! Invoices hold priced line items and an optional discount. Totals are
//! always recomputed from the full line list. Pure domain logic (no IO, no
//! storage).

pub mod invoice;

pub use invoice::{
    AddLineItems, ApplyDiscount, DiscountApplied, Invoice, InvoiceCommand, InvoiceEvent,
    InvoiceId, InvoiceLine, LineItemsAdded, NewLineItem,
};
