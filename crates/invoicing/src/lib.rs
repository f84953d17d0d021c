//! Invoicing domain module: sale/purchase invoices, payments, stock effects.
//!
//! This crate contains the settlement rules (tax totals, payment application,
//! status transitions, stock deltas), implemented purely as deterministic
//! domain logic (no IO, no HTTP, no storage).

pub mod invoice;
pub mod movements;
pub mod payment;

pub use invoice::{
    Invoice, InvoiceItem, InvoiceLineInput, InvoiceStatus, InvoiceTotals, InvoiceType,
    IssueInvoice,
};
pub use movements::{StockMovement, stock_movements};
pub use payment::{Payment, PaymentMethod, PaymentNumber, PaymentSequence, RecordPayment};
