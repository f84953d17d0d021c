//! Joined views served to callers.
//!
//! References are resolved against the tables at read time; a reference whose
//! target is gone resolves to `None`, never to an error.

pub mod invoices;
pub mod payments;

pub use invoices::{InvoiceLineView, InvoiceReadModel, PartnerRef, ProductRef};
pub use payments::{InvoiceRef, PaymentReadModel};
