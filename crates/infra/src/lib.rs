//! Infrastructure layer: transactional store, settlement engine and the
//! joined read models served to callers.

pub mod db;
pub mod engine;
pub mod read_model;

#[cfg(test)]
mod integration_tests;

pub use db::{Database, StoreError, StoreResult, Transaction};
pub use engine::Engine;
pub use read_model::{InvoiceLineView, InvoiceReadModel, InvoiceRef, PartnerRef, PaymentReadModel, ProductRef};
