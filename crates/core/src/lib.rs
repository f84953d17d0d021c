//! `armetix-core`: domain foundation building blocks.
//!
//! This crate contains **pure domain** primitives shared by every module of the
//! settlement engine (no infrastructure concerns): typed identifiers, the error
//! taxonomy and exact money helpers.

pub mod entity;
pub mod error;
pub mod id;
pub mod money;

pub use entity::Entity;
pub use error::{DomainError, DomainResult};
pub use id::{ExpenseId, InvoiceId, PartnerId, PaymentId, ProductId};
pub use money::{Decimal, SETTLEMENT_EPSILON};
