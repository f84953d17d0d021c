//! Parties domain module (clients and suppliers).
//!
//! This crate contains business rules for partners, implemented purely as
//! deterministic domain logic (no IO, no HTTP, no storage).

pub mod partner;

pub use partner::{ContactInfo, Partner, PartnerKind, RegisterPartner};
