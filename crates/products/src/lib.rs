//! Products domain module (catalog + quantity on hand).
//!
//! This crate contains business rules for products and the stock ledger,
//! implemented purely as deterministic domain logic (no IO, no HTTP, no storage).

pub mod product;
pub mod summary;
pub mod tva;

pub use product::{CreateProduct, Product};
pub use summary::{DEFAULT_LOW_STOCK_THRESHOLD, InventorySummary, LowStockItem, stock_value};
pub use tva::TvaRate;
