//! Inventory dashboard figures: low-stock alerts and stock valuation.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use armetix_core::money::add;
use armetix_core::{DomainResult, ProductId};

use crate::product::Product;

/// Products strictly below this quantity raise a low-stock alert.
pub const DEFAULT_LOW_STOCK_THRESHOLD: i64 = 5;

/// Σ priceHT × stockQuantity over the given products.
///
/// Fails with a Validation error when the total leaves the `Decimal` range.
pub fn stock_value<'a>(products: impl IntoIterator<Item = &'a Product>) -> DomainResult<Decimal> {
    products
        .into_iter()
        .try_fold(Decimal::ZERO, |total, product| add(total, product.stock_value()?))
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LowStockItem {
    pub product_id: ProductId,
    pub reference: String,
    pub designation: String,
    pub stock_quantity: i64,
}

/// Point-in-time inventory snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InventorySummary {
    pub product_count: usize,
    pub low_stock_threshold: i64,
    pub low_stock_count: usize,
    pub low_stock: Vec<LowStockItem>,
    pub stock_value: Decimal,
}

impl InventorySummary {
    pub fn from_products(products: &[Product], low_stock_threshold: i64) -> DomainResult<Self> {
        let low_stock: Vec<LowStockItem> = products
            .iter()
            .filter(|p| p.stock_quantity() < low_stock_threshold)
            .map(|p| LowStockItem {
                product_id: p.id_typed(),
                reference: p.reference().to_string(),
                designation: p.designation().to_string(),
                stock_quantity: p.stock_quantity(),
            })
            .collect();

        Ok(Self {
            product_count: products.len(),
            low_stock_threshold,
            low_stock_count: low_stock.len(),
            low_stock,
            stock_value: stock_value(products)?,
        })
    }
}
