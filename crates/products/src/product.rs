use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use armetix_core::money::extend;
use armetix_core::{DomainError, DomainResult, Entity, ProductId};

use crate::tva::TvaRate;

/// Catalog product with its quantity on hand.
///
/// `stock_quantity` may go negative (oversell pending reconciliation); it only
/// moves through [`Product::apply_stock_delta`], driven by invoice lifecycle.
/// `price_ht × stock_quantity` always fits in a `Decimal`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Product {
    id: ProductId,
    reference: String,
    designation: String,
    price_ht: Decimal,
    tva_rate: TvaRate,
    stock_quantity: i64,
    category: Option<String>,
    created_at: DateTime<Utc>,
}

impl Product {
    /// Validate a creation command and build the product.
    pub fn create(cmd: CreateProduct) -> DomainResult<Self> {
        let reference = cmd.reference.trim().to_string();
        if reference.is_empty() {
            return Err(DomainError::validation("reference cannot be empty"));
        }
        let designation = cmd.designation.trim().to_string();
        if designation.is_empty() {
            return Err(DomainError::validation("designation cannot be empty"));
        }
        if cmd.price_ht.is_sign_negative() {
            return Err(DomainError::validation("price_ht cannot be negative"));
        }
        let tva_rate = TvaRate::try_from(cmd.tva_rate)?;
        extend(cmd.price_ht, cmd.stock_quantity).map_err(|_| {
            DomainError::validation(format!(
                "stock value of {reference} exceeds the supported range"
            ))
        })?;

        Ok(Self {
            id: cmd.product_id,
            reference,
            designation,
            price_ht: cmd.price_ht,
            tva_rate,
            stock_quantity: cmd.stock_quantity,
            category: cmd
                .category
                .map(|c| c.trim().to_string())
                .filter(|c| !c.is_empty()),
            created_at: cmd.occurred_at,
        })
    }

    pub fn id_typed(&self) -> ProductId {
        self.id
    }

    pub fn reference(&self) -> &str {
        &self.reference
    }

    pub fn designation(&self) -> &str {
        &self.designation
    }

    pub fn price_ht(&self) -> Decimal {
        self.price_ht
    }

    pub fn tva_rate(&self) -> TvaRate {
        self.tva_rate
    }

    pub fn stock_quantity(&self) -> i64 {
        self.stock_quantity
    }

    pub fn category(&self) -> Option<&str> {
        self.category.as_deref()
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Value of the quantity on hand at the HT unit price.
    pub fn stock_value(&self) -> DomainResult<Decimal> {
        extend(self.price_ht, self.stock_quantity)
    }

    /// Increment quantity on hand by `delta` (negative allowed, no floor).
    ///
    /// Returns the new quantity. The product is left untouched on error.
    pub fn apply_stock_delta(&mut self, delta: i64) -> DomainResult<i64> {
        let quantity = self.stock_quantity.checked_add(delta).ok_or_else(|| {
            DomainError::consistency(format!("stock overflow on product {}", self.reference))
        })?;
        extend(self.price_ht, quantity).map_err(|_| {
            DomainError::validation(format!(
                "stock value of {} exceeds the supported range",
                self.reference
            ))
        })?;
        self.stock_quantity = quantity;
        Ok(quantity)
    }
}

impl Entity for Product {
    type Id = ProductId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

/// Command: CreateProduct.
///
/// `tva_rate` is the raw percentage as submitted; it is checked against
/// [`TvaRate`] during creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateProduct {
    pub product_id: ProductId,
    pub reference: String,
    pub designation: String,
    pub price_ht: Decimal,
    pub tva_rate: u32,
    pub stock_quantity: i64,
    pub category: Option<String>,
    pub occurred_at: DateTime<Utc>,
}
