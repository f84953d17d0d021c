use tracing::{debug, info, warn};

use armetix_core::{DomainError, DomainResult, ProductId};
use armetix_invoicing::{StockMovement, stock_movements};
use armetix_products::{CreateProduct, InventorySummary, Product};

use crate::db::{StoreResult, Transaction};
use crate::engine::Engine;

/// Checked in-place stock increment inside an open unit of work.
///
/// A missing product fails the whole unit of work.
pub(crate) fn adjust_stock(
    tx: &mut Transaction<'_>,
    product_id: ProductId,
    delta: i64,
) -> DomainResult<i64> {
    let quantity = tx.modify::<Product, _>(&product_id, |p| p.apply_stock_delta(delta))?;
    debug!(product_id = %product_id, delta, quantity, "stock adjusted");
    Ok(quantity)
}

impl Engine {
    pub fn create_product(&self, cmd: CreateProduct) -> StoreResult<Product> {
        let product = Product::create(cmd)?;

        let mut tx = self.db.begin()?;
        let duplicate = tx
            .tables()
            .products
            .values()
            .any(|p| p.reference() == product.reference());
        if duplicate {
            warn!(reference = %product.reference(), "duplicate product reference");
            return Err(DomainError::conflict(format!(
                "product reference {} already exists",
                product.reference()
            ))
            .into());
        }
        tx.insert(product.clone());
        tx.commit()?;

        info!(
            product_id = %product.id_typed(),
            reference = %product.reference(),
            stock_quantity = product.stock_quantity(),
            "product created"
        );
        Ok(product)
    }

    /// Oldest first.
    pub fn list_products(&self) -> StoreResult<Vec<Product>> {
        let tables = self.db.read()?;
        let mut products: Vec<Product> = tables.products.values().cloned().collect();
        products.sort_by_key(|p| (p.created_at(), p.id_typed()));
        Ok(products)
    }

    pub fn get_product(&self, product_id: ProductId) -> StoreResult<Product> {
        let tables = self.db.read()?;
        tables
            .products
            .get(&product_id)
            .cloned()
            .ok_or_else(|| DomainError::not_found(format!("product {product_id}")).into())
    }

    /// Standalone stock correction, committed on its own.
    pub fn adjust_stock(&self, product_id: ProductId, delta: i64) -> StoreResult<i64> {
        let mut tx = self.db.begin()?;
        let quantity = adjust_stock(&mut tx, product_id, delta)?;
        tx.commit()?;
        info!(product_id = %product_id, delta, quantity, "stock corrected");
        Ok(quantity)
    }

    pub fn inventory_summary(&self) -> StoreResult<InventorySummary> {
        let products = self.list_products()?;
        Ok(InventorySummary::from_products(
            &products,
            self.low_stock_threshold,
        )?)
    }

    /// Stock card of one product, newest movement first.
    pub fn stock_movements(&self, product_id: ProductId) -> StoreResult<Vec<StockMovement>> {
        let tables = self.db.read()?;
        if !tables.products.contains_key(&product_id) {
            return Err(DomainError::not_found(format!("product {product_id}")).into());
        }
        let movements = stock_movements(product_id, tables.invoices.values(), |partner_id| {
            tables.partners.get(&partner_id).map(|p| p.name().to_string())
        });
        debug!(product_id = %product_id, count = movements.len(), "stock movements read");
        Ok(movements)
    }
}
