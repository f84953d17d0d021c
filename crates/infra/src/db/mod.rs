//! In-memory transactional store.
//!
//! One `RwLock` guards every table. Writers run inside a [`Transaction`] that
//! holds the write lock for the whole unit of work; readers take the shared
//! lock and only ever observe committed state.

mod error;
mod tables;
mod transaction;

use std::sync::{RwLock, RwLockReadGuard};

pub use error::{StoreError, StoreResult};
pub use tables::{Table, Tables};
pub use transaction::Transaction;

#[derive(Debug, Default)]
pub struct Database {
    tables: RwLock<Tables>,
}

impl Database {
    pub fn new() -> Self {
        Self::default()
    }

    /// Open a unit of work. Blocks until every other writer is done.
    pub fn begin(&self) -> StoreResult<Transaction<'_>> {
        let guard = self.tables.write().map_err(|_| StoreError::Poisoned)?;
        Ok(Transaction::new(guard))
    }

    pub fn read(&self) -> StoreResult<RwLockReadGuard<'_, Tables>> {
        self.tables.read().map_err(|_| StoreError::Poisoned)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use chrono::Utc;
    use rust_decimal_macros::dec;

    use armetix_core::{DomainError, InvoiceId, PartnerId, ProductId};
    use armetix_invoicing::{Invoice, InvoiceLineInput, InvoiceType, IssueInvoice};
    use armetix_products::{CreateProduct, Product};

    use super::*;

    fn product(stock_quantity: i64) -> Product {
        Product::create(CreateProduct {
            product_id: ProductId::new(),
            reference: "SKU-1".to_string(),
            designation: "Clavier".to_string(),
            price_ht: dec!(150),
            tva_rate: 20,
            stock_quantity,
            category: None,
            occurred_at: Utc::now(),
        })
        .unwrap()
    }

    #[test]
    fn committed_changes_are_visible_to_readers() {
        let db = Database::new();
        let p = product(3);
        let id = p.id_typed();

        let mut tx = db.begin().unwrap();
        tx.insert(p);
        tx.modify::<Product, _>(&id, |p| p.apply_stock_delta(2)).unwrap();
        tx.commit().unwrap();

        assert_eq!(db.read().unwrap().products[&id].stock_quantity(), 5);
    }

    #[test]
    fn dropped_transaction_rolls_back_in_reverse_order() {
        let db = Database::new();
        let p = product(3);
        let id = p.id_typed();
        {
            let mut tx = db.begin().unwrap();
            tx.insert(p.clone());
            tx.commit().unwrap();
        }

        {
            let mut tx = db.begin().unwrap();
            tx.modify::<Product, _>(&id, |p| p.apply_stock_delta(-10)).unwrap();
            tx.modify::<Product, _>(&id, |p| p.apply_stock_delta(4)).unwrap();
            let removed = tx.remove::<Product>(&id).unwrap();
            assert_eq!(removed.stock_quantity(), -3);
        }

        let tables = db.read().unwrap();
        assert_eq!(tables.products.get(&id), Some(&p));
    }

    #[test]
    fn failed_modification_restores_the_row() {
        let db = Database::new();
        let p = product(3);
        let id = p.id_typed();

        let mut tx = db.begin().unwrap();
        tx.insert(p);
        let err = tx
            .modify::<Product, ()>(&id, |p| {
                p.apply_stock_delta(100)?;
                Err(DomainError::validation("late failure"))
            })
            .unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
        assert_eq!(tx.get::<Product>(&id).unwrap().stock_quantity(), 3);
    }

    #[test]
    fn missing_rows_are_not_found() {
        let db = Database::new();
        let mut tx = db.begin().unwrap();
        let id = ProductId::new();
        match tx.modify::<Product, _>(&id, |p| p.apply_stock_delta(1)) {
            Err(DomainError::NotFound(msg)) => assert!(msg.starts_with("product ")),
            other => panic!("Expected NotFound, got {other:?}"),
        }
        assert!(tx.require::<Product>(&id).is_err());
    }

    #[test]
    fn commit_rejects_inconsistent_invoice() {
        let db = Database::new();
        let invoice = Invoice::issue(IssueInvoice {
            invoice_id: InvoiceId::new(),
            invoice_number: "FA-1".to_string(),
            invoice_type: InvoiceType::Sale,
            partner_id: PartnerId::new(),
            lines: vec![InvoiceLineInput {
                product_id: Some(ProductId::new()),
                quantity: 1,
                price_ht: dec!(100),
                tva_rate: 20,
            }],
            date: Utc::now(),
        })
        .unwrap();
        let id = invoice.id_typed();

        let forged = invoice.with_unchecked_remaining(dec!(5));

        let mut tx = db.begin().unwrap();
        tx.insert(forged);
        match tx.commit() {
            Err(StoreError::Domain(DomainError::Consistency(msg))) => assert!(msg.contains("FA-1")),
            other => panic!("Expected Consistency, got {other:?}"),
        }

        assert!(db.read().unwrap().invoices.get(&id).is_none());
    }

    #[test]
    fn panicking_writer_poisons_the_store() {
        let db = Arc::new(Database::new());
        let writer = Arc::clone(&db);

        let outcome = std::thread::spawn(move || {
            let mut tx = writer.begin().unwrap();
            let p = product(1);
            let id = p.id_typed();
            tx.insert(p);
            if tx.get::<Product>(&id).is_some() {
                panic!("writer crashed mid-transaction");
            }
        })
        .join();

        assert!(outcome.is_err());
        assert_eq!(db.begin().err(), Some(StoreError::Poisoned));
        assert!(matches!(db.read(), Err(StoreError::Poisoned)));
    }
}
