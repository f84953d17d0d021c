//! Settlement engine.
//!
//! Every operation runs against one [`Database`]: mutations as a single
//! [`Transaction`](crate::db::Transaction) that commits or rolls back as a
//! whole, reads under the shared lock.

mod expenses;
mod invoices;
mod partners;
mod payments;
mod products;
mod reports;

use armetix_products::DEFAULT_LOW_STOCK_THRESHOLD;

use crate::db::Database;

#[derive(Debug)]
pub struct Engine {
    db: Database,
    low_stock_threshold: i64,
}

impl Engine {
    pub fn new() -> Self {
        Self::with_low_stock_threshold(DEFAULT_LOW_STOCK_THRESHOLD)
    }

    pub fn with_low_stock_threshold(low_stock_threshold: i64) -> Self {
        Self {
            db: Database::new(),
            low_stock_threshold,
        }
    }

    pub fn low_stock_threshold(&self) -> i64 {
        self.low_stock_threshold
    }

    pub fn database(&self) -> &Database {
        &self.db
    }
}

impl Default for Engine {
    fn default() -> Self {
        Self::new()
    }
}
