use std::collections::BTreeMap;

use armetix_accounting::Expense;
use armetix_core::{DomainResult, Entity, ExpenseId, InvoiceId, PartnerId, PaymentId, ProductId};
use armetix_invoicing::{Invoice, Payment, PaymentSequence};
use armetix_parties::Partner;
use armetix_products::Product;

/// Every record the engine persists, plus the receipt counter.
#[derive(Debug, Clone, Default)]
pub struct Tables {
    pub products: BTreeMap<ProductId, Product>,
    pub partners: BTreeMap<PartnerId, Partner>,
    pub invoices: BTreeMap<InvoiceId, Invoice>,
    pub payments: BTreeMap<PaymentId, Payment>,
    pub expenses: BTreeMap<ExpenseId, Expense>,
    pub payment_sequence: PaymentSequence,
}

/// An entity stored in one of the [`Tables`] maps.
pub trait Table: Entity + Clone + Send + 'static {
    /// Used in not-found messages.
    const NAME: &'static str;

    fn rows(tables: &Tables) -> &BTreeMap<Self::Id, Self>;

    fn rows_mut(tables: &mut Tables) -> &mut BTreeMap<Self::Id, Self>;

    /// Invariants re-checked before a unit of work that touched this row
    /// commits.
    fn verify(&self) -> DomainResult<()> {
        Ok(())
    }
}

impl Table for Product {
    const NAME: &'static str = "product";

    fn rows(tables: &Tables) -> &BTreeMap<ProductId, Self> {
        &tables.products
    }

    fn rows_mut(tables: &mut Tables) -> &mut BTreeMap<ProductId, Self> {
        &mut tables.products
    }
}

impl Table for Partner {
    const NAME: &'static str = "partner";

    fn rows(tables: &Tables) -> &BTreeMap<PartnerId, Self> {
        &tables.partners
    }

    fn rows_mut(tables: &mut Tables) -> &mut BTreeMap<PartnerId, Self> {
        &mut tables.partners
    }
}

impl Table for Invoice {
    const NAME: &'static str = "invoice";

    fn rows(tables: &Tables) -> &BTreeMap<InvoiceId, Self> {
        &tables.invoices
    }

    fn rows_mut(tables: &mut Tables) -> &mut BTreeMap<InvoiceId, Self> {
        &mut tables.invoices
    }

    fn verify(&self) -> DomainResult<()> {
        self.check_consistency()
    }
}

impl Table for Payment {
    const NAME: &'static str = "payment";

    fn rows(tables: &Tables) -> &BTreeMap<PaymentId, Self> {
        &tables.payments
    }

    fn rows_mut(tables: &mut Tables) -> &mut BTreeMap<PaymentId, Self> {
        &mut tables.payments
    }
}

impl Table for Expense {
    const NAME: &'static str = "expense";

    fn rows(tables: &Tables) -> &BTreeMap<ExpenseId, Self> {
        &tables.expenses
    }

    fn rows_mut(tables: &mut Tables) -> &mut BTreeMap<ExpenseId, Self> {
        &mut tables.expenses
    }
}
