use tracing::{info, warn};

use armetix_core::{DomainError, InvoiceId};
use armetix_invoicing::{Invoice, IssueInvoice};
use armetix_parties::Partner;

use crate::db::StoreResult;
use crate::engine::Engine;
use crate::engine::products::adjust_stock;
use crate::read_model::InvoiceReadModel;

impl Engine {
    /// Issue an invoice and move stock for every line, as one unit of work.
    ///
    /// Any failure (unknown partner, unknown product, duplicate number) leaves
    /// stock untouched.
    pub fn create_invoice(&self, cmd: IssueInvoice) -> StoreResult<InvoiceReadModel> {
        let invoice = Invoice::issue(cmd)?;

        let mut tx = self.db.begin()?;
        let duplicate = tx
            .tables()
            .invoices
            .values()
            .any(|i| i.invoice_number() == invoice.invoice_number());
        if duplicate {
            warn!(invoice_number = %invoice.invoice_number(), "duplicate invoice number");
            return Err(DomainError::conflict(format!(
                "invoice number {} already exists",
                invoice.invoice_number()
            ))
            .into());
        }
        tx.require::<Partner>(&invoice.partner_id())?;

        for (product_id, delta) in invoice.stock_deltas() {
            if let Err(err) = adjust_stock(&mut tx, product_id, delta) {
                warn!(
                    invoice_number = %invoice.invoice_number(),
                    product_id = %product_id,
                    error = %err,
                    "invoice rejected, stock rolled back"
                );
                return Err(err.into());
            }
        }
        tx.insert(invoice.clone());

        let view = InvoiceReadModel::build(&invoice, tx.tables());
        tx.commit()?;

        info!(
            invoice_id = %invoice.id_typed(),
            invoice_number = %invoice.invoice_number(),
            invoice_type = ?invoice.invoice_type(),
            total_ttc = %invoice.total_ttc(),
            lines = invoice.items().len(),
            "invoice created"
        );
        Ok(view)
    }

    /// Delete an invoice and reverse its stock movements.
    ///
    /// Payments recorded against it are kept.
    pub fn delete_invoice(&self, invoice_id: InvoiceId) -> StoreResult<Invoice> {
        let mut tx = self.db.begin()?;
        let invoice = tx.remove::<Invoice>(&invoice_id)?;
        for (product_id, delta) in invoice.reversal_deltas() {
            adjust_stock(&mut tx, product_id, delta)?;
        }
        tx.commit()?;

        info!(
            invoice_id = %invoice_id,
            invoice_number = %invoice.invoice_number(),
            "invoice deleted, stock restored"
        );
        Ok(invoice)
    }

    pub fn get_invoice(&self, invoice_id: InvoiceId) -> StoreResult<InvoiceReadModel> {
        let tables = self.db.read()?;
        let invoice = tables
            .invoices
            .get(&invoice_id)
            .ok_or_else(|| DomainError::not_found(format!("invoice {invoice_id}")))?;
        Ok(InvoiceReadModel::build(invoice, &tables))
    }

    /// Newest first.
    pub fn list_invoices(&self) -> StoreResult<Vec<InvoiceReadModel>> {
        let tables = self.db.read()?;
        let mut invoices: Vec<&Invoice> = tables.invoices.values().collect();
        invoices.sort_by(|a, b| {
            b.date()
                .cmp(&a.date())
                .then_with(|| b.invoice_number().cmp(a.invoice_number()))
        });
        Ok(invoices
            .into_iter()
            .map(|inv| InvoiceReadModel::build(inv, &tables))
            .collect())
    }
}
