use tracing::{info, warn};

use armetix_accounting::TreasurySummary;
use armetix_invoicing::{Invoice, Payment, RecordPayment};

use crate::db::StoreResult;
use crate::engine::Engine;
use crate::read_model::PaymentReadModel;

impl Engine {
    /// Settle (part of) an invoice.
    ///
    /// The invoice update, the receipt and the sequence bump commit together;
    /// the write lock serializes concurrent payments on the same invoice.
    pub fn record_payment(&self, cmd: RecordPayment) -> StoreResult<PaymentReadModel> {
        let mut tx = self.db.begin()?;
        let mut invoice = tx.require::<Invoice>(&cmd.invoice_id)?.clone();
        let mut sequence = tx.tables().payment_sequence.clone();

        let invoice_id = cmd.invoice_id;
        let amount = cmd.amount;
        let payment = match Payment::settle(cmd, &mut invoice, &mut sequence) {
            Ok(p) => p,
            Err(err) => {
                warn!(invoice_id = %invoice_id, amount = %amount, error = %err, "payment rejected");
                return Err(err.into());
            }
        };

        tx.insert(invoice.clone());
        tx.set_payment_sequence(sequence);
        tx.insert(payment.clone());

        let view = PaymentReadModel::build(&payment, tx.tables());
        tx.commit()?;

        info!(
            payment_number = %payment.payment_number(),
            invoice_number = %invoice.invoice_number(),
            amount = %payment.amount(),
            amount_remaining = %invoice.amount_remaining(),
            status = invoice.status().label(),
            "payment recorded"
        );
        Ok(view)
    }

    /// Newest first.
    pub fn list_payments(&self) -> StoreResult<Vec<PaymentReadModel>> {
        let tables = self.db.read()?;
        let mut payments: Vec<&Payment> = tables.payments.values().collect();
        payments.sort_by(|a, b| {
            b.date()
                .cmp(&a.date())
                .then_with(|| b.payment_number().cmp(&a.payment_number()))
        });
        Ok(payments
            .into_iter()
            .map(|p| PaymentReadModel::build(p, &tables))
            .collect())
    }

    pub fn treasury_summary(&self) -> StoreResult<TreasurySummary> {
        let tables = self.db.read()?;
        Ok(TreasurySummary::from_payments(
            tables.payments.values(),
            |invoice_id| tables.invoices.get(&invoice_id).map(Invoice::invoice_type),
        )?)
    }
}
