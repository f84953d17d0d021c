use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

use armetix_core::{InvoiceId, PaymentId};
use armetix_invoicing::{Invoice, InvoiceType, Payment, PaymentMethod, PaymentNumber};

use crate::db::Tables;
use crate::read_model::invoices::PartnerRef;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvoiceRef {
    pub invoice_id: InvoiceId,
    pub invoice_number: String,
    pub invoice_type: InvoiceType,
    pub total_ttc: Decimal,
}

impl From<&Invoice> for InvoiceRef {
    fn from(inv: &Invoice) -> Self {
        Self {
            invoice_id: inv.id_typed(),
            invoice_number: inv.invoice_number().to_string(),
            invoice_type: inv.invoice_type(),
            total_ttc: inv.total_ttc(),
        }
    }
}

/// Payment joined with its invoice and the invoice's partner.
///
/// Payments outlive their invoice: both joins may be `None`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentReadModel {
    pub payment_id: PaymentId,
    pub payment_number: PaymentNumber,
    pub invoice_id: InvoiceId,
    pub invoice: Option<InvoiceRef>,
    pub partner: Option<PartnerRef>,
    pub amount: Decimal,
    pub date: DateTime<Utc>,
    pub method: PaymentMethod,
    pub note: Option<String>,
}

impl PaymentReadModel {
    pub fn build(payment: &Payment, tables: &Tables) -> Self {
        let invoice = tables.invoices.get(&payment.invoice_id());
        let partner = invoice
            .and_then(|inv| tables.partners.get(&inv.partner_id()))
            .map(PartnerRef::from);

        Self {
            payment_id: payment.id_typed(),
            payment_number: payment.payment_number(),
            invoice_id: payment.invoice_id(),
            invoice: invoice.map(InvoiceRef::from),
            partner,
            amount: payment.amount(),
            date: payment.date(),
            method: payment.method(),
            note: payment.note().map(str::to_string),
        }
    }
}
