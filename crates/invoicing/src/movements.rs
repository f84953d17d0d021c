//! Stock card: per-product movement history derived from invoice lines.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use armetix_core::{InvoiceId, PartnerId, ProductId};

use crate::invoice::{Invoice, InvoiceType};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockMovement {
    pub date: DateTime<Utc>,
    pub invoice_id: InvoiceId,
    pub invoice_number: String,
    pub invoice_type: InvoiceType,
    pub partner_id: PartnerId,
    /// `None` when the partner no longer resolves.
    pub partner_name: Option<String>,
    pub quantity: i64,
    /// Signed effect on quantity on hand.
    pub delta: i64,
}

/// Every line of `invoices` touching `product_id`, newest first.
///
/// An invoice listing the same product on several lines yields one movement
/// per line.
pub fn stock_movements<'a, F>(
    product_id: ProductId,
    invoices: impl IntoIterator<Item = &'a Invoice>,
    partner_name: F,
) -> Vec<StockMovement>
where
    F: Fn(PartnerId) -> Option<String>,
{
    let mut movements: Vec<StockMovement> = invoices
        .into_iter()
        .flat_map(|invoice| {
            let sign = invoice.invoice_type().stock_sign();
            invoice
                .items()
                .iter()
                .filter(move |item| item.product_id == product_id)
                .map(move |item| (invoice, item.quantity, sign * item.quantity))
        })
        .map(|(invoice, quantity, delta)| StockMovement {
            date: invoice.date(),
            invoice_id: invoice.id_typed(),
            invoice_number: invoice.invoice_number().to_string(),
            invoice_type: invoice.invoice_type(),
            partner_id: invoice.partner_id(),
            partner_name: partner_name(invoice.partner_id()),
            quantity,
            delta,
        })
        .collect();

    movements.sort_by(|a, b| {
        b.date
            .cmp(&a.date)
            .then_with(|| b.invoice_number.cmp(&a.invoice_number))
    });
    movements
}
