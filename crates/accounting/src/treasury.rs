use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use armetix_core::money::{add, sub};
use armetix_core::{DomainResult, InvoiceId};
use armetix_invoicing::{InvoiceType, Payment};

/// Cash received on sales versus cash paid out on purchases.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TreasurySummary {
    pub cash_in: Decimal,
    pub cash_out: Decimal,
    pub net: Decimal,
    pub payment_count: usize,
}

impl TreasurySummary {
    /// `invoice_type` resolves the settled invoice; payments whose invoice is
    /// gone are counted but land in neither bucket.
    pub fn from_payments<'a, F>(
        payments: impl IntoIterator<Item = &'a Payment>,
        invoice_type: F,
    ) -> DomainResult<Self>
    where
        F: Fn(InvoiceId) -> Option<InvoiceType>,
    {
        let mut summary = Self::default();
        for payment in payments {
            summary.payment_count += 1;
            match invoice_type(payment.invoice_id()) {
                Some(InvoiceType::Sale) => {
                    summary.cash_in = add(summary.cash_in, payment.amount())?;
                }
                Some(InvoiceType::Purchase) => {
                    summary.cash_out = add(summary.cash_out, payment.amount())?;
                }
                None => {}
            }
        }
        summary.net = sub(summary.cash_in, summary.cash_out)?;
        Ok(summary)
    }
}
