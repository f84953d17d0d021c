use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

use armetix_core::{InvoiceId, PartnerId, ProductId};
use armetix_invoicing::{Invoice, InvoiceItem, InvoiceStatus, InvoiceType};
use armetix_parties::{Partner, PartnerKind};
use armetix_products::{Product, TvaRate};

use crate::db::Tables;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PartnerRef {
    pub partner_id: PartnerId,
    pub name: String,
    pub kind: PartnerKind,
    pub ice: String,
}

impl From<&Partner> for PartnerRef {
    fn from(p: &Partner) -> Self {
        Self {
            partner_id: p.id_typed(),
            name: p.name().to_string(),
            kind: p.kind(),
            ice: p.ice().to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductRef {
    pub product_id: ProductId,
    pub reference: String,
    pub designation: String,
}

impl From<&Product> for ProductRef {
    fn from(p: &Product) -> Self {
        Self {
            product_id: p.id_typed(),
            reference: p.reference().to_string(),
            designation: p.designation().to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvoiceLineView {
    pub product_id: ProductId,
    pub product: Option<ProductRef>,
    pub quantity: i64,
    pub price_ht: Decimal,
    pub tva_rate: TvaRate,
    pub line_ht: Decimal,
    pub line_tva: Decimal,
    pub line_ttc: Decimal,
}

impl InvoiceLineView {
    fn build(item: &InvoiceItem, tables: &Tables) -> Self {
        Self {
            product_id: item.product_id,
            product: tables.products.get(&item.product_id).map(ProductRef::from),
            quantity: item.quantity,
            price_ht: item.price_ht,
            tva_rate: item.tva_rate,
            line_ht: item.line_ht(),
            line_tva: item.line_tva(),
            line_ttc: item.line_ttc(),
        }
    }
}

/// Invoice header and lines joined with partner and product data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvoiceReadModel {
    pub invoice_id: InvoiceId,
    pub invoice_number: String,
    pub date: DateTime<Utc>,
    pub invoice_type: InvoiceType,
    pub partner_id: PartnerId,
    pub partner: Option<PartnerRef>,
    pub lines: Vec<InvoiceLineView>,
    pub total_ht: Decimal,
    pub total_tva: Decimal,
    pub total_ttc: Decimal,
    pub status: InvoiceStatus,
    pub amount_paid: Decimal,
    pub amount_remaining: Decimal,
}

impl InvoiceReadModel {
    pub fn build(invoice: &Invoice, tables: &Tables) -> Self {
        Self {
            invoice_id: invoice.id_typed(),
            invoice_number: invoice.invoice_number().to_string(),
            date: invoice.date(),
            invoice_type: invoice.invoice_type(),
            partner_id: invoice.partner_id(),
            partner: tables.partners.get(&invoice.partner_id()).map(PartnerRef::from),
            lines: invoice
                .items()
                .iter()
                .map(|item| InvoiceLineView::build(item, tables))
                .collect(),
            total_ht: invoice.total_ht(),
            total_tva: invoice.total_tva(),
            total_ttc: invoice.total_ttc(),
            status: invoice.status(),
            amount_paid: invoice.amount_paid(),
            amount_remaining: invoice.amount_remaining(),
        }
    }
}
