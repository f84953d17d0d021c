use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::{json, Value};

use armetix_accounting::{
    Expense, ExpenseCategory, ExpensePaymentMethod, MonthlyReport, PartnerStatement, PartnerStats,
    StatementLine, TreasurySummary,
};
use armetix_infra::{InvoiceLineView, InvoiceReadModel, InvoiceRef, PartnerRef, PaymentReadModel, ProductRef};
use armetix_invoicing::{InvoiceType, PaymentMethod, StockMovement};
use armetix_parties::{ContactInfo, Partner, PartnerKind};
use armetix_products::{InventorySummary, Product};

// -------------------------
// Request DTOs
// -------------------------

fn default_tva_rate() -> u32 {
    20
}

#[derive(Debug, Deserialize)]
pub struct CreateProductRequest {
    pub reference: String,
    pub designation: String,
    pub price_ht: Decimal,
    #[serde(default = "default_tva_rate")]
    pub tva_rate: u32,
    #[serde(default)]
    pub stock_quantity: i64,
    pub category: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CreatePartnerRequest {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: PartnerKind,
    pub ice: String,
    pub if_number: Option<String>,
    #[serde(flatten)]
    pub contact: ContactInfo,
}

#[derive(Debug, Deserialize)]
pub struct InvoiceLineRequest {
    pub product_id: Option<String>,
    pub quantity: i64,
    pub price_ht: Decimal,
    #[serde(default = "default_tva_rate")]
    pub tva_rate: u32,
}

#[derive(Debug, Deserialize)]
pub struct CreateInvoiceRequest {
    pub invoice_number: String,
    #[serde(rename = "type")]
    pub invoice_type: InvoiceType,
    pub partner_id: String,
    pub date: Option<String>,
    pub items: Vec<InvoiceLineRequest>,
}

#[derive(Debug, Deserialize)]
pub struct RecordPaymentRequest {
    pub invoice_id: String,
    pub amount: Decimal,
    #[serde(default)]
    pub method: PaymentMethod,
    pub note: Option<String>,
    pub date: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ExpenseRequest {
    pub description: String,
    #[serde(default)]
    pub category: ExpenseCategory,
    pub amount: Decimal,
    pub date: Option<String>,
    #[serde(default)]
    pub payment_method: ExpensePaymentMethod,
}

// -------------------------
// Response mapping
// -------------------------

pub fn list_to_json<T>(items: &[T], to_json: impl Fn(&T) -> Value) -> Value {
    json!({ "items": items.iter().map(to_json).collect::<Vec<_>>() })
}

pub fn product_to_json(p: &Product) -> Value {
    json!({
        "id": p.id_typed().to_string(),
        "reference": p.reference(),
        "designation": p.designation(),
        "price_ht": p.price_ht(),
        "tva_rate": p.tva_rate().percent(),
        "stock_quantity": p.stock_quantity(),
        "category": p.category(),
        "created_at": p.created_at(),
    })
}

pub fn inventory_summary_to_json(s: &InventorySummary) -> Value {
    json!({
        "product_count": s.product_count,
        "stock_value": s.stock_value,
        "low_stock_threshold": s.low_stock_threshold,
        "low_stock_count": s.low_stock_count,
        "low_stock": s.low_stock.iter().map(|item| json!({
            "product_id": item.product_id.to_string(),
            "reference": item.reference,
            "designation": item.designation,
            "stock_quantity": item.stock_quantity,
        })).collect::<Vec<_>>(),
    })
}

pub fn movement_to_json(m: &StockMovement) -> Value {
    json!({
        "date": m.date,
        "invoice_id": m.invoice_id.to_string(),
        "invoice_number": m.invoice_number,
        "type": m.invoice_type,
        "partner_id": m.partner_id.to_string(),
        "partner_name": m.partner_name,
        "quantity": m.quantity,
        "delta": m.delta,
    })
}

pub fn partner_to_json(p: &Partner) -> Value {
    let contact = p.contact();
    json!({
        "id": p.id_typed().to_string(),
        "name": p.name(),
        "type": p.kind(),
        "ice": p.ice(),
        "if_number": p.if_number(),
        "address": contact.address,
        "phone": contact.phone,
        "email": contact.email,
        "created_at": p.created_at(),
    })
}

fn partner_ref_to_json(p: &PartnerRef) -> Value {
    json!({
        "id": p.partner_id.to_string(),
        "name": p.name,
        "type": p.kind,
        "ice": p.ice,
    })
}

fn product_ref_to_json(p: &ProductRef) -> Value {
    json!({
        "id": p.product_id.to_string(),
        "reference": p.reference,
        "designation": p.designation,
    })
}

fn invoice_line_to_json(line: &InvoiceLineView) -> Value {
    json!({
        "product_id": line.product_id.to_string(),
        "product": line.product.as_ref().map(product_ref_to_json),
        "quantity": line.quantity,
        "price_ht": line.price_ht,
        "tva_rate": line.tva_rate.percent(),
        "line_ht": line.line_ht,
        "line_tva": line.line_tva,
        "line_ttc": line.line_ttc,
    })
}

pub fn invoice_to_json(inv: &InvoiceReadModel) -> Value {
    json!({
        "id": inv.invoice_id.to_string(),
        "invoice_number": inv.invoice_number,
        "date": inv.date,
        "type": inv.invoice_type,
        "partner_id": inv.partner_id.to_string(),
        "partner": inv.partner.as_ref().map(partner_ref_to_json),
        "items": inv.lines.iter().map(invoice_line_to_json).collect::<Vec<_>>(),
        "total_ht": inv.total_ht,
        "total_tva": inv.total_tva,
        "total_ttc": inv.total_ttc,
        "status": inv.status,
        "amount_paid": inv.amount_paid,
        "amount_remaining": inv.amount_remaining,
    })
}

fn invoice_ref_to_json(inv: &InvoiceRef) -> Value {
    json!({
        "id": inv.invoice_id.to_string(),
        "invoice_number": inv.invoice_number,
        "type": inv.invoice_type,
        "total_ttc": inv.total_ttc,
    })
}

pub fn payment_to_json(p: &PaymentReadModel) -> Value {
    json!({
        "id": p.payment_id.to_string(),
        "payment_number": p.payment_number.to_string(),
        "invoice_id": p.invoice_id.to_string(),
        "invoice": p.invoice.as_ref().map(invoice_ref_to_json),
        "partner": p.partner.as_ref().map(partner_ref_to_json),
        "amount": p.amount,
        "date": p.date,
        "method": p.method,
        "note": p.note,
    })
}

pub fn treasury_to_json(t: &TreasurySummary) -> Value {
    json!({
        "cash_in": t.cash_in,
        "cash_out": t.cash_out,
        "net": t.net,
        "payment_count": t.payment_count,
    })
}

fn statement_line_to_json(line: &StatementLine) -> Value {
    json!({
        "invoice_id": line.invoice_id.to_string(),
        "date": line.date,
        "type": line.invoice_type,
        "invoice_number": line.invoice_number,
        "amount": line.amount,
        "amount_paid": line.amount_paid,
        "amount_remaining": line.amount_remaining,
        "status": line.status,
        "current_solde": line.current_solde,
    })
}

pub fn statement_to_json(s: &PartnerStatement) -> Value {
    json!({
        "partner": partner_to_json(&s.partner),
        "transactions": s.transactions.iter().map(statement_line_to_json).collect::<Vec<_>>(),
        "total_solde": s.total_solde,
    })
}

pub fn partner_stats_to_json(s: &PartnerStats) -> Value {
    json!({
        "partner_id": s.partner_id.to_string(),
        "invoice_count": s.invoice_count,
        "total_invoiced": s.total_invoiced,
        "total_paid": s.total_paid,
        "balance": s.balance,
    })
}

pub fn report_to_json(r: &MonthlyReport) -> Value {
    json!({
        "month": r.month,
        "year": r.year,
        "period_start": r.period_start,
        "period_end": r.period_end,
        "sales_total": r.sales_total,
        "purchase_total": r.purchase_total,
        "sales_tva": r.sales_tva,
        "purchase_tva": r.purchase_tva,
        "tva_balance": r.tva_balance,
        "expense_total": r.expense_total,
        "net_profit": r.net_profit,
        "stock_value": r.stock_value,
        "invoice_count": r.invoice_count,
        "expense_count": r.expense_count,
    })
}

pub fn expense_to_json(e: &Expense) -> Value {
    json!({
        "id": e.id_typed().to_string(),
        "description": e.description(),
        "category": e.category(),
        "amount": e.amount(),
        "date": e.date(),
        "payment_method": e.payment_method(),
    })
}
