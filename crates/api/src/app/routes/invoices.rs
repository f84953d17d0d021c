use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Extension, Path},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Json, Router,
};

use armetix_core::{InvoiceId, PartnerId, ProductId};
use armetix_invoicing::{InvoiceLineInput, IssueInvoice};

use crate::app::services::AppServices;
use crate::app::{dto, errors};

pub fn router() -> Router {
    Router::new()
        .route("/", get(list_invoices).post(create_invoice))
        .route("/:id", get(get_invoice).delete(delete_invoice))
}

pub async fn create_invoice(
    Extension(services): Extension<Arc<AppServices>>,
    body: Result<Json<dto::CreateInvoiceRequest>, JsonRejection>,
) -> axum::response::Response {
    let body = match errors::json_body(body) {
        Ok(b) => b,
        Err(res) => return res,
    };
    let partner_id = match errors::parse_id::<PartnerId>(&body.partner_id) {
        Ok(id) => id,
        Err(res) => return res,
    };
    let date = match errors::parse_date(body.date.as_deref()) {
        Ok(d) => d,
        Err(res) => return res,
    };

    let mut lines = Vec::with_capacity(body.items.len());
    for item in body.items {
        let product_id = match item.product_id.as_deref().map(errors::parse_id::<ProductId>) {
            Some(Ok(id)) => Some(id),
            Some(Err(res)) => return res,
            None => None,
        };
        lines.push(InvoiceLineInput {
            product_id,
            quantity: item.quantity,
            price_ht: item.price_ht,
            tva_rate: item.tva_rate,
        });
    }

    let cmd = IssueInvoice {
        invoice_id: InvoiceId::new(),
        invoice_number: body.invoice_number,
        invoice_type: body.invoice_type,
        partner_id,
        lines,
        date,
    };

    match services.engine.create_invoice(cmd) {
        Ok(invoice) => (StatusCode::CREATED, Json(dto::invoice_to_json(&invoice))).into_response(),
        Err(e) => errors::store_error_to_response(e),
    }
}

pub async fn list_invoices(Extension(services): Extension<Arc<AppServices>>) -> axum::response::Response {
    match services.engine.list_invoices() {
        Ok(invoices) => Json(dto::list_to_json(&invoices, dto::invoice_to_json)).into_response(),
        Err(e) => errors::store_error_to_response(e),
    }
}

pub async fn get_invoice(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let invoice_id = match errors::parse_id::<InvoiceId>(&id) {
        Ok(id) => id,
        Err(res) => return res,
    };

    match services.engine.get_invoice(invoice_id) {
        Ok(invoice) => Json(dto::invoice_to_json(&invoice)).into_response(),
        Err(e) => errors::store_error_to_response(e),
    }
}

/// Deletes the invoice and reverses its stock movements.
pub async fn delete_invoice(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let invoice_id = match errors::parse_id::<InvoiceId>(&id) {
        Ok(id) => id,
        Err(res) => return res,
    };

    match services.engine.delete_invoice(invoice_id) {
        Ok(invoice) => Json(serde_json::json!({
            "id": invoice_id.to_string(),
            "invoice_number": invoice.invoice_number(),
            "deleted": true,
        }))
        .into_response(),
        Err(e) => errors::store_error_to_response(e),
    }
}
