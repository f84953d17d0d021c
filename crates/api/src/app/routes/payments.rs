use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Extension},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Json, Router,
};

use armetix_core::{InvoiceId, PaymentId};
use armetix_invoicing::RecordPayment;

use crate::app::services::AppServices;
use crate::app::{dto, errors};

pub fn router() -> Router {
    Router::new()
        .route("/", get(list_payments).post(record_payment))
        .route("/summary", get(treasury_summary))
}

pub async fn record_payment(
    Extension(services): Extension<Arc<AppServices>>,
    body: Result<Json<dto::RecordPaymentRequest>, JsonRejection>,
) -> axum::response::Response {
    let body = match errors::json_body(body) {
        Ok(b) => b,
        Err(res) => return res,
    };
    let invoice_id = match errors::parse_id::<InvoiceId>(&body.invoice_id) {
        Ok(id) => id,
        Err(res) => return res,
    };
    let date = match errors::parse_date(body.date.as_deref()) {
        Ok(d) => d,
        Err(res) => return res,
    };

    let cmd = RecordPayment {
        payment_id: PaymentId::new(),
        invoice_id,
        amount: body.amount,
        method: body.method,
        note: body.note,
        date,
    };

    match services.engine.record_payment(cmd) {
        Ok(payment) => (StatusCode::CREATED, Json(dto::payment_to_json(&payment))).into_response(),
        Err(e) => errors::store_error_to_response(e),
    }
}

pub async fn list_payments(Extension(services): Extension<Arc<AppServices>>) -> axum::response::Response {
    match services.engine.list_payments() {
        Ok(payments) => Json(dto::list_to_json(&payments, dto::payment_to_json)).into_response(),
        Err(e) => errors::store_error_to_response(e),
    }
}

pub async fn treasury_summary(
    Extension(services): Extension<Arc<AppServices>>,
) -> axum::response::Response {
    match services.engine.treasury_summary() {
        Ok(summary) => Json(dto::treasury_to_json(&summary)).into_response(),
        Err(e) => errors::store_error_to_response(e),
    }
}
