use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Extension, Path},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, put},
    Json, Router,
};

use armetix_accounting::{CreateExpense, UpdateExpense};
use armetix_core::ExpenseId;

use crate::app::services::AppServices;
use crate::app::{dto, errors};

pub fn router() -> Router {
    Router::new()
        .route("/", get(list_expenses).post(create_expense))
        .route("/:id", put(update_expense).delete(delete_expense))
}

pub async fn create_expense(
    Extension(services): Extension<Arc<AppServices>>,
    body: Result<Json<dto::ExpenseRequest>, JsonRejection>,
) -> axum::response::Response {
    let body = match errors::json_body(body) {
        Ok(b) => b,
        Err(res) => return res,
    };
    let date = match errors::parse_date(body.date.as_deref()) {
        Ok(d) => d,
        Err(res) => return res,
    };

    let cmd = CreateExpense {
        expense_id: ExpenseId::new(),
        description: body.description,
        category: body.category,
        amount: body.amount,
        date,
        payment_method: body.payment_method,
    };

    match services.engine.create_expense(cmd) {
        Ok(expense) => (StatusCode::CREATED, Json(dto::expense_to_json(&expense))).into_response(),
        Err(e) => errors::store_error_to_response(e),
    }
}

pub async fn list_expenses(Extension(services): Extension<Arc<AppServices>>) -> axum::response::Response {
    match services.engine.list_expenses() {
        Ok(expenses) => Json(dto::list_to_json(&expenses, dto::expense_to_json)).into_response(),
        Err(e) => errors::store_error_to_response(e),
    }
}

pub async fn update_expense(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
    body: Result<Json<dto::ExpenseRequest>, JsonRejection>,
) -> axum::response::Response {
    let expense_id = match errors::parse_id::<ExpenseId>(&id) {
        Ok(id) => id,
        Err(res) => return res,
    };
    let body = match errors::json_body(body) {
        Ok(b) => b,
        Err(res) => return res,
    };
    let date = match errors::parse_date(body.date.as_deref()) {
        Ok(d) => d,
        Err(res) => return res,
    };

    let cmd = UpdateExpense {
        description: body.description,
        category: body.category,
        amount: body.amount,
        date,
        payment_method: body.payment_method,
    };

    match services.engine.update_expense(expense_id, cmd) {
        Ok(expense) => Json(dto::expense_to_json(&expense)).into_response(),
        Err(e) => errors::store_error_to_response(e),
    }
}

pub async fn delete_expense(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let expense_id = match errors::parse_id::<ExpenseId>(&id) {
        Ok(id) => id,
        Err(res) => return res,
    };

    match services.engine.delete_expense(expense_id) {
        Ok(_) => Json(serde_json::json!({ "id": expense_id.to_string(), "deleted": true })).into_response(),
        Err(e) => errors::store_error_to_response(e),
    }
}
