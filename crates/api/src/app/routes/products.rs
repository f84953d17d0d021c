use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Extension, Path},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use chrono::Utc;

use armetix_core::ProductId;
use armetix_products::CreateProduct;

use crate::app::services::AppServices;
use crate::app::{dto, errors};

pub fn router() -> Router {
    Router::new()
        .route("/", get(list_products).post(create_product))
        .route("/summary", get(inventory_summary))
        .route("/:id", get(get_product))
        .route("/:id/movements", get(stock_movements))
}

pub async fn create_product(
    Extension(services): Extension<Arc<AppServices>>,
    body: Result<Json<dto::CreateProductRequest>, JsonRejection>,
) -> axum::response::Response {
    let body = match errors::json_body(body) {
        Ok(b) => b,
        Err(res) => return res,
    };

    let cmd = CreateProduct {
        product_id: ProductId::new(),
        reference: body.reference,
        designation: body.designation,
        price_ht: body.price_ht,
        tva_rate: body.tva_rate,
        stock_quantity: body.stock_quantity,
        category: body.category,
        occurred_at: Utc::now(),
    };

    match services.engine.create_product(cmd) {
        Ok(product) => (StatusCode::CREATED, Json(dto::product_to_json(&product))).into_response(),
        Err(e) => errors::store_error_to_response(e),
    }
}

pub async fn list_products(Extension(services): Extension<Arc<AppServices>>) -> axum::response::Response {
    match services.engine.list_products() {
        Ok(products) => Json(dto::list_to_json(&products, dto::product_to_json)).into_response(),
        Err(e) => errors::store_error_to_response(e),
    }
}

pub async fn get_product(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let product_id = match errors::parse_id::<ProductId>(&id) {
        Ok(id) => id,
        Err(res) => return res,
    };

    match services.engine.get_product(product_id) {
        Ok(product) => Json(dto::product_to_json(&product)).into_response(),
        Err(e) => errors::store_error_to_response(e),
    }
}

pub async fn inventory_summary(
    Extension(services): Extension<Arc<AppServices>>,
) -> axum::response::Response {
    match services.engine.inventory_summary() {
        Ok(summary) => Json(dto::inventory_summary_to_json(&summary)).into_response(),
        Err(e) => errors::store_error_to_response(e),
    }
}

pub async fn stock_movements(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let product_id = match errors::parse_id::<ProductId>(&id) {
        Ok(id) => id,
        Err(res) => return res,
    };

    match services.engine.stock_movements(product_id) {
        Ok(movements) => Json(dto::list_to_json(&movements, dto::movement_to_json)).into_response(),
        Err(e) => errors::store_error_to_response(e),
    }
}
