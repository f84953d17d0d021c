use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Extension, Path},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use chrono::Utc;

use armetix_core::PartnerId;
use armetix_parties::RegisterPartner;

use crate::app::services::AppServices;
use crate::app::{dto, errors};

pub fn router() -> Router {
    Router::new()
        .route("/", get(list_partners).post(create_partner))
        .route("/:id", get(get_partner))
        .route("/:id/ledger", get(partner_ledger))
        .route("/:id/stats", get(partner_stats))
}

pub async fn create_partner(
    Extension(services): Extension<Arc<AppServices>>,
    body: Result<Json<dto::CreatePartnerRequest>, JsonRejection>,
) -> axum::response::Response {
    let body = match errors::json_body(body) {
        Ok(b) => b,
        Err(res) => return res,
    };

    let cmd = RegisterPartner {
        partner_id: PartnerId::new(),
        name: body.name,
        kind: body.kind,
        ice: body.ice,
        if_number: body.if_number,
        contact: Some(body.contact),
        occurred_at: Utc::now(),
    };

    match services.engine.create_partner(cmd) {
        Ok(partner) => (StatusCode::CREATED, Json(dto::partner_to_json(&partner))).into_response(),
        Err(e) => errors::store_error_to_response(e),
    }
}

pub async fn list_partners(Extension(services): Extension<Arc<AppServices>>) -> axum::response::Response {
    match services.engine.list_partners() {
        Ok(partners) => Json(dto::list_to_json(&partners, dto::partner_to_json)).into_response(),
        Err(e) => errors::store_error_to_response(e),
    }
}

pub async fn get_partner(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let partner_id = match errors::parse_id::<PartnerId>(&id) {
        Ok(id) => id,
        Err(res) => return res,
    };

    match services.engine.get_partner(partner_id) {
        Ok(partner) => Json(dto::partner_to_json(&partner)).into_response(),
        Err(e) => errors::store_error_to_response(e),
    }
}

/// Running-balance statement of every invoice issued to/from the partner.
pub async fn partner_ledger(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let partner_id = match errors::parse_id::<PartnerId>(&id) {
        Ok(id) => id,
        Err(res) => return res,
    };

    match services.engine.partner_statement(partner_id) {
        Ok(statement) => Json(dto::statement_to_json(&statement)).into_response(),
        Err(e) => errors::store_error_to_response(e),
    }
}

pub async fn partner_stats(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let partner_id = match errors::parse_id::<PartnerId>(&id) {
        Ok(id) => id,
        Err(res) => return res,
    };

    match services.engine.partner_stats(partner_id) {
        Ok(stats) => Json(dto::partner_stats_to_json(&stats)).into_response(),
        Err(e) => errors::store_error_to_response(e),
    }
}
