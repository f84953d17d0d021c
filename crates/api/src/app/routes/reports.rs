use std::sync::Arc;

use axum::{
    extract::{Extension, Path},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Json, Router,
};

use crate::app::services::AppServices;
use crate::app::{dto, errors};

pub fn router() -> Router {
    Router::new().route("/:month/:year", get(monthly_report))
}

pub async fn monthly_report(
    Extension(services): Extension<Arc<AppServices>>,
    Path((month, year)): Path<(String, String)>,
) -> axum::response::Response {
    let (Ok(month), Ok(year)) = (month.parse::<u32>(), year.parse::<i32>()) else {
        return errors::json_error(
            StatusCode::BAD_REQUEST,
            "validation_error",
            "month and year must be integers",
        );
    };

    match services.engine.monthly_report(month, year) {
        Ok(report) => Json(dto::report_to_json(&report)).into_response(),
        Err(e) => errors::store_error_to_response(e),
    }
}
