use core::str::FromStr;

use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use chrono::{DateTime, NaiveDate, Utc};
use serde_json::json;
use tracing::{error, warn};

use armetix_core::DomainError;
use armetix_infra::StoreError;

pub fn store_error_to_response(err: StoreError) -> Response {
    match err {
        StoreError::Domain(e) => domain_error_to_response(e),
        StoreError::Poisoned => {
            error!("store lock poisoned");
            json_error(StatusCode::INTERNAL_SERVER_ERROR, "store_error", err.to_string())
        }
    }
}

pub fn domain_error_to_response(err: DomainError) -> Response {
    let message = err.to_string();
    match err {
        DomainError::Validation(_) => json_error(StatusCode::BAD_REQUEST, "validation_error", message),
        DomainError::InvalidId(_) => json_error(StatusCode::BAD_REQUEST, "invalid_id", message),
        DomainError::NotFound(_) => json_error(StatusCode::NOT_FOUND, "not_found", message),
        DomainError::Conflict(_) => json_error(StatusCode::CONFLICT, "conflict", message),
        DomainError::Overpayment { .. } => {
            json_error(StatusCode::UNPROCESSABLE_ENTITY, "overpayment", message)
        }
        DomainError::Consistency(_) => {
            error!(error = %message, "consistency check failed");
            json_error(StatusCode::INTERNAL_SERVER_ERROR, "consistency_error", message)
        }
    }
}

pub fn json_error(status: StatusCode, code: &'static str, message: impl Into<String>) -> Response {
    (
        status,
        Json(json!({
            "error": code,
            "message": message.into(),
        })),
    )
        .into_response()
}

/// Unwrap a JSON body, answering 400 instead of axum's default rejection.
pub fn json_body<T>(body: Result<Json<T>, JsonRejection>) -> Result<T, Response> {
    match body {
        Ok(Json(value)) => Ok(value),
        Err(rejection) => {
            warn!(error = %rejection.body_text(), "malformed request body");
            Err(json_error(
                StatusCode::BAD_REQUEST,
                "invalid_body",
                rejection.body_text(),
            ))
        }
    }
}

pub fn parse_id<T>(raw: &str) -> Result<T, Response>
where
    T: FromStr<Err = DomainError>,
{
    raw.parse::<T>().map_err(domain_error_to_response)
}

/// Accepts RFC 3339 timestamps or plain `YYYY-MM-DD` dates (midnight UTC).
/// A missing date means "now".
pub fn parse_date(raw: Option<&str>) -> Result<DateTime<Utc>, Response> {
    let Some(raw) = raw.map(str::trim).filter(|s| !s.is_empty()) else {
        return Ok(Utc::now());
    };
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Ok(ts.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|dt| dt.and_utc())
        .ok_or_else(|| {
            json_error(
                StatusCode::BAD_REQUEST,
                "validation_error",
                format!("invalid date {raw:?}, expected YYYY-MM-DD or RFC 3339"),
            )
        })
}
