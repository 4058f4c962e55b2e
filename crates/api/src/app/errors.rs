use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde_json::json;

use hemolink_core::{BloodType, DomainError};
use hemolink_infra::ServiceError;

pub fn service_error_to_response(err: ServiceError) -> axum::response::Response {
    match err {
        ServiceError::Domain(e) => domain_error_to_response(e),
        ServiceError::Store(e) => {
            tracing::error!(error = %e, "store failure");
            json_error(StatusCode::INTERNAL_SERVER_ERROR, "store_error", e.to_string())
        }
    }
}

pub fn domain_error_to_response(err: DomainError) -> axum::response::Response {
    let code = err.code();
    match err {
        DomainError::Validation(msg) | DomainError::InvalidId(msg) => {
            json_error(StatusCode::BAD_REQUEST, code, msg)
        }
        DomainError::NotFound(what) => {
            json_error(StatusCode::NOT_FOUND, code, format!("{what} not found"))
        }
        DomainError::Conflict(msg) => json_error(StatusCode::CONFLICT, code, msg),
        DomainError::InvariantViolation(msg) => {
            json_error(StatusCode::UNPROCESSABLE_ENTITY, code, msg)
        }
    }
}

pub fn json_error(
    status: StatusCode,
    code: &'static str,
    message: impl Into<String>,
) -> axum::response::Response {
    (
        status,
        axum::Json(json!({
            "error": code,
            "message": message.into(),
        })),
    )
        .into_response()
}

/// Path ids that do not parse are a bad request.
pub fn parse_id<T>(raw: &str) -> Result<T, axum::response::Response>
where
    T: core::str::FromStr<Err = DomainError>,
{
    raw.parse::<T>().map_err(domain_error_to_response)
}

/// A blood type outside the eight known ones has no stock row: 404.
pub fn parse_blood_type(raw: &str) -> Result<BloodType, axum::response::Response> {
    raw.parse::<BloodType>().map_err(|_| {
        json_error(
            StatusCode::NOT_FOUND,
            "not_found",
            format!("blood type {raw} not found"),
        )
    })
}

pub async fn not_found_fallback(uri: axum::http::Uri) -> axum::response::Response {
    json_error(
        StatusCode::NOT_FOUND,
        "not_found",
        format!("no route for {}", uri.path()),
    )
}
