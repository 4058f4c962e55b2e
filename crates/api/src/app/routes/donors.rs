use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Extension, Path, rejection::JsonRejection},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
};

use hemolink_core::DonorId;

use crate::app::services::AppServices;
use crate::app::{dto, errors};

pub fn router() -> Router {
    Router::new()
        .route("/", get(list_donors).post(create_donor))
        .route("/:id", get(get_donor).put(update_donor))
}

pub async fn list_donors(Extension(services): Extension<Arc<AppServices>>) -> axum::response::Response {
    match services.donors.list() {
        Ok(donors) => Json(donors.iter().map(dto::donor_to_json).collect::<Vec<_>>()).into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}

pub async fn get_donor(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let id: DonorId = match errors::parse_id(&id) {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    match services.donors.get(id) {
        Ok(donor) => Json(dto::donor_to_json(&donor)).into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}

pub async fn create_donor(
    Extension(services): Extension<Arc<AppServices>>,
    body: Result<Json<dto::CreateDonorRequest>, JsonRejection>,
) -> axum::response::Response {
    let body = match dto::body(body) {
        Ok(b) => b,
        Err(resp) => return resp,
    };
    match services.donors.register(body.into()) {
        Ok(donor) => (StatusCode::CREATED, Json(dto::donor_to_json(&donor))).into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}

pub async fn update_donor(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
    body: Result<Json<dto::UpdateDonorRequest>, JsonRejection>,
) -> axum::response::Response {
    let id: DonorId = match errors::parse_id(&id) {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    let body = match dto::body(body) {
        Ok(b) => b,
        Err(resp) => return resp,
    };
    match services.donors.update(id, body.into()) {
        Ok(donor) => Json(dto::donor_to_json(&donor)).into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}
