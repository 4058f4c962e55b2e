use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Extension, Path, rejection::JsonRejection},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, put},
};

use hemolink_core::{AppointmentId, DonorId};

use crate::app::services::AppServices;
use crate::app::{dto, errors};

pub fn router() -> Router {
    Router::new()
        .route("/", get(list_appointments).post(create_appointment))
        .route("/donor/:donor_id", get(list_by_donor))
        .route("/:id/status", put(update_status))
}

pub async fn list_appointments(
    Extension(services): Extension<Arc<AppServices>>,
) -> axum::response::Response {
    match services.appointments.list() {
        Ok(items) => Json(items.iter().map(dto::appointment_to_json).collect::<Vec<_>>()).into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}

pub async fn list_by_donor(
    Extension(services): Extension<Arc<AppServices>>,
    Path(donor_id): Path<String>,
) -> axum::response::Response {
    let donor_id: DonorId = match errors::parse_id(&donor_id) {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    match services.appointments.list_by_donor(donor_id) {
        Ok(items) => Json(items.iter().map(dto::appointment_to_json).collect::<Vec<_>>()).into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}

pub async fn create_appointment(
    Extension(services): Extension<Arc<AppServices>>,
    body: Result<Json<dto::CreateAppointmentRequest>, JsonRejection>,
) -> axum::response::Response {
    let input = match dto::body(body).and_then(|b| b.into_domain()) {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    match services.appointments.book(input) {
        Ok(apt) => (StatusCode::CREATED, Json(dto::appointment_to_json(&apt))).into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}

pub async fn update_status(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
    body: Result<Json<dto::UpdateAppointmentStatusRequest>, JsonRejection>,
) -> axum::response::Response {
    let id: AppointmentId = match errors::parse_id(&id) {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    let body = match dto::body(body) {
        Ok(b) => b,
        Err(resp) => return resp,
    };
    match services.appointments.update_status(id, body.status) {
        Ok(apt) => Json(dto::appointment_to_json(&apt)).into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}
