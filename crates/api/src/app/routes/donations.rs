use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Extension, Path, rejection::JsonRejection},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};

use hemolink_core::{DonationId, DonorId};
use hemolink_infra::RecordedDonation;

use crate::app::services::AppServices;
use crate::app::{dto, errors};

pub fn router() -> Router {
    Router::new()
        .route("/", get(list_donations).post(create_donation))
        .route("/donor/:donor_id", get(list_by_donor))
        .route("/:id/complete", post(complete_donation))
        .route("/:id/cancel", post(cancel_donation))
}

pub async fn list_donations(Extension(services): Extension<Arc<AppServices>>) -> axum::response::Response {
    match services.donations.list() {
        Ok(items) => Json(items.iter().map(dto::donation_to_json).collect::<Vec<_>>()).into_response(),
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
    match services.donations.list_by_donor(donor_id) {
        Ok(items) => Json(items.iter().map(dto::donation_to_json).collect::<Vec<_>>()).into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}

/// POST /donations
///
/// Completed donations (the default) credit stock and donor in the same
/// commit; the response carries all three updated records.
pub async fn create_donation(
    Extension(services): Extension<Arc<AppServices>>,
    body: Result<Json<dto::CreateDonationRequest>, JsonRejection>,
) -> axum::response::Response {
    let input = match dto::body(body).and_then(|b| b.into_domain()) {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    match services.donations.record(input) {
        Ok(recorded) => {
            announce(&services, &recorded);
            (StatusCode::CREATED, Json(dto::recorded_donation_to_json(&recorded))).into_response()
        }
        Err(e) => errors::service_error_to_response(e),
    }
}

pub async fn complete_donation(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let id: DonationId = match errors::parse_id(&id) {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    match services.donations.complete(id) {
        Ok(recorded) => {
            announce(&services, &recorded);
            Json(dto::recorded_donation_to_json(&recorded)).into_response()
        }
        Err(e) => errors::service_error_to_response(e),
    }
}

pub async fn cancel_donation(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let id: DonationId = match errors::parse_id(&id) {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    match services.donations.cancel(id) {
        Ok(donation) => Json(dto::donation_to_json(&donation)).into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}

fn announce(services: &AppServices, recorded: &RecordedDonation) {
    if let Some(level) = &recorded.stock {
        services.publish_stock(level);
    }
}
