use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Extension, Path, rejection::JsonRejection},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
};

use hemolink_core::CampaignId;

use crate::app::services::AppServices;
use crate::app::{dto, errors};

pub fn router() -> Router {
    Router::new()
        .route("/", get(list_campaigns).post(create_campaign))
        .route("/active", get(list_active))
        .route("/:id", get(get_campaign).put(update_campaign))
}

pub async fn list_campaigns(Extension(services): Extension<Arc<AppServices>>) -> axum::response::Response {
    match services.campaigns.list() {
        Ok(items) => Json(items.iter().map(dto::campaign_to_json).collect::<Vec<_>>()).into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}

pub async fn list_active(Extension(services): Extension<Arc<AppServices>>) -> axum::response::Response {
    match services.campaigns.list_active() {
        Ok(items) => Json(items.iter().map(dto::campaign_to_json).collect::<Vec<_>>()).into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}

pub async fn get_campaign(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let id: CampaignId = match errors::parse_id(&id) {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    match services.campaigns.get(id) {
        Ok(c) => Json(dto::campaign_to_json(&c)).into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}

pub async fn create_campaign(
    Extension(services): Extension<Arc<AppServices>>,
    body: Result<Json<dto::CreateCampaignRequest>, JsonRejection>,
) -> axum::response::Response {
    let body = match dto::body(body) {
        Ok(b) => b,
        Err(resp) => return resp,
    };
    match services.campaigns.create(body.into()) {
        Ok(c) => (StatusCode::CREATED, Json(dto::campaign_to_json(&c))).into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}

pub async fn update_campaign(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
    body: Result<Json<dto::UpdateCampaignRequest>, JsonRejection>,
) -> axum::response::Response {
    let id: CampaignId = match errors::parse_id(&id) {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    let body = match dto::body(body) {
        Ok(b) => b,
        Err(resp) => return resp,
    };
    match services.campaigns.update(id, body.into()) {
        Ok(c) => Json(dto::campaign_to_json(&c)).into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}
