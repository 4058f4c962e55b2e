use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Extension, Path, rejection::JsonRejection},
    response::IntoResponse,
    routing::{get, post},
};

use crate::app::services::AppServices;
use crate::app::{dto, errors};

pub fn router() -> Router {
    Router::new()
        .route("/", get(list_stock))
        .route("/alerts", get(get_alerts))
        .route("/statistics", get(get_statistics))
        .route("/:blood_type", get(get_stock).put(set_stock))
        .route("/:blood_type/update", post(update_stock))
}

pub async fn list_stock(Extension(services): Extension<Arc<AppServices>>) -> axum::response::Response {
    match services.stock.list() {
        Ok(levels) => Json(levels.iter().map(dto::stock_level_to_json).collect::<Vec<_>>()).into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}

pub async fn get_stock(
    Extension(services): Extension<Arc<AppServices>>,
    Path(raw): Path<String>,
) -> axum::response::Response {
    let blood_type = match errors::parse_blood_type(&raw) {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    match services.stock.get(blood_type) {
        Ok(level) => Json(dto::stock_level_to_json(&level)).into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}

/// POST /blood-inventory/:type/update `{quantity, operation}`
pub async fn update_stock(
    Extension(services): Extension<Arc<AppServices>>,
    Path(raw): Path<String>,
    body: Result<Json<dto::UpdateStockRequest>, JsonRejection>,
) -> axum::response::Response {
    let blood_type = match errors::parse_blood_type(&raw) {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    let body = match dto::body(body) {
        Ok(b) => b,
        Err(resp) => return resp,
    };

    match services.stock.adjust(blood_type, body.quantity, body.operation) {
        Ok(level) => {
            services.publish_stock(&level);
            Json(dto::stock_level_to_json(&level)).into_response()
        }
        Err(e) => errors::service_error_to_response(e),
    }
}

/// PUT /blood-inventory/:type `{quantity}` (manual correction)
pub async fn set_stock(
    Extension(services): Extension<Arc<AppServices>>,
    Path(raw): Path<String>,
    body: Result<Json<dto::SetStockRequest>, JsonRejection>,
) -> axum::response::Response {
    let blood_type = match errors::parse_blood_type(&raw) {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    let body = match dto::body(body) {
        Ok(b) => b,
        Err(resp) => return resp,
    };

    match services.stock.set(blood_type, body.quantity) {
        Ok(level) => {
            services.publish_stock(&level);
            Json(dto::stock_level_to_json(&level)).into_response()
        }
        Err(e) => errors::service_error_to_response(e),
    }
}

pub async fn get_alerts(Extension(services): Extension<Arc<AppServices>>) -> axum::response::Response {
    match services.stock.alerts() {
        Ok(alerts) => Json(dto::alerts_to_json(&alerts)).into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}

pub async fn get_statistics(Extension(services): Extension<Arc<AppServices>>) -> axum::response::Response {
    match services.stock.statistics() {
        Ok(stats) => Json(dto::statistics_to_json(&stats)).into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}
