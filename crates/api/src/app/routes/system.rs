use std::sync::Arc;

use axum::{extract::Extension, response::sse::Event as SseEvent, Json};
use chrono::Utc;
use serde_json::{json, Value as JsonValue};

use crate::app::services::{self, AppServices};

pub async fn health() -> Json<JsonValue> {
    Json(json!({
        "status": "UP",
        "message": "Hemolink backend is running",
        "timestamp": Utc::now(),
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

/// `stock.updated` for every changed row, `stock.alert` when it is critical or low.
pub async fn stream(
    Extension(services): Extension<Arc<AppServices>>,
) -> axum::response::Sse<impl tokio_stream::Stream<Item = Result<SseEvent, std::convert::Infallible>>> {
    services::sse_stream(services)
}
