use axum::{Router, routing::get};

pub mod appointments;
pub mod campaigns;
pub mod donations;
pub mod donors;
pub mod stock;
pub mod system;

/// Router for every resource endpoint.
pub fn router() -> Router {
    Router::new()
        .route("/stream", get(system::stream))
        .nest("/blood-inventory", stock::router())
        .nest("/donors", donors::router())
        .nest("/appointments", appointments::router())
        .nest("/donations", donations::router())
        .nest("/campaigns", campaigns::router())
}
