use crate::handlers;
use crate::state::AppState;
use axum::{Router, routing::get};

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::index))
        .route("/api/meta", get(handlers::get_meta))
        .route("/api/dashboard", get(handlers::get_dashboard))
        .with_state(state)
}
