//! API route configuration.

use std::sync::Arc;

use axum::{
    routing::{delete, get, put},
    Router,
};

use crate::handlers;
use crate::state::AppState;

/// Creates the API router with all routes configured.
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(handlers::health_check))
        .route("/api/v1/rates", put(handlers::upsert_rate))
        .route("/api/v1/rates/:source/:target", get(handlers::get_rate))
        .route(
            "/api/v1/rates/:source/:target/:date",
            delete(handlers::delete_rate),
        )
        .with_state(state)
}
