//! API route handlers.

use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    Json,
};
use ratekeeper_common::ExchangeRate;
use ratekeeper_fx::{DeleteRate, UpsertRate};
use serde_json::{json, Value};
use tracing::debug;

use crate::error::ApiError;
use crate::state::AppState;

type Result<T> = std::result::Result<T, ApiError>;

/// GET /health
pub async fn health_check() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

/// GET /api/v1/rates/:source/:target
///
/// Responds with `null` when no rate is known.
pub async fn get_rate(
    State(state): State<Arc<AppState>>,
    Path((source, target)): Path<(String, String)>,
) -> Result<Json<Option<ExchangeRate>>> {
    let rate = state.service.get_rate(&source, &target).await?;
    debug!(found = rate.is_some(), "Rate lookup served");
    Ok(Json(rate))
}

/// PUT /api/v1/rates
pub async fn upsert_rate(
    State(state): State<Arc<AppState>>,
    payload: std::result::Result<Json<UpsertRate>, JsonRejection>,
) -> Result<Json<ExchangeRate>> {
    let Json(req) = payload?;
    let rate = state.service.upsert_rate(req).await?;
    Ok(Json(rate))
}

/// DELETE /api/v1/rates/:source/:target/:date
///
/// Responds with the removed record, or `null` if nothing matched.
pub async fn delete_rate(
    State(state): State<Arc<AppState>>,
    Path((source, target, date)): Path<(String, String, String)>,
) -> Result<Json<Option<ExchangeRate>>> {
    let deleted = state
        .service
        .delete_rate(DeleteRate::new(source, target, date))
        .await?;
    Ok(Json(deleted))
}
